use crate::tools::{PointerEvent, Tool, ToolCtx};

/// Hand tool: dragging pans the viewport by the scene-space pointer delta,
/// so the canvas sticks to the cursor at any zoom. Never touches pixels or
/// history.
#[derive(Default)]
pub struct PanTool {
    last_scene: Option<(f64, f64)>,
}

impl Tool for PanTool {
    fn name(&self) -> &'static str {
        "Pan"
    }

    fn on_select(&mut self, ctx: &mut ToolCtx) {
        *ctx.status = "Pan: drag to move the view".to_string();
    }

    fn on_press(&mut self, _ctx: &mut ToolCtx, ev: &PointerEvent) {
        self.last_scene = Some((ev.scene_x, ev.scene_y));
    }

    fn on_drag(&mut self, ctx: &mut ToolCtx, ev: &PointerEvent) {
        let Some((lx, ly)) = self.last_scene else {
            return;
        };
        ctx.viewport
            .pan_by_scene(ev.scene_x - lx, ev.scene_y - ly);
        self.last_scene = Some((ev.scene_x, ev.scene_y));
        *ctx.status = ctx.viewport.status_line();
    }

    fn on_release(&mut self, _ctx: &mut ToolCtx, _ev: &PointerEvent) {
        self.last_scene = None;
    }

    fn on_cancel(&mut self, _ctx: &mut ToolCtx) {
        self.last_scene = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testutil::Rig;
    use crate::tools::{Modifiers, PointerEvent};

    fn scene_ev(sx: f64, sy: f64) -> PointerEvent {
        PointerEvent {
            x: 0.0,
            y: 0.0,
            scene_x: sx,
            scene_y: sy,
            modifiers: Modifiers::default(),
        }
    }

    #[test]
    fn test_drag_pans_scene_delta_over_zoom() {
        let mut rig = Rig::new(16, 16);
        rig.viewport.zoom_at_scene(0.0, 0.0, 2.0);
        let mut tool = PanTool::default();
        tool.on_press(&mut rig.ctx(), &scene_ev(100.0, 100.0));
        tool.on_drag(&mut rig.ctx(), &scene_ev(120.0, 90.0));
        tool.on_release(&mut rig.ctx(), &scene_ev(120.0, 90.0));
        let (tx, ty) = rig.viewport.translate();
        assert!((tx - 10.0).abs() < 1e-9);
        assert!((ty + 5.0).abs() < 1e-9);
        assert_eq!(rig.history.depth(), 1);
    }
}
