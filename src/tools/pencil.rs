use crate::draw;
use crate::tools::{smoothed_polyline, PointerEvent, Tool, ToolCtx};

/// Freehand pencil: draws directly on the base with midpoint-quadratic
/// smoothing. Each drag redraws the whole stroke from the last committed
/// snapshot so translucent colors never double-blend where segments meet.
#[derive(Default)]
pub struct PencilTool {
    points: Vec<(f32, f32)>,
}

impl PencilTool {
    fn redraw(&self, ctx: &mut ToolCtx) {
        ctx.canvas.restore_base(ctx.history.current());
        let path = smoothed_polyline(&self.points);
        draw::stroke_path(
            ctx.canvas.base_mut(),
            &path,
            ctx.settings.brush(),
            ctx.settings.stroke,
        );
    }
}

impl Tool for PencilTool {
    fn name(&self) -> &'static str {
        "Pencil"
    }

    fn on_select(&mut self, ctx: &mut ToolCtx) {
        *ctx.status = "Pencil: drag to draw".to_string();
    }

    fn on_press(&mut self, ctx: &mut ToolCtx, ev: &PointerEvent) {
        self.points.clear();
        self.points.push((ev.x, ev.y));
        self.redraw(ctx);
    }

    fn on_drag(&mut self, ctx: &mut ToolCtx, ev: &PointerEvent) {
        if self.points.is_empty() {
            return;
        }
        self.points.push((ev.x, ev.y));
        self.redraw(ctx);
    }

    fn on_release(&mut self, ctx: &mut ToolCtx, _ev: &PointerEvent) {
        if self.points.is_empty() {
            return;
        }
        self.points.clear();
        ctx.history.push(ctx.canvas);
    }

    fn on_cancel(&mut self, ctx: &mut ToolCtx) {
        if !self.points.is_empty() {
            self.points.clear();
            ctx.canvas.restore_base(ctx.history.current());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testutil::{ev, Rig};

    #[test]
    fn test_stroke_pushes_once() {
        let mut rig = Rig::new(32, 32);
        let mut tool = PencilTool::default();
        tool.on_press(&mut rig.ctx(), &ev(5.0, 5.0));
        tool.on_drag(&mut rig.ctx(), &ev(15.0, 5.0));
        tool.on_drag(&mut rig.ctx(), &ev(25.0, 15.0));
        tool.on_release(&mut rig.ctx(), &ev(25.0, 15.0));
        assert_eq!(rig.history.depth(), 2);
        assert!(rig.canvas.base().as_slice().iter().any(|&p| p != 0));
    }

    #[test]
    fn test_cancel_restores_base() {
        let mut rig = Rig::new(32, 32);
        let mut tool = PencilTool::default();
        let before = rig.canvas.snapshot_base();
        tool.on_press(&mut rig.ctx(), &ev(5.0, 5.0));
        tool.on_drag(&mut rig.ctx(), &ev(20.0, 20.0));
        tool.on_cancel(&mut rig.ctx());
        assert_eq!(rig.canvas.base().as_slice(), before.as_slice());
        assert_eq!(rig.history.depth(), 1);
    }

    #[test]
    fn test_click_leaves_a_dot() {
        let mut rig = Rig::new(16, 16);
        let mut tool = PencilTool::default();
        tool.on_press(&mut rig.ctx(), &ev(8.0, 8.0));
        tool.on_release(&mut rig.ctx(), &ev(8.0, 8.0));
        assert_ne!(rig.canvas.base().pixel(8, 8), 0);
    }
}
