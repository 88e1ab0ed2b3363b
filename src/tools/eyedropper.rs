use crate::raster;
use crate::tools::{PointerEvent, Tool, ToolCtx};

/// Eyedropper: samples the committed base pixel under the cursor into the
/// stroke color, transparency included. Dragging keeps sampling; presses
/// outside the canvas are ignored.
#[derive(Default)]
pub struct EyedropperTool;

impl EyedropperTool {
    fn sample(&self, ctx: &mut ToolCtx, ev: &PointerEvent) {
        let x = ev.x.floor() as i32;
        let y = ev.y.floor() as i32;
        if !ctx.canvas.base().contains(x, y) {
            return;
        }
        let argb = ctx.canvas.base().pixel(x, y);
        ctx.settings.stroke = argb;
        *ctx.status = format!(
            "Picked #{:02X}{:02X}{:02X} (alpha {})",
            raster::red(argb),
            raster::green(argb),
            raster::blue(argb),
            raster::alpha(argb),
        );
    }
}

impl Tool for EyedropperTool {
    fn name(&self) -> &'static str {
        "Eyedropper"
    }

    fn on_select(&mut self, ctx: &mut ToolCtx) {
        *ctx.status = "Eyedropper: click to pick the stroke color".to_string();
    }

    fn on_press(&mut self, ctx: &mut ToolCtx, ev: &PointerEvent) {
        self.sample(ctx, ev);
    }

    fn on_drag(&mut self, ctx: &mut ToolCtx, ev: &PointerEvent) {
        self.sample(ctx, ev);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testutil::{ev, Rig};

    #[test]
    fn test_pick_sets_stroke() {
        let mut rig = Rig::new(8, 8);
        rig.canvas.base_mut().put_pixel(3, 3, 0xCC11_2233);
        let mut tool = EyedropperTool;
        tool.on_press(&mut rig.ctx(), &ev(3.4, 3.9));
        assert_eq!(rig.settings.stroke, 0xCC11_2233);
        assert_eq!(rig.history.depth(), 1);
    }

    #[test]
    fn test_transparent_pixel_is_sampled() {
        let mut rig = Rig::new(8, 8);
        rig.settings.stroke = 0xFF12_3456;
        let mut tool = EyedropperTool;
        tool.on_press(&mut rig.ctx(), &ev(4.0, 4.0));
        assert_eq!(rig.settings.stroke, 0);
    }

    #[test]
    fn test_out_of_bounds_press_keeps_color() {
        let mut rig = Rig::new(8, 8);
        rig.settings.stroke = 0xFF12_3456;
        let mut tool = EyedropperTool;
        tool.on_press(&mut rig.ctx(), &ev(-1.0, 4.0));
        tool.on_press(&mut rig.ctx(), &ev(4.0, 9.0));
        assert_eq!(rig.settings.stroke, 0xFF12_3456);
    }
}
