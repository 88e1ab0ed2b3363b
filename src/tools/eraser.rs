use crate::draw;
use crate::raster::PixelBuffer;
use crate::tools::{smoothed_polyline, PointerEvent, Tool, ToolCtx};

/// Eraser: stamps hard transparent circles along the smoothed pointer
/// trail, writing 0x00000000 rather than blending so erased pixels are
/// fully clear in one pass. Redraws from the committed snapshot on every
/// drag, like the pencil.
#[derive(Default)]
pub struct EraserTool {
    points: Vec<(f32, f32)>,
}

impl EraserTool {
    fn redraw(&self, ctx: &mut ToolCtx) {
        ctx.canvas.restore_base(ctx.history.current());
        let path = smoothed_polyline(&self.points);
        stamp_path(ctx.canvas.base_mut(), &path, ctx.settings.brush());
    }
}

/// Walk the polyline stamping clear circles at a spacing that keeps the
/// cut continuous for any brush size.
fn stamp_path(buf: &mut PixelBuffer, path: &[(f32, f32)], diameter: f32) {
    let Some(&(mut lx, mut ly)) = path.first() else {
        return;
    };
    let step = (diameter * 0.20).max(0.6);
    draw::stamp_clear_circle(buf, lx, ly, diameter);
    for &(x, y) in &path[1..] {
        let dist = (x - lx).hypot(y - ly);
        let n = (dist / step).ceil() as usize;
        for i in 1..=n {
            let t = i as f32 / n as f32;
            draw::stamp_clear_circle(buf, lx + (x - lx) * t, ly + (y - ly) * t, diameter);
        }
        lx = x;
        ly = y;
    }
}

impl Tool for EraserTool {
    fn name(&self) -> &'static str {
        "Eraser"
    }

    fn on_select(&mut self, ctx: &mut ToolCtx) {
        *ctx.status = "Eraser: drag to erase to transparent".to_string();
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
    fn test_erase_sets_fully_transparent() {
        let mut rig = Rig::new(32, 32);
        rig.canvas.base_mut().fill(0xFF33_6699);
        rig.history.clear(&rig.canvas);
        rig.settings.brush = 8.0;

        let mut tool = EraserTool::default();
        tool.on_press(&mut rig.ctx(), &ev(10.0, 10.0));
        tool.on_drag(&mut rig.ctx(), &ev(22.0, 10.0));
        tool.on_release(&mut rig.ctx(), &ev(22.0, 10.0));

        // Pixels along the path are hard-cleared, not faded.
        assert_eq!(rig.canvas.base().pixel(10, 10), 0);
        assert_eq!(rig.canvas.base().pixel(16, 10), 0);
        assert_eq!(rig.canvas.base().pixel(22, 10), 0);
        // Far corner untouched.
        assert_eq!(rig.canvas.base().pixel(31, 31), 0xFF33_6699);
        assert_eq!(rig.history.depth(), 2);
    }

    #[test]
    fn test_cancel_restores_content() {
        let mut rig = Rig::new(16, 16);
        rig.canvas.base_mut().fill(0xFFAA_AAAA);
        rig.history.clear(&rig.canvas);

        let mut tool = EraserTool::default();
        tool.on_press(&mut rig.ctx(), &ev(8.0, 8.0));
        tool.on_cancel(&mut rig.ctx());
        assert!(rig.canvas.base().as_slice().iter().all(|&p| p == 0xFFAA_AAAA));
    }
}
