use crate::canvas::ToolSettings;
use crate::draw;
use crate::raster::{self, PixelBuffer};
use crate::tools::{Modifiers, PointerEvent, Tool, ToolCtx};

// ============================================================================
// SHAPE TOOLS — anchor/drag preview on the overlay, commit on release
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeKind {
    Line,
    Rect,
    Ellipse,
}

/// Line, rectangle and ellipse share one gesture: press sets the anchor,
/// every drag redraws the preview on the overlay, release composites the
/// overlay into the base and pushes history. Shift constrains (45°
/// increments for lines, square/circle for rect and ellipse).
pub struct ShapeTool {
    kind: ShapeKind,
    anchor: Option<(f32, f32)>,
}

impl ShapeTool {
    pub fn new(kind: ShapeKind) -> Self {
        Self { kind, anchor: None }
    }

    fn render(&self, buf: &mut PixelBuffer, settings: &ToolSettings, cur: (f32, f32), mods: Modifiers) {
        let Some(anchor) = self.anchor else {
            return;
        };
        let cur = if mods.shift {
            constrain(self.kind, anchor, cur)
        } else {
            cur
        };
        let width = settings.brush();
        match self.kind {
            ShapeKind::Line => {
                draw::stroke_line(buf, anchor.0, anchor.1, cur.0, cur.1, width, settings.stroke);
            }
            ShapeKind::Rect => {
                let (x, y, w, h) = normalize(anchor, cur);
                if raster::alpha(settings.fill) > 0 {
                    draw::fill_rect(buf, x, y, w, h, settings.fill);
                }
                draw::stroke_rect(buf, x, y, w, h, width, settings.stroke);
            }
            ShapeKind::Ellipse => {
                let (x, y, w, h) = normalize(anchor, cur);
                if raster::alpha(settings.fill) > 0 {
                    draw::fill_oval(buf, x, y, w, h, settings.fill);
                }
                draw::stroke_oval(buf, x, y, w, h, width, settings.stroke);
            }
        }
    }
}

/// Drag rect as (x, y, w, h) regardless of drag direction.
fn normalize(a: (f32, f32), b: (f32, f32)) -> (f32, f32, f32, f32) {
    let x = a.0.min(b.0);
    let y = a.1.min(b.1);
    (x, y, (a.0 - b.0).abs(), (a.1 - b.1).abs())
}

/// Shift constraint: lines snap to 45° increments, rect/ellipse drags
/// become square (the shorter axis wins).
fn constrain(kind: ShapeKind, anchor: (f32, f32), cur: (f32, f32)) -> (f32, f32) {
    let dx = cur.0 - anchor.0;
    let dy = cur.1 - anchor.1;
    match kind {
        ShapeKind::Line => {
            let len = dx.hypot(dy);
            if len < 1e-3 {
                return cur;
            }
            let step = std::f32::consts::FRAC_PI_4;
            let angle = (dy.atan2(dx) / step).round() * step;
            (anchor.0 + angle.cos() * len, anchor.1 + angle.sin() * len)
        }
        ShapeKind::Rect | ShapeKind::Ellipse => {
            let side = dx.abs().min(dy.abs());
            (
                anchor.0 + side * dx.signum(),
                anchor.1 + side * dy.signum(),
            )
        }
    }
}

impl Tool for ShapeTool {
    fn name(&self) -> &'static str {
        match self.kind {
            ShapeKind::Line => "Line",
            ShapeKind::Rect => "Rectangle",
            ShapeKind::Ellipse => "Ellipse",
        }
    }

    fn on_select(&mut self, ctx: &mut ToolCtx) {
        *ctx.status = format!("{}: drag to draw, Shift to constrain", self.name());
    }

    fn on_press(&mut self, ctx: &mut ToolCtx, ev: &PointerEvent) {
        self.anchor = Some((ev.x, ev.y));
        ctx.canvas.clear_overlay();
        self.render(ctx.canvas.overlay_mut(), ctx.settings, (ev.x, ev.y), ev.modifiers);
    }

    fn on_drag(&mut self, ctx: &mut ToolCtx, ev: &PointerEvent) {
        if self.anchor.is_none() {
            return;
        }
        ctx.canvas.clear_overlay();
        self.render(ctx.canvas.overlay_mut(), ctx.settings, (ev.x, ev.y), ev.modifiers);
    }

    fn on_release(&mut self, ctx: &mut ToolCtx, ev: &PointerEvent) {
        let Some(anchor) = self.anchor else {
            return;
        };
        ctx.canvas.clear_overlay();
        // A click without any drag is an empty gesture, not a shape.
        if (ev.x - anchor.0).abs() < 0.5 && (ev.y - anchor.1).abs() < 0.5 {
            self.anchor = None;
            return;
        }
        self.render(ctx.canvas.overlay_mut(), ctx.settings, (ev.x, ev.y), ev.modifiers);
        self.anchor = None;
        ctx.canvas.commit_overlay();
        ctx.history.push(ctx.canvas);
    }

    fn on_cancel(&mut self, ctx: &mut ToolCtx) {
        if self.anchor.take().is_some() {
            ctx.canvas.clear_overlay();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testutil::{ev, ev_shift, Rig};

    #[test]
    fn test_rect_commit_pushes_once() {
        let mut rig = Rig::new(32, 32);
        rig.settings.fill = 0xFFFF_0000;
        let mut tool = ShapeTool::new(ShapeKind::Rect);
        tool.on_press(&mut rig.ctx(), &ev(4.0, 4.0));
        tool.on_drag(&mut rig.ctx(), &ev(20.0, 12.0));
        tool.on_release(&mut rig.ctx(), &ev(20.0, 12.0));

        assert_eq!(rig.history.depth(), 2);
        // Interior filled with the fill color.
        assert_eq!(rig.canvas.base().pixel(10, 8), 0xFFFF_0000);
        // Overlay is empty after commit.
        assert!(rig.canvas.overlay().as_slice().iter().all(|&p| p == 0));
    }

    #[test]
    fn test_preview_stays_on_overlay() {
        let mut rig = Rig::new(32, 32);
        let mut tool = ShapeTool::new(ShapeKind::Line);
        tool.on_press(&mut rig.ctx(), &ev(2.0, 2.0));
        tool.on_drag(&mut rig.ctx(), &ev(28.0, 2.0));
        // Mid-gesture: base untouched, overlay has the preview.
        assert!(rig.canvas.base().as_slice().iter().all(|&p| p == 0));
        assert!(rig.canvas.overlay().as_slice().iter().any(|&p| p != 0));
    }

    #[test]
    fn test_cancel_discards_preview() {
        let mut rig = Rig::new(32, 32);
        let mut tool = ShapeTool::new(ShapeKind::Ellipse);
        tool.on_press(&mut rig.ctx(), &ev(4.0, 4.0));
        tool.on_drag(&mut rig.ctx(), &ev(24.0, 24.0));
        tool.on_cancel(&mut rig.ctx());
        assert!(rig.canvas.base().as_slice().iter().all(|&p| p == 0));
        assert!(rig.canvas.overlay().as_slice().iter().all(|&p| p == 0));
        assert_eq!(rig.history.depth(), 1);
    }

    #[test]
    fn test_transparent_fill_leaves_interior_empty() {
        let mut rig = Rig::new(32, 32);
        rig.settings.brush = 1.0;
        let mut tool = ShapeTool::new(ShapeKind::Rect);
        tool.on_press(&mut rig.ctx(), &ev(4.0, 4.0));
        tool.on_release(&mut rig.ctx(), &ev(24.0, 24.0));
        // Outline present, center untouched.
        assert_eq!(rig.canvas.base().pixel(14, 14), 0);
        assert!(rig.canvas.base().as_slice().iter().any(|&p| p != 0));
    }

    #[test]
    fn test_zero_size_release_discards() {
        let mut rig = Rig::new(32, 32);
        let mut tool = ShapeTool::new(ShapeKind::Rect);
        tool.on_press(&mut rig.ctx(), &ev(10.0, 10.0));
        tool.on_release(&mut rig.ctx(), &ev(10.0, 10.0));
        assert!(rig.canvas.base().as_slice().iter().all(|&p| p == 0));
        assert_eq!(rig.history.depth(), 1);
    }

    #[test]
    fn test_shift_constrains_square() {
        let mut rig = Rig::new(64, 64);
        rig.settings.fill = 0xFF00_FF00;
        let mut tool = ShapeTool::new(ShapeKind::Rect);
        tool.on_press(&mut rig.ctx(), &ev(10.0, 10.0));
        tool.on_release(&mut rig.ctx(), &ev_shift(40.0, 20.0));
        // Constrained to 10×10: x beyond 20 is outside the square.
        assert_eq!(rig.canvas.base().pixel(15, 15), 0xFF00_FF00);
        assert_eq!(rig.canvas.base().pixel(30, 15), 0);
    }
}
