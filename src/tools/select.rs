use crate::canvas::{Canvas, Selection};
use crate::draw;
use crate::tools::{PointerEvent, Tool, ToolCtx};

/// Marquee outline color.
const MARQUEE: u32 = 0xFF44_4444;
/// Translucent interior tint shown while the marquee is rubber-banding.
const MARQUEE_FILL: u32 = 0x2044_88CC;

fn draw_marquee(canvas: &mut Canvas, x: f32, y: f32, w: f32, h: f32) {
    draw::dashed_rect(canvas.overlay_mut(), x, y, w, h, 1.0, MARQUEE);
}

/// Drop the current selection: a floating one first puts its pixels back
/// where they came from, so deselection never loses content.
fn drop_selection(ctx: &mut ToolCtx) {
    if let Some(mut sel) = ctx.selection.take() {
        sel.restore_to(ctx.canvas);
    }
    ctx.canvas.clear_overlay();
}

// ============================================================================
// SELECT — rubber-band marquee over the base
// ============================================================================

/// Drag a rectangle to select a region of the base. The selection is
/// anchored (pixels stay in the base) until the move tool picks it up.
/// Creating a marquee replaces any previous selection and pushes nothing.
#[derive(Default)]
pub struct SelectTool {
    anchor: Option<(f32, f32)>,
}

impl Tool for SelectTool {
    fn name(&self) -> &'static str {
        "Select"
    }

    fn on_select(&mut self, ctx: &mut ToolCtx) {
        *ctx.status = "Select: drag to mark a region".to_string();
    }

    fn on_press(&mut self, ctx: &mut ToolCtx, ev: &PointerEvent) {
        drop_selection(ctx);
        self.anchor = Some((ev.x, ev.y));
    }

    fn on_drag(&mut self, ctx: &mut ToolCtx, ev: &PointerEvent) {
        let Some(a) = self.anchor else {
            return;
        };
        ctx.canvas.clear_overlay();
        let (x, y, w, h) = normalize(a, (ev.x, ev.y));
        draw::fill_rect(ctx.canvas.overlay_mut(), x, y, w, h, MARQUEE_FILL);
        draw_marquee(ctx.canvas, x, y, w, h);
    }

    fn on_release(&mut self, ctx: &mut ToolCtx, ev: &PointerEvent) {
        let Some(a) = self.anchor.take() else {
            return;
        };
        ctx.canvas.clear_overlay();
        let Some((x, y, w, h)) = clamp_to_canvas(ctx.canvas, a, (ev.x, ev.y)) else {
            *ctx.status = "Selection empty".to_string();
            return;
        };
        let image = ctx.canvas.base().sub_buffer(x, y, w, h);
        *ctx.selection = Some(Selection {
            image,
            x: x as f32,
            y: y as f32,
            floating: false,
        });
        draw_marquee(ctx.canvas, x as f32, y as f32, w as f32, h as f32);
        *ctx.status = format!("Selected {}×{} at ({}, {})", w, h, x, y);
    }

    fn on_cancel(&mut self, ctx: &mut ToolCtx) {
        if self.anchor.take().is_some() {
            ctx.canvas.clear_overlay();
        }
    }
}

fn normalize(a: (f32, f32), b: (f32, f32)) -> (f32, f32, f32, f32) {
    (
        a.0.min(b.0),
        a.1.min(b.1),
        (a.0 - b.0).abs(),
        (a.1 - b.1).abs(),
    )
}

/// Round the drag rect to whole pixels and intersect it with the canvas.
/// Returns None when the intersection is empty.
fn clamp_to_canvas(canvas: &Canvas, a: (f32, f32), b: (f32, f32)) -> Option<(u32, u32, u32, u32)> {
    let (x, y, w, h) = normalize(a, b);
    let x0 = (x.round() as i32).max(0);
    let y0 = (y.round() as i32).max(0);
    let x1 = ((x + w).round() as i32).min(canvas.width() as i32);
    let y1 = ((y + h).round() as i32).min(canvas.height() as i32);
    if x0 >= x1 || y0 >= y1 {
        return None;
    }
    Some((x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32))
}

// ============================================================================
// MOVE — float the selected pixels and drag them elsewhere
// ============================================================================

/// Picks up the selected region (cutting it out of the base), drags it as
/// an overlay ghost, and drops it on release with a single history push.
/// Cancelling mid-drag puts everything back bit-identically.
#[derive(Default)]
pub struct MoveTool {
    dragging: bool,
    grab: (f32, f32),
    origin: (f32, f32),
}

impl MoveTool {
    fn draw_ghost(&self, ctx: &mut ToolCtx) {
        ctx.canvas.clear_overlay();
        if let Some(sel) = ctx.selection.as_ref() {
            let x = sel.x.round() as i32;
            let y = sel.y.round() as i32;
            ctx.canvas.overlay_mut().blit(&sel.image, x, y);
            draw_marquee(
                ctx.canvas,
                sel.x,
                sel.y,
                sel.width() as f32,
                sel.height() as f32,
            );
        }
    }
}

impl Tool for MoveTool {
    fn name(&self) -> &'static str {
        "Move"
    }

    fn on_select(&mut self, ctx: &mut ToolCtx) {
        *ctx.status = if ctx.selection.is_some() {
            "Move: drag the selection".to_string()
        } else {
            "Move: make a selection first".to_string()
        };
    }

    fn on_deselect(&mut self, ctx: &mut ToolCtx) {
        // Leaving the tool mid-drag behaves like a cancel.
        self.on_cancel(ctx);
    }

    fn on_press(&mut self, ctx: &mut ToolCtx, ev: &PointerEvent) {
        let inside = match ctx.selection.as_ref() {
            Some(sel) => {
                ev.x >= sel.x
                    && ev.y >= sel.y
                    && ev.x < sel.x + sel.width() as f32
                    && ev.y < sel.y + sel.height() as f32
            }
            None => false,
        };
        if !inside {
            drop_selection(ctx);
            return;
        }

        // Re-capture and cut so edits since selection time are carried. The
        // cut happens at the on-canvas intersection and the selection is
        // re-anchored there, keeping image and placement in one frame even
        // when a previous move left the rect partially off-canvas.
        let rect = match ctx.selection.as_ref() {
            Some(sel) if !sel.floating => match sel.canvas_rect(ctx.canvas) {
                Some(r) => Some(r),
                None => {
                    drop_selection(ctx);
                    return;
                }
            },
            _ => None,
        };
        let sel = ctx
            .selection
            .as_mut()
            .unwrap_or_else(|| unreachable!("checked above"));
        if let Some((x, y, w, h)) = rect {
            sel.image = ctx.canvas.base().sub_buffer(x, y, w, h);
            ctx.canvas.base_mut().clear_rect(x as i32, y as i32, w, h);
            sel.x = x as f32;
            sel.y = y as f32;
            sel.floating = true;
        }
        self.origin = (sel.x, sel.y);
        self.grab = (ev.x - sel.x, ev.y - sel.y);
        self.dragging = true;
        self.draw_ghost(ctx);
    }

    fn on_drag(&mut self, ctx: &mut ToolCtx, ev: &PointerEvent) {
        if !self.dragging {
            return;
        }
        if let Some(sel) = ctx.selection.as_mut() {
            sel.x = ev.x - self.grab.0;
            sel.y = ev.y - self.grab.1;
        }
        self.draw_ghost(ctx);
    }

    fn on_release(&mut self, ctx: &mut ToolCtx, _ev: &PointerEvent) {
        if !self.dragging {
            return;
        }
        self.dragging = false;
        if let Some(sel) = ctx.selection.as_mut() {
            let moved = (sel.x - self.origin.0).abs() > 0.5 || (sel.y - self.origin.1).abs() > 0.5;
            if !moved {
                // A click that went nowhere: put the pixels back, no push.
                sel.x = self.origin.0;
                sel.y = self.origin.1;
            }
            sel.restore_to(ctx.canvas);
            ctx.canvas.clear_overlay();
            let (x, y, w, h) = (sel.x, sel.y, sel.width() as f32, sel.height() as f32);
            draw_marquee(ctx.canvas, x, y, w, h);
            if moved {
                ctx.history.push(ctx.canvas);
                *ctx.status = format!("Moved selection to ({:.0}, {:.0})", x, y);
            }
        }
    }

    fn on_cancel(&mut self, ctx: &mut ToolCtx) {
        if !self.dragging {
            return;
        }
        self.dragging = false;
        // The cut never reached history, so the committed snapshot still
        // holds the pre-drag pixels.
        ctx.canvas.restore_base(ctx.history.current());
        ctx.canvas.clear_overlay();
        if let Some(sel) = ctx.selection.as_mut() {
            sel.x = self.origin.0;
            sel.y = self.origin.1;
            sel.floating = false;
            let (x, y, w, h) = (sel.x, sel.y, sel.width() as f32, sel.height() as f32);
            draw_marquee(ctx.canvas, x, y, w, h);
        }
    }
}
