// ============================================================================
// TOOLS — gesture lifecycle shared by every canvas tool
// ============================================================================

pub mod bucket;
pub mod eraser;
pub mod eyedropper;
pub mod pan;
pub mod pencil;
pub mod polygon;
pub mod select;
pub mod shapes;
pub mod spray;
pub mod text;

use crate::canvas::{Canvas, Selection, ToolSettings};
use crate::history::History;
use crate::viewport::Viewport;

/// Keyboard modifiers at the time of a pointer event.
#[derive(Clone, Copy, Debug, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl_or_meta: bool,
}

/// A pointer event in both coordinate spaces: `x`/`y` are canvas-local
/// pixels (may fall outside the canvas), `scene_x`/`scene_y` are scene
/// coordinates before the viewport transform is undone.
#[derive(Clone, Copy, Debug)]
pub struct PointerEvent {
    pub x: f32,
    pub y: f32,
    pub scene_x: f64,
    pub scene_y: f64,
    pub modifiers: Modifiers,
}

/// Everything a tool may touch while handling a gesture. The host owns all
/// of it; tools only hold their own per-gesture state.
pub struct ToolCtx<'a> {
    pub canvas: &'a mut Canvas,
    pub history: &'a mut History,
    pub viewport: &'a mut Viewport,
    pub settings: &'a mut ToolSettings,
    pub selection: &'a mut Option<Selection>,
    pub status: &'a mut String,
    /// Set by the text tool to ask the host to open the inline editor at a
    /// canvas position.
    pub text_prompt: &'a mut Option<(f32, f32)>,
}

/// Gesture lifecycle. The host guarantees the order select → (press →
/// drag* → release | cancel)* → deselect, and that cancel arrives instead
/// of release when a gesture is aborted mid-flight.
///
/// A finished gesture pushes history exactly once (in `on_release`); a
/// cancelled one leaves the base bit-identical to its pre-press state and
/// pushes nothing.
pub trait Tool {
    fn name(&self) -> &'static str;

    fn on_select(&mut self, _ctx: &mut ToolCtx) {}
    fn on_deselect(&mut self, _ctx: &mut ToolCtx) {}
    fn on_press(&mut self, _ctx: &mut ToolCtx, _ev: &PointerEvent) {}
    fn on_drag(&mut self, _ctx: &mut ToolCtx, _ev: &PointerEvent) {}
    fn on_release(&mut self, _ctx: &mut ToolCtx, _ev: &PointerEvent) {}
    fn on_cancel(&mut self, _ctx: &mut ToolCtx) {}

    /// Confirm action (Enter or the matching menu item). Only multi-step
    /// tools such as the polygon use it.
    fn on_confirm(&mut self, _ctx: &mut ToolCtx) {}
}

/// Midpoint-quadratic smoothing of a raw pointer trail: each interior
/// sample becomes the control point of a quadratic from the midpoint before
/// it to the midpoint after it. Returns a dense polyline ready for
/// stroking or stamping.
pub(crate) fn smoothed_polyline(raw: &[(f32, f32)]) -> Vec<(f32, f32)> {
    match raw.len() {
        0 => Vec::new(),
        1 => vec![raw[0]],
        2 => vec![raw[0], raw[1]],
        _ => {
            let mut out = Vec::with_capacity(raw.len() * 4);
            out.push(raw[0]);
            out.push(mid(raw[0], raw[1]));
            for w in raw.windows(3) {
                flatten_quad(&mut out, mid(w[0], w[1]), w[1], mid(w[1], w[2]));
            }
            let n = raw.len();
            out.push(mid(raw[n - 2], raw[n - 1]));
            out.push(raw[n - 1]);
            out
        }
    }
}

fn mid(a: (f32, f32), b: (f32, f32)) -> (f32, f32) {
    ((a.0 + b.0) * 0.5, (a.1 + b.1) * 0.5)
}

/// Flatten a quadratic Bézier into ~2px segments, appending to `out`
/// (the start point is assumed already present).
fn flatten_quad(out: &mut Vec<(f32, f32)>, p0: (f32, f32), c: (f32, f32), p1: (f32, f32)) {
    let chord = ((p1.0 - p0.0).hypot(p1.1 - p0.1))
        + ((c.0 - p0.0).hypot(c.1 - p0.1))
        + ((p1.0 - c.0).hypot(p1.1 - c.1));
    let n = ((chord / 4.0).ceil() as usize).clamp(2, 48);
    for i in 1..=n {
        let t = i as f32 / n as f32;
        let u = 1.0 - t;
        out.push((
            u * u * p0.0 + 2.0 * u * t * c.0 + t * t * p1.0,
            u * u * p0.1 + 2.0 * u * t * c.1 + t * t * p1.1,
        ));
    }
}

/// Test scaffold owning everything a [`ToolCtx`] borrows.
#[cfg(test)]
pub(crate) mod testutil {
    use super::*;

    pub fn ev(x: f32, y: f32) -> PointerEvent {
        PointerEvent {
            x,
            y,
            scene_x: x as f64,
            scene_y: y as f64,
            modifiers: Modifiers::default(),
        }
    }

    pub fn ev_shift(x: f32, y: f32) -> PointerEvent {
        PointerEvent {
            modifiers: Modifiers { shift: true, ctrl_or_meta: false },
            ..ev(x, y)
        }
    }

    pub struct Rig {
        pub canvas: Canvas,
        pub history: History,
        pub viewport: Viewport,
        pub settings: ToolSettings,
        pub selection: Option<Selection>,
        pub status: String,
        pub text_prompt: Option<(f32, f32)>,
    }

    impl Rig {
        pub fn new(w: u32, h: u32) -> Self {
            let canvas = Canvas::new(w, h);
            let history = History::new(&canvas);
            Self {
                canvas,
                history,
                viewport: Viewport::default(),
                settings: ToolSettings::default(),
                selection: None,
                status: String::new(),
                text_prompt: None,
            }
        }

        pub fn ctx(&mut self) -> ToolCtx {
            ToolCtx {
                canvas: &mut self.canvas,
                history: &mut self.history,
                viewport: &mut self.viewport,
                settings: &mut self.settings,
                selection: &mut self.selection,
                status: &mut self.status,
                text_prompt: &mut self.text_prompt,
            }
        }
    }
}
