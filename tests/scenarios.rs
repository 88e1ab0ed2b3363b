//! End-to-end gesture scenarios driving the paint core the way the shell
//! does: tool lifecycle calls against a real canvas, history and viewport.

use pixelpad::canvas::paste_anchor;
use pixelpad::tools::bucket::BucketTool;
use pixelpad::tools::pencil::PencilTool;
use pixelpad::tools::select::{MoveTool, SelectTool};
use pixelpad::tools::shapes::{ShapeKind, ShapeTool};
use pixelpad::tools::{Modifiers, PointerEvent, Tool, ToolCtx};
use pixelpad::{Canvas, History, Selection, ToolSettings, Viewport};

fn ev(x: f32, y: f32) -> PointerEvent {
    PointerEvent {
        x,
        y,
        scene_x: x as f64,
        scene_y: y as f64,
        modifiers: Modifiers::default(),
    }
}

struct Session {
    canvas: Canvas,
    history: History,
    viewport: Viewport,
    settings: ToolSettings,
    selection: Option<Selection>,
    status: String,
    text_prompt: Option<(f32, f32)>,
}

impl Session {
    fn new(w: u32, h: u32) -> Self {
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

    fn ctx(&mut self) -> ToolCtx {
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

    fn stroke(&mut self, tool: &mut dyn Tool, points: &[(f32, f32)]) {
        let first = points[0];
        tool.on_press(&mut self.ctx(), &ev(first.0, first.1));
        for &(x, y) in &points[1..] {
            tool.on_drag(&mut self.ctx(), &ev(x, y));
        }
        let last = points[points.len() - 1];
        tool.on_release(&mut self.ctx(), &ev(last.0, last.1));
    }
}

#[test]
fn pencil_stroke_then_undo_redo() {
    let mut s = Session::new(64, 64);
    let mut pencil = PencilTool::default();
    s.stroke(&mut pencil, &[(10.0, 10.0), (30.0, 12.0), (50.0, 30.0)]);

    assert_eq!(s.history.depth(), 2);
    let drawn = s.canvas.snapshot_base();
    assert!(drawn.as_slice().iter().any(|&p| p != 0));

    s.history.undo(&mut s.canvas);
    assert!(s.canvas.base().as_slice().iter().all(|&p| p == 0));

    s.history.redo(&mut s.canvas);
    assert_eq!(s.canvas.base().as_slice(), drawn.as_slice());
}

#[test]
fn cancelled_shape_leaves_no_trace() {
    let mut s = Session::new(64, 64);
    let mut rect = ShapeTool::new(ShapeKind::Rect);
    s.settings.fill = 0xFFFF_0000;

    rect.on_press(&mut s.ctx(), &ev(5.0, 5.0));
    rect.on_drag(&mut s.ctx(), &ev(40.0, 40.0));
    rect.on_cancel(&mut s.ctx());

    assert!(s.canvas.base().as_slice().iter().all(|&p| p == 0));
    assert!(s.canvas.overlay().as_slice().iter().all(|&p| p == 0));
    assert_eq!(s.history.depth(), 1);
    assert!(!s.history.can_undo());
}

#[test]
fn bucket_fills_exactly_the_component() {
    let mut s = Session::new(40, 40);
    // A 10×10 opaque square; fill it with green.
    for y in 5..15 {
        for x in 5..15 {
            s.canvas.base_mut().put_pixel(x, y, 0xFFFF_0000);
        }
    }
    s.history.clear(&s.canvas);
    s.settings.stroke = 0xFF00_FF00;

    let mut bucket = BucketTool;
    bucket.on_press(&mut s.ctx(), &ev(10.0, 10.0));

    let filled = s
        .canvas
        .base()
        .as_slice()
        .iter()
        .filter(|&&p| p == 0xFF00_FF00)
        .count();
    assert_eq!(filled, 100);
    assert_eq!(s.history.depth(), 2);
}

#[test]
fn selection_moved_thirty_right() {
    let mut s = Session::new(100, 100);
    for y in 10..20 {
        for x in 10..20 {
            s.canvas.base_mut().put_pixel(x, y, 0xFF12_34AB);
        }
    }
    s.history.clear(&s.canvas);

    let mut select = SelectTool::default();
    select.on_press(&mut s.ctx(), &ev(10.0, 10.0));
    select.on_drag(&mut s.ctx(), &ev(20.0, 20.0));
    select.on_release(&mut s.ctx(), &ev(20.0, 20.0));

    let mut mover = MoveTool::default();
    mover.on_press(&mut s.ctx(), &ev(15.0, 15.0));
    mover.on_drag(&mut s.ctx(), &ev(45.0, 15.0));
    mover.on_release(&mut s.ctx(), &ev(45.0, 15.0));

    for y in 10..20 {
        for x in 10..20 {
            assert_eq!(s.canvas.base().pixel(x, y), 0, "vacated {},{}", x, y);
            assert_eq!(
                s.canvas.base().pixel(x + 30, y),
                0xFF12_34AB,
                "moved {},{}",
                x,
                y
            );
        }
    }
    // Exactly one history entry for the whole move; undo restores the cut.
    assert_eq!(s.history.depth(), 2);
    s.history.undo(&mut s.canvas);
    assert_eq!(s.canvas.base().pixel(15, 15), 0xFF12_34AB);
    assert_eq!(s.canvas.base().pixel(45, 15), 0);
}

#[test]
fn paste_anchor_clamps_to_canvas() {
    // 40×40 image requested at (95, 95) on a 100×100 canvas.
    assert_eq!(paste_anchor(100, 100, (95.0, 95.0), 40, 40), (60, 60));
    // Fits where requested.
    assert_eq!(paste_anchor(100, 100, (10.0, 20.0), 40, 40), (10, 20));
    // Larger than the canvas: anchored at the origin.
    assert_eq!(paste_anchor(100, 100, (50.0, 50.0), 200, 120), (0, 0));
}

#[test]
fn zoom_sequence_keeps_cursor_pixel_fixed() {
    let mut vp = Viewport::default();
    vp.pan_by(20.0, -5.0);
    let cursor = (300.0, 200.0);
    let (cx, cy) = vp.scene_to_canvas(cursor.0, cursor.1);

    // A burst of wheel steps in both directions with modifier variants.
    assert!(vp.wheel_zoom(cursor.0, cursor.1, 1.0, false, false));
    assert!(vp.wheel_zoom(cursor.0, cursor.1, 1.0, true, false));
    assert!(vp.wheel_zoom(cursor.0, cursor.1, -1.0, false, true));
    assert!(vp.wheel_zoom(cursor.0, cursor.1, 1.0, false, false));

    let (sx, sy) = vp.canvas_to_scene(cx, cy);
    assert!((sx - cursor.0).abs() < 1e-6);
    assert!((sy - cursor.1).abs() < 1e-6);
}

#[test]
fn eraser_cuts_through_pencil_stroke() {
    use pixelpad::tools::eraser::EraserTool;

    let mut s = Session::new(64, 64);
    let mut pencil = PencilTool::default();
    s.settings.brush = 10.0;
    s.stroke(&mut pencil, &[(5.0, 32.0), (58.0, 32.0)]);
    assert_ne!(s.canvas.base().pixel(32, 32), 0);

    let mut eraser = EraserTool::default();
    s.stroke(&mut eraser, &[(32.0, 5.0), (32.0, 58.0)]);
    assert_eq!(s.canvas.base().pixel(32, 32), 0);
    // Stroke remains either side of the erased band.
    assert_ne!(s.canvas.base().pixel(8, 32), 0);
    assert_ne!(s.canvas.base().pixel(56, 32), 0);
    assert_eq!(s.history.depth(), 3);
}
