// ============================================================================
// VIEWPORT — zoom/pan math between canvas-local and scene coordinates
// ============================================================================

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 8.0;

/// Base wheel-zoom step; Shift accelerates it, Ctrl/Meta refines it.
const WHEEL_STEP: f64 = 1.10;

/// Zoom factor plus pan translation. The canvas-to-scene transform is
/// translate ∘ scale: `scene = translate + zoom · canvas`.
///
/// Zoom is always clamped to [0.1, 8.0]; pan is unrestricted.
#[derive(Clone, Debug)]
pub struct Viewport {
    zoom: f64,
    tx: f64,
    ty: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { zoom: 1.0, tx: 0.0, ty: 0.0 }
    }
}

impl Viewport {
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn translate(&self) -> (f64, f64) {
        (self.tx, self.ty)
    }

    pub fn canvas_to_scene(&self, x: f64, y: f64) -> (f64, f64) {
        (self.tx + self.zoom * x, self.ty + self.zoom * y)
    }

    pub fn scene_to_canvas(&self, sx: f64, sy: f64) -> (f64, f64) {
        ((sx - self.tx) / self.zoom, (sy - self.ty) / self.zoom)
    }

    /// Translate by a canvas-local delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.tx += dx;
        self.ty += dy;
    }

    /// Translate by a scene-space delta; divides by zoom so panning feels
    /// stable regardless of magnification.
    pub fn pan_by_scene(&mut self, sdx: f64, sdy: f64) {
        self.pan_by(sdx / self.zoom, sdy / self.zoom);
    }

    /// Multiply the zoom by `factor`, keeping the canvas point under the
    /// scene coordinate (sx, sy) fixed on screen. Returns false if the zoom
    /// was already at its clamp and nothing changed.
    pub fn zoom_at_scene(&mut self, sx: f64, sy: f64, factor: f64) -> bool {
        let new_zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        if (new_zoom - self.zoom).abs() < 1e-9 {
            return false;
        }
        let (cx, cy) = self.scene_to_canvas(sx, sy);
        self.zoom = new_zoom;
        self.tx = sx - cx * new_zoom;
        self.ty = sy - cy * new_zoom;
        true
    }

    /// Wheel-zoom stepping: base step 1.10, Shift → step^1.8 (coarse),
    /// Ctrl/Meta → step^0.35 (fine). Scrolling up zooms in. Events with
    /// delta_y == 0 are ignored.
    pub fn wheel_zoom(&mut self, sx: f64, sy: f64, delta_y: f64, shift: bool, ctrl_or_meta: bool) -> bool {
        if delta_y == 0.0 {
            return false;
        }
        let mut step = WHEEL_STEP;
        if shift {
            step = step.powf(1.8);
        }
        if ctrl_or_meta {
            step = step.powf(0.35);
        }
        let factor = if delta_y > 0.0 { step } else { 1.0 / step };
        self.zoom_at_scene(sx, sy, factor)
    }

    pub fn reset(&mut self) {
        *self = Viewport::default();
    }

    /// The status-bar readout, refreshed on every viewport change.
    pub fn status_line(&self) -> String {
        format!("Zoom {:.2}×   Pan({:.0}, {:.0})", self.zoom, self.tx, self.ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_clamped() {
        let mut vp = Viewport::default();
        assert!(vp.zoom_at_scene(0.0, 0.0, 100.0));
        assert_eq!(vp.zoom(), MAX_ZOOM);
        // Further zooming in at the clamp is a no-op.
        assert!(!vp.zoom_at_scene(0.0, 0.0, 2.0));

        let mut vp = Viewport::default();
        assert!(vp.zoom_at_scene(0.0, 0.0, 1e-6));
        assert_eq!(vp.zoom(), MIN_ZOOM);
    }

    #[test]
    fn test_zoom_keeps_cursor_pixel_fixed() {
        let mut vp = Viewport::default();
        vp.pan_by(13.0, -7.0);
        let (cx, cy) = vp.scene_to_canvas(200.0, 150.0);
        assert!(vp.zoom_at_scene(200.0, 150.0, 2.0));
        let (sx, sy) = vp.canvas_to_scene(cx, cy);
        assert!((sx - 200.0).abs() < 1e-6);
        assert!((sy - 150.0).abs() < 1e-6);
    }

    #[test]
    fn test_pan_by_scene_scales_with_zoom() {
        let mut vp = Viewport::default();
        vp.zoom_at_scene(0.0, 0.0, 2.0);
        vp.pan_by_scene(10.0, -4.0);
        let (tx, ty) = vp.translate();
        assert!((tx - 5.0).abs() < 1e-9);
        assert!((ty + 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_wheel_zoom_steps() {
        let mut vp = Viewport::default();
        assert!(vp.wheel_zoom(0.0, 0.0, 1.0, false, false));
        assert!((vp.zoom() - 1.10).abs() < 1e-9);

        let mut vp = Viewport::default();
        assert!(vp.wheel_zoom(0.0, 0.0, -1.0, false, false));
        assert!((vp.zoom() - 1.0 / 1.10).abs() < 1e-9);

        let mut vp = Viewport::default();
        assert!(vp.wheel_zoom(0.0, 0.0, 1.0, true, false));
        assert!((vp.zoom() - 1.10f64.powf(1.8)).abs() < 1e-9);

        let mut vp = Viewport::default();
        assert!(vp.wheel_zoom(0.0, 0.0, 1.0, false, true));
        assert!((vp.zoom() - 1.10f64.powf(0.35)).abs() < 1e-9);

        // delta_y == 0 is ignored.
        let mut vp = Viewport::default();
        assert!(!vp.wheel_zoom(0.0, 0.0, 0.0, false, false));
        assert_eq!(vp.zoom(), 1.0);
    }

    #[test]
    fn test_status_line_format() {
        let vp = Viewport::default();
        assert_eq!(vp.status_line(), "Zoom 1.00×   Pan(0, 0)");
    }
}
