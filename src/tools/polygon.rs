use crate::draw;
use crate::raster;
use crate::tools::{PointerEvent, Tool, ToolCtx};

/// Scene-space distance to the first vertex that closes the polygon.
const CLOSE_SNAP_SCENE: f64 = 10.0;

/// Click-to-place polygon: each press adds a vertex, pressing within snap
/// range of the first vertex (or Enter / the menu action) closes and
/// commits the shape as a single history entry. The in-progress outline
/// lives on the overlay.
#[derive(Default)]
pub struct PolygonTool {
    vertices: Vec<(f32, f32)>,
}

impl PolygonTool {
    pub fn is_building(&self) -> bool {
        !self.vertices.is_empty()
    }

    /// Close and commit the polygon if it has at least three vertices;
    /// otherwise abandon it.
    pub fn commit(&mut self, ctx: &mut ToolCtx) {
        let vertices = std::mem::take(&mut self.vertices);
        ctx.canvas.clear_overlay();
        if vertices.len() < 3 {
            *ctx.status = "Polygon needs at least 3 points".to_string();
            return;
        }
        if raster::alpha(ctx.settings.fill) > 0 {
            draw::fill_polygon(ctx.canvas.overlay_mut(), &vertices, ctx.settings.fill);
        }
        draw::stroke_polygon(
            ctx.canvas.overlay_mut(),
            &vertices,
            ctx.settings.brush(),
            ctx.settings.stroke,
        );
        ctx.canvas.commit_overlay();
        ctx.history.push(ctx.canvas);
        *ctx.status = "Polygon committed".to_string();
    }

    fn redraw_preview(&self, ctx: &mut ToolCtx, cursor: Option<(f32, f32)>) {
        ctx.canvas.clear_overlay();
        if self.vertices.is_empty() {
            return;
        }
        let mut pts = self.vertices.clone();
        if let Some(c) = cursor {
            pts.push(c);
        }
        draw::stroke_path(
            ctx.canvas.overlay_mut(),
            &pts,
            ctx.settings.brush(),
            ctx.settings.stroke,
        );
    }

    fn near_first_vertex(&self, ctx: &ToolCtx, ev: &PointerEvent) -> bool {
        let Some(&(fx, fy)) = self.vertices.first() else {
            return false;
        };
        let (sx, sy) = ctx.viewport.canvas_to_scene(fx as f64, fy as f64);
        let d = (ev.scene_x - sx).hypot(ev.scene_y - sy);
        d <= CLOSE_SNAP_SCENE
    }
}

impl Tool for PolygonTool {
    fn name(&self) -> &'static str {
        "Polygon"
    }

    fn on_select(&mut self, ctx: &mut ToolCtx) {
        *ctx.status = "Polygon: click to add points, click the first point or press Enter to close".to_string();
    }

    fn on_deselect(&mut self, ctx: &mut ToolCtx) {
        // Switching tools abandons the unfinished outline.
        self.on_cancel(ctx);
    }

    fn on_press(&mut self, ctx: &mut ToolCtx, ev: &PointerEvent) {
        if self.vertices.len() >= 3 && self.near_first_vertex(ctx, ev) {
            self.commit(ctx);
            return;
        }
        self.vertices.push((ev.x, ev.y));
        self.redraw_preview(ctx, None);
        *ctx.status = format!("Polygon: {} point(s)", self.vertices.len());
    }

    fn on_drag(&mut self, ctx: &mut ToolCtx, ev: &PointerEvent) {
        if self.is_building() {
            self.redraw_preview(ctx, Some((ev.x, ev.y)));
        }
    }

    fn on_release(&mut self, ctx: &mut ToolCtx, _ev: &PointerEvent) {
        if self.is_building() {
            self.redraw_preview(ctx, None);
        }
    }

    fn on_cancel(&mut self, ctx: &mut ToolCtx) {
        if !self.vertices.is_empty() {
            self.vertices.clear();
            ctx.canvas.clear_overlay();
            *ctx.status = "Polygon abandoned".to_string();
        }
    }

    fn on_confirm(&mut self, ctx: &mut ToolCtx) {
        if self.is_building() {
            self.commit(ctx);
        }
    }
}
