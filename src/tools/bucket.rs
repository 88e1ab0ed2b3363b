use crate::fill::{flood_fill, FillOutcome};
use crate::tools::{PointerEvent, Tool, ToolCtx};

/// Bucket fill: a single press floods the clicked region with the stroke
/// color under the current tolerance / connectivity / expand settings.
/// There is no preview; the fill lands directly on the base.
#[derive(Default)]
pub struct BucketTool;

impl Tool for BucketTool {
    fn name(&self) -> &'static str {
        "Bucket"
    }

    fn on_select(&mut self, ctx: &mut ToolCtx) {
        *ctx.status = format!(
            "Bucket: click to fill (tolerance {:.2}, {}, expand {})",
            ctx.settings.fill_tolerance,
            ctx.settings.fill_connectivity.label(),
            ctx.settings.fill_expand,
        );
    }

    fn on_press(&mut self, ctx: &mut ToolCtx, ev: &PointerEvent) {
        let outcome = flood_fill(
            ctx.canvas.base_mut(),
            ev.x.floor() as i32,
            ev.y.floor() as i32,
            ctx.settings.stroke,
            ctx.settings.fill_tolerance,
            ctx.settings.fill_connectivity,
            ctx.settings.fill_expand,
        );
        match outcome {
            FillOutcome::Filled => {
                ctx.history.push(ctx.canvas);
                *ctx.status = "Filled".to_string();
            }
            FillOutcome::NoChange => *ctx.status = "Already that color".to_string(),
            FillOutcome::OutOfBounds => *ctx.status = "Click inside the canvas to fill".to_string(),
            FillOutcome::TooLarge => *ctx.status = "Canvas too large to fill".to_string(),
        }
    }
}
