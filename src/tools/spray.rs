use std::f32::consts::TAU;

use crate::tools::{PointerEvent, Tool, ToolCtx};

/// Particles stamped per pointer event.
const PARTICLES: u32 = 30;

/// Airbrush: scatters single-pixel dots around the cursor on every press
/// and drag event. Placement uses a hash of the event and particle counters
/// so a replayed gesture produces the same pixels.
#[derive(Default)]
pub struct SprayTool {
    active: bool,
    event_count: u32,
}

impl SprayTool {
    fn spray_at(&mut self, ctx: &mut ToolCtx, x: f32, y: f32) {
        let radius = ctx.settings.brush() * 0.8;
        let color = ctx.settings.stroke;
        for i in 0..PARTICLES {
            let seed = self
                .event_count
                .wrapping_mul(0x9E37_79B9)
                .wrapping_add(i);
            let angle = hash01(seed) * TAU;
            let dist = hash01(seed.wrapping_add(0x9E37_79B9)) * radius;
            let px = x + angle.cos() * dist;
            let py = y + angle.sin() * dist;
            ctx.canvas
                .base_mut()
                .blend_pixel(px.round() as i32, py.round() as i32, color);
        }
        self.event_count = self.event_count.wrapping_add(1);
    }
}

/// xxhash-style avalanche, mapped to [0, 1).
fn hash01(mut x: u32) -> f32 {
    x ^= x >> 16;
    x = x.wrapping_mul(0x85EB_CA6B);
    x ^= x >> 13;
    x = x.wrapping_mul(0xC2B2_AE35);
    x ^= x >> 16;
    (x >> 8) as f32 / (1u32 << 24) as f32
}

impl Tool for SprayTool {
    fn name(&self) -> &'static str {
        "Spray"
    }

    fn on_select(&mut self, ctx: &mut ToolCtx) {
        *ctx.status = "Spray: hold and drag to airbrush".to_string();
    }

    fn on_press(&mut self, ctx: &mut ToolCtx, ev: &PointerEvent) {
        self.active = true;
        self.event_count = 0;
        self.spray_at(ctx, ev.x, ev.y);
    }

    fn on_drag(&mut self, ctx: &mut ToolCtx, ev: &PointerEvent) {
        if self.active {
            self.spray_at(ctx, ev.x, ev.y);
        }
    }

    fn on_release(&mut self, ctx: &mut ToolCtx, _ev: &PointerEvent) {
        if self.active {
            self.active = false;
            ctx.history.push(ctx.canvas);
        }
    }

    fn on_cancel(&mut self, ctx: &mut ToolCtx) {
        if self.active {
            self.active = false;
            ctx.canvas.restore_base(ctx.history.current());
        }
    }
}
