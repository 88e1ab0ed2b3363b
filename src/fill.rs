use std::collections::VecDeque;

use crate::canvas::Connectivity;
use crate::raster::{self, PixelBuffer};

// ============================================================================
// BUCKET FILL — tolerant flood fill with mask build + optional dilation
// ============================================================================

/// Canvases beyond this pixel count are refused (pathological allocation guard).
pub const MAX_PIXELS: u64 = 16_000_000;

/// Outcome of a fill request, reported to the status bar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillOutcome {
    /// Pixels were written; the caller should push history.
    Filled,
    /// Nothing to do (seed already the fill color at zero tolerance).
    NoChange,
    /// Seed outside the canvas.
    OutOfBounds,
    /// Canvas exceeds [`MAX_PIXELS`].
    TooLarge,
}

/// Tolerant flood fill on a snapshot of `base`.
///
/// The region is grown by BFS from the seed over the chosen neighborhood,
/// recorded in a boolean mask, optionally dilated `expand` passes, and then
/// painted back in a single pass — the traversal never reads freshly written
/// pixels, and no intermediate state is ever visible.
pub fn flood_fill(
    base: &mut PixelBuffer,
    seed_x: i32,
    seed_y: i32,
    fill: u32,
    tolerance: f32,
    connectivity: Connectivity,
    expand: u8,
) -> FillOutcome {
    let w = base.width() as i32;
    let h = base.height() as i32;
    if seed_x < 0 || seed_y < 0 || seed_x >= w || seed_y >= h {
        return FillOutcome::OutOfBounds;
    }
    if (w as u64) * (h as u64) > MAX_PIXELS {
        return FillOutcome::TooLarge;
    }

    // Work on a snapshot so traversal order can't affect the mask.
    let snapshot: Vec<u32> = base.as_slice().to_vec();
    let wu = w as usize;

    let seed_idx = seed_y as usize * wu + seed_x as usize;
    let target = snapshot[seed_idx];
    if target == fill && tolerance <= 1e-6 {
        return FillOutcome::NoChange;
    }

    let matcher = ColorMatcher::new(target, tolerance);
    let offsets = connectivity.offsets();

    // Region growth: BFS with visited-before-enqueue marking.
    let mut mask = vec![false; wu * h as usize];
    let mut queue: VecDeque<(i32, i32)> = VecDeque::new();
    mask[seed_idx] = true;
    queue.push_back((seed_x, seed_y));

    while let Some((x, y)) = queue.pop_front() {
        for &(dx, dy) in offsets {
            let nx = x + dx;
            let ny = y + dy;
            if nx < 0 || ny < 0 || nx >= w || ny >= h {
                continue;
            }
            let ni = ny as usize * wu + nx as usize;
            if mask[ni] {
                continue;
            }
            if matcher.matches(snapshot[ni]) {
                mask[ni] = true;
                queue.push_back((nx, ny));
            }
        }
    }

    // Dilation: two-buffer Jacobi passes so each step grows exactly one
    // pixel under the same neighborhood (hugs anti-aliased borders).
    let expand = expand.min(3);
    for _ in 0..expand {
        let mut next = mask.clone();
        for y in 0..h {
            let row = y as usize * wu;
            for x in 0..w {
                let i = row + x as usize;
                if mask[i] {
                    continue;
                }
                let any = offsets.iter().any(|&(dx, dy)| {
                    let nx = x + dx;
                    let ny = y + dy;
                    nx >= 0 && ny >= 0 && nx < w && ny < h && mask[ny as usize * wu + nx as usize]
                });
                if any {
                    next[i] = true;
                }
            }
        }
        mask = next;
    }

    // Paint: overwrite masked pixels in one pass.
    let out = base.as_mut_slice();
    for (i, &inside) in mask.iter().enumerate() {
        if inside {
            out[i] = fill;
        }
    }
    FillOutcome::Filled
}

/// Per-fill color matching against the target pixel.
///
/// Exact matches always pass. A fully transparent target compares alpha
/// only; otherwise the test is a weighted Euclidean distance over RGB with
/// alpha at half weight, normalized to ~[0, 1.2].
struct ColorMatcher {
    target: u32,
    ta: i32,
    tr: i32,
    tg: i32,
    tb: i32,
    max_dist: f64,
}

impl ColorMatcher {
    fn new(target: u32, tolerance: f32) -> Self {
        Self {
            target,
            ta: raster::alpha(target) as i32,
            tr: raster::red(target) as i32,
            tg: raster::green(target) as i32,
            tb: raster::blue(target) as i32,
            max_dist: tolerance_to_distance(tolerance),
        }
    }

    #[inline]
    fn matches(&self, argb: u32) -> bool {
        if argb == self.target {
            return true;
        }
        let a = raster::alpha(argb) as i32;
        if self.ta == 0 {
            // Fully transparent target: compare mostly alpha.
            return (a - self.ta).abs() as f64 <= self.max_dist * 255.0;
        }
        let dr = (raster::red(argb) as i32 - self.tr) as f64;
        let dg = (raster::green(argb) as i32 - self.tg) as f64;
        let db = (raster::blue(argb) as i32 - self.tb) as f64;
        let da = (a - self.ta) as f64 * 0.5; // alpha half-weight
        let dist = (dr * dr + dg * dg + db * db + da * da).sqrt() / 255.0;
        dist <= self.max_dist
    }
}

/// Map UI tolerance in [0,1] to a color-space distance threshold.
fn tolerance_to_distance(tol: f32) -> f64 {
    (tol.clamp(0.0, 1.0) as f64).powf(0.8) * 0.9
}
