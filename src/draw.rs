//! CPU raster primitives for the base/overlay buffers.
//!
//! Strokes are rendered as signed-distance bands with smoothstep edge
//! coverage, which gives round caps and joints for free. Coverage is
//! computed once per pixel across a whole path (minimum distance over all
//! segments) so overlapping joints never double-blend a translucent color.

use rayon::prelude::*;

use crate::raster::{self, PixelBuffer};

/// Stroke a straight line with round caps.
pub fn stroke_line(buf: &mut PixelBuffer, x0: f32, y0: f32, x1: f32, y1: f32, width: f32, argb: u32) {
    stroke_path(buf, &[(x0, y0), (x1, y1)], width, argb);
}

/// Stroke a quadratic Bézier (round caps), flattened to short segments.
pub fn stroke_quad(
    buf: &mut PixelBuffer,
    x0: f32,
    y0: f32,
    cx: f32,
    cy: f32,
    x1: f32,
    y1: f32,
    width: f32,
    argb: u32,
) {
    let len = approx_quad_length(x0, y0, cx, cy, x1, y1);
    let n = ((len / 3.0).ceil() as usize).clamp(2, 64);
    let mut pts = Vec::with_capacity(n + 1);
    for i in 0..=n {
        let t = i as f32 / n as f32;
        let u = 1.0 - t;
        pts.push((
            u * u * x0 + 2.0 * u * t * cx + t * t * x1,
            u * u * y0 + 2.0 * u * t * cy + t * t * y1,
        ));
    }
    stroke_path(buf, &pts, width, argb);
}

/// Stroke an open polyline with round caps and joints.
///
/// One coverage evaluation per pixel over the combined bounding box; the
/// distance is the minimum over every segment of the path.
pub fn stroke_path(buf: &mut PixelBuffer, pts: &[(f32, f32)], width: f32, argb: u32) {
    if pts.is_empty() || raster::alpha(argb) == 0 {
        return;
    }
    let half = (width.max(1.0)) * 0.5;

    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    let mut max_x = f32::MIN;
    let mut max_y = f32::MIN;
    for &(x, y) in pts {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    let pad = half + 1.5;
    let (x0, y0, x1, y1) = clamp_box(buf, min_x - pad, min_y - pad, max_x + pad, max_y + pad);
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    let w = buf.width() as usize;
    buf.as_mut_slice()
        .par_chunks_mut(w)
        .enumerate()
        .filter(|(row, _)| *row >= y0 as usize && (*row as i32) < y1)
        .for_each(|(row, row_buf)| {
            let py = row as f32 + 0.5;
            for col in x0..x1 {
                let px = col as f32 + 0.5;
                let mut d = dist_to_point(px, py, pts[0].0, pts[0].1);
                for seg in pts.windows(2) {
                    d = d.min(dist_to_segment(px, py, seg[0].0, seg[0].1, seg[1].0, seg[1].1));
                }
                let cov = smoothstep(0.5, -0.5, d - half);
                blend_row(row_buf, col as usize, argb, cov);
            }
        });
}

/// Stroke a closed polygon outline (last vertex connects back to the first).
pub fn stroke_polygon(buf: &mut PixelBuffer, pts: &[(f32, f32)], width: f32, argb: u32) {
    if pts.len() < 2 {
        return;
    }
    let mut closed: Vec<(f32, f32)> = pts.to_vec();
    closed.push(pts[0]);
    stroke_path(buf, &closed, width, argb);
}

/// Fill a polygon using even-odd scanline coverage at pixel centers.
pub fn fill_polygon(buf: &mut PixelBuffer, pts: &[(f32, f32)], argb: u32) {
    if pts.len() < 3 || raster::alpha(argb) == 0 {
        return;
    }
    let min_y = pts.iter().map(|p| p.1).fold(f32::MAX, f32::min);
    let max_y = pts.iter().map(|p| p.1).fold(f32::MIN, f32::max);
    let y0 = (min_y.floor() as i32).max(0);
    let y1 = (max_y.ceil() as i32).min(buf.height() as i32);

    let mut xs: Vec<f32> = Vec::with_capacity(8);
    for yy in y0..y1 {
        let yc = yy as f32 + 0.5;
        xs.clear();
        let n = pts.len();
        for i in 0..n {
            let (ax, ay) = pts[i];
            let (bx, by) = pts[(i + 1) % n];
            if (ay <= yc && yc < by) || (by <= yc && yc < ay) {
                let t = (yc - ay) / (by - ay);
                xs.push(ax + t * (bx - ax));
            }
        }
        xs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        for pair in xs.chunks(2) {
            if pair.len() < 2 {
                continue;
            }
            let sx = (pair[0] - 0.5).ceil().max(0.0) as i32;
            let ex = ((pair[1] - 0.5).floor() as i32).min(buf.width() as i32 - 1);
            for xx in sx..=ex {
                buf.blend_pixel(xx, yy, argb);
            }
        }
    }
}

/// Fill an axis-aligned rectangle with exact separable edge coverage.
pub fn fill_rect(buf: &mut PixelBuffer, x: f32, y: f32, w: f32, h: f32, argb: u32) {
    if w <= 0.0 || h <= 0.0 || raster::alpha(argb) == 0 {
        return;
    }
    let (x0, y0, x1, y1) = clamp_box(buf, x, y, x + w, y + h);
    if x0 >= x1 || y0 >= y1 {
        return;
    }
    let bw = buf.width() as usize;
    let (rx0, ry0, rx1, ry1) = (x, y, x + w, y + h);
    buf.as_mut_slice()
        .par_chunks_mut(bw)
        .enumerate()
        .filter(|(row, _)| *row >= y0 as usize && (*row as i32) < y1)
        .for_each(|(row, row_buf)| {
            let cov_y = overlap(row as f32, row as f32 + 1.0, ry0, ry1);
            if cov_y <= 0.0 {
                return;
            }
            for col in x0..x1 {
                let cov_x = overlap(col as f32, col as f32 + 1.0, rx0, rx1);
                blend_row(row_buf, col as usize, argb, cov_x * cov_y);
            }
        });
}

/// Stroke a rectangle outline (round joints at the corners).
pub fn stroke_rect(buf: &mut PixelBuffer, x: f32, y: f32, w: f32, h: f32, width: f32, argb: u32) {
    stroke_polygon(buf, &[(x, y), (x + w, y), (x + w, y + h), (x, y + h)], width, argb);
}

/// Fill an ellipse inscribed in the rect (x, y, w, h).
pub fn fill_oval(buf: &mut PixelBuffer, x: f32, y: f32, w: f32, h: f32, argb: u32) {
    oval_pass(buf, x, y, w, h, 1.5, argb, |d| smoothstep(0.5, -0.5, d));
}

/// Stroke an ellipse outline inscribed in the rect (x, y, w, h).
pub fn stroke_oval(buf: &mut PixelBuffer, x: f32, y: f32, w: f32, h: f32, width: f32, argb: u32) {
    let half = width.max(1.0) * 0.5;
    oval_pass(buf, x, y, w, h, half + 1.5, argb, move |d| {
        smoothstep(0.5, -0.5, d.abs() - half)
    });
}

fn oval_pass(
    buf: &mut PixelBuffer,
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    pad: f32,
    argb: u32,
    coverage: impl Fn(f32) -> f32 + Sync,
) {
    if w <= 0.0 || h <= 0.0 || raster::alpha(argb) == 0 {
        return;
    }
    let cx = x + w * 0.5;
    let cy = y + h * 0.5;
    let rx = (w * 0.5).max(0.25);
    let ry = (h * 0.5).max(0.25);
    let (x0, y0, x1, y1) = clamp_box(buf, x - pad, y - pad, x + w + pad, y + h + pad);
    if x0 >= x1 || y0 >= y1 {
        return;
    }
    let bw = buf.width() as usize;
    buf.as_mut_slice()
        .par_chunks_mut(bw)
        .enumerate()
        .filter(|(row, _)| *row >= y0 as usize && (*row as i32) < y1)
        .for_each(|(row, row_buf)| {
            let py = row as f32 + 0.5;
            for col in x0..x1 {
                let px = col as f32 + 0.5;
                let d = sdf_ellipse(px - cx, py - cy, rx, ry);
                blend_row(row_buf, col as usize, argb, coverage(d));
            }
        });
}

/// Hard transparent circle stamp used by the eraser: every pixel whose
/// center lies within the radius is set to 0x00000000 (no blending).
/// Per-row horizontal span scan.
pub fn stamp_clear_circle(buf: &mut PixelBuffer, x: f32, y: f32, diameter: f32) {
    let r = diameter * 0.5;
    let r2 = r * r;
    let min_y = ((y - r).floor() as i32).max(0);
    let max_y = ((y + r).ceil() as i32).min(buf.height() as i32 - 1);
    let w = buf.width() as i32;
    for yy in min_y..=max_y {
        let dy = (yy as f32 + 0.5) - y;
        let span2 = r2 - dy * dy;
        if span2 < 0.0 {
            continue;
        }
        let span = span2.sqrt();
        let sx = ((x - span).floor() as i32).max(0);
        let ex = ((x + span).ceil() as i32).min(w - 1);
        for xx in sx..=ex {
            let dx = (xx as f32 + 0.5) - x;
            if dx * dx + dy * dy <= r2 {
                buf.put_pixel(xx, yy, 0);
            }
        }
    }
}

/// Dashed rectangle outline for the selection marquee (6-px dashes).
pub fn dashed_rect(buf: &mut PixelBuffer, x: f32, y: f32, w: f32, h: f32, width: f32, argb: u32) {
    const DASH: f32 = 6.0;
    let corners = [(x, y), (x + w, y), (x + w, y + h), (x, y + h), (x, y)];
    let mut phase = 0.0f32;
    for seg in corners.windows(2) {
        let (ax, ay) = seg[0];
        let (bx, by) = seg[1];
        let len = ((bx - ax).powi(2) + (by - ay).powi(2)).sqrt();
        if len < 1e-6 {
            continue;
        }
        let (ux, uy) = ((bx - ax) / len, (by - ay) / len);
        let mut t = 0.0;
        while t < len {
            let on = (((t + phase) / DASH).floor() as i32) % 2 == 0;
            let t2 = (t + DASH - (t + phase).rem_euclid(DASH)).min(len);
            if on {
                stroke_line(
                    buf,
                    ax + ux * t,
                    ay + uy * t,
                    ax + ux * t2,
                    ay + uy * t2,
                    width,
                    argb,
                );
            }
            t = t2;
        }
        phase = (phase + len).rem_euclid(2.0 * DASH);
    }
}

// ============================================================================
// Internals
// ============================================================================

#[inline]
fn blend_row(row: &mut [u32], col: usize, argb: u32, coverage: f32) {
    if coverage <= 0.001 {
        return;
    }
    let a = (raster::alpha(argb) as f32 * coverage.min(1.0)).round() as u32;
    if a == 0 {
        return;
    }
    let src = (argb & 0x00FF_FFFF) | (a << 24);
    row[col] = raster::source_over(row[col], src);
}

#[inline]
fn clamp_box(buf: &PixelBuffer, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> (i32, i32, i32, i32) {
    (
        (min_x.floor() as i32).max(0),
        (min_y.floor() as i32).max(0),
        (max_x.ceil() as i32).min(buf.width() as i32),
        (max_y.ceil() as i32).min(buf.height() as i32),
    )
}

/// Overlap length of [a0, a1) with [b0, b1), clamped to [0, 1].
#[inline]
fn overlap(a0: f32, a1: f32, b0: f32, b1: f32) -> f32 {
    (a1.min(b1) - a0.max(b0)).clamp(0.0, 1.0)
}

#[inline]
fn dist_to_point(px: f32, py: f32, ax: f32, ay: f32) -> f32 {
    ((px - ax) * (px - ax) + (py - ay) * (py - ay)).sqrt()
}

/// Distance from (px, py) to the segment (ax, ay)–(bx, by).
#[inline]
fn dist_to_segment(px: f32, py: f32, ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    let dx = bx - ax;
    let dy = by - ay;
    let len2 = dx * dx + dy * dy;
    if len2 < 1e-12 {
        return dist_to_point(px, py, ax, ay);
    }
    let t = (((px - ax) * dx + (py - ay) * dy) / len2).clamp(0.0, 1.0);
    dist_to_point(px, py, ax + t * dx, ay + t * dy)
}

/// SDF for an ellipse centred at the origin (approximation).
#[inline]
fn sdf_ellipse(px: f32, py: f32, rx: f32, ry: f32) -> f32 {
    let nx = px / rx;
    let ny = py / ry;
    let len = (nx * nx + ny * ny).sqrt();
    if len < 1e-8 {
        return -rx.min(ry);
    }
    let scale = (rx * rx * ny * ny + ry * ry * nx * nx).sqrt() / (rx * ry * len);
    (len - 1.0) / scale
}

/// Smoothstep between edge0 and edge1.
#[inline]
fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn approx_quad_length(x0: f32, y0: f32, cx: f32, cy: f32, x1: f32, y1: f32) -> f32 {
    let d1 = ((cx - x0).powi(2) + (cy - y0).powi(2)).sqrt();
    let d2 = ((x1 - cx).powi(2) + (y1 - cy).powi(2)).sqrt();
    let chord = ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt();
    (d1 + d2 + chord) * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: u32 = 0xFF00_0000;

    #[test]
    fn test_stroke_line_covers_center() {
        let mut buf = PixelBuffer::new(20, 20);
        stroke_line(&mut buf, 2.0, 10.0, 18.0, 10.0, 3.0, BLACK);
        assert_eq!(buf.pixel(10, 10), BLACK);
        assert_eq!(buf.pixel(10, 2), 0);
    }

    #[test]
    fn test_stroke_line_round_cap_extends_past_endpoint() {
        let mut buf = PixelBuffer::new(20, 20);
        stroke_line(&mut buf, 5.0, 10.0, 15.0, 10.0, 6.0, BLACK);
        // A round cap reaches ~3px beyond the endpoint.
        assert!(raster::alpha(buf.pixel(3, 10)) > 0);
        assert_eq!(buf.pixel(0, 10), 0);
    }

    #[test]
    fn test_fill_rect_exact_on_integer_bounds() {
        let mut buf = PixelBuffer::new(10, 10);
        fill_rect(&mut buf, 2.0, 2.0, 4.0, 4.0, BLACK);
        for y in 0..10 {
            for x in 0..10 {
                let inside = (2..6).contains(&x) && (2..6).contains(&y);
                assert_eq!(buf.pixel(x, y), if inside { BLACK } else { 0 }, "at {},{}", x, y);
            }
        }
    }

    #[test]
    fn test_fill_polygon_square() {
        let mut buf = PixelBuffer::new(12, 12);
        fill_polygon(&mut buf, &[(2.0, 2.0), (9.0, 2.0), (9.0, 9.0), (2.0, 9.0)], BLACK);
        assert_eq!(buf.pixel(5, 5), BLACK);
        assert_eq!(buf.pixel(1, 5), 0);
        assert_eq!(buf.pixel(10, 5), 0);
    }

    #[test]
    fn test_stamp_clear_circle() {
        let mut buf = PixelBuffer::new(11, 11);
        buf.fill(BLACK);
        stamp_clear_circle(&mut buf, 5.5, 5.5, 6.0);
        assert_eq!(buf.pixel(5, 5), 0);
        assert_eq!(buf.pixel(0, 0), BLACK);
        assert_eq!(buf.pixel(5, 0), BLACK);
    }

    #[test]
    fn test_fill_oval_center_and_corners() {
        let mut buf = PixelBuffer::new(20, 20);
        fill_oval(&mut buf, 2.0, 2.0, 16.0, 16.0, BLACK);
        assert_eq!(buf.pixel(10, 10), BLACK);
        assert_eq!(buf.pixel(2, 2), 0); // corner of the bounding box is outside
    }

    #[test]
    fn test_translucent_path_single_blend_at_joint() {
        // A two-segment path through a sharp corner must not double-blend.
        let half = 0x8000_0000u32 | 0x0000_00FF;
        let mut buf = PixelBuffer::new(20, 20);
        stroke_path(&mut buf, &[(3.0, 3.0), (10.0, 10.0), (3.0, 17.0)], 4.0, half);
        let a = raster::alpha(buf.pixel(10, 10));
        assert!(a <= 0x80 + 1, "joint alpha {} exceeds source alpha", a);
    }
}
