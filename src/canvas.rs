use rayon::prelude::*;

use crate::raster::{self, PixelBuffer};

// ============================================================================
// CANVAS — committed base + transient preview overlay
// ============================================================================

/// The two-layer raster model: `base` holds committed pixels, `overlay` holds
/// the transient preview of the gesture in flight. Both buffers always have
/// identical dimensions and start fully transparent.
///
/// Preview tools draw on the overlay and call [`Canvas::commit_overlay`] on
/// release; direct tools draw straight on the base.
pub struct Canvas {
    base: PixelBuffer,
    overlay: PixelBuffer,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            base: PixelBuffer::new(width, height),
            overlay: PixelBuffer::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.base.width()
    }

    pub fn height(&self) -> u32 {
        self.base.height()
    }

    pub fn base(&self) -> &PixelBuffer {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut PixelBuffer {
        &mut self.base
    }

    pub fn overlay(&self) -> &PixelBuffer {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut PixelBuffer {
        &mut self.overlay
    }

    pub fn clear_base_transparent(&mut self) {
        self.base.clear();
    }

    pub fn clear_overlay(&mut self) {
        self.overlay.clear();
    }

    /// Deep copy of the committed pixels, alpha preserved.
    pub fn snapshot_base(&self) -> PixelBuffer {
        self.base.clone()
    }

    /// Replace the committed pixels wholesale (undo/redo restore, file open).
    pub fn restore_base(&mut self, snapshot: &PixelBuffer) {
        if snapshot.width() == self.base.width() && snapshot.height() == self.base.height() {
            self.base = snapshot.clone();
        } else {
            // Snapshot from before a resize: clear, then blit at the origin.
            self.base.clear();
            self.base.blit(snapshot, 0, 0);
        }
    }

    /// Source-over composite the overlay into the base, then clear the
    /// overlay. Produces the same pixels as drawing the overlay content
    /// directly onto the base; a no-op when the overlay is empty.
    pub fn commit_overlay(&mut self) {
        let w = self.base.width() as usize;
        self.base
            .as_mut_slice()
            .par_chunks_mut(w)
            .zip(self.overlay.as_slice().par_chunks(w))
            .for_each(|(dst_row, src_row)| {
                for (d, s) in dst_row.iter_mut().zip(src_row) {
                    if *s != 0 {
                        *d = raster::source_over(*d, *s);
                    }
                }
            });
        self.overlay.clear();
    }

    /// Allocate fresh transparent buffers of the new size, blit the old base
    /// at (0,0) and discard the overlay. Content is preserved; new area is
    /// transparent.
    pub fn resize(&mut self, new_w: u32, new_h: u32) {
        if new_w == 0 || new_h == 0 {
            return;
        }
        if new_w == self.base.width() && new_h == self.base.height() {
            return;
        }
        let mut base = PixelBuffer::new(new_w, new_h);
        base.blit(&self.base, 0, 0);
        self.base = base;
        self.overlay = PixelBuffer::new(new_w, new_h);
    }
}

// ============================================================================
// SELECTION — a detached sub-raster floating over the base
// ============================================================================

/// The floating-image model shared by marquee select, move and paste: a
/// detached sub-buffer plus its placement on the base.
///
/// `floating` is true while the pixels have been cut out of the base and
/// live only on the overlay ghost; dropping a floating selection must first
/// restore them (cancellation invariant). After a move commit the pixels are
/// back in the base and the selection is merely an outline (`floating ==
/// false`).
pub struct Selection {
    pub image: PixelBuffer,
    pub x: f32,
    pub y: f32,
    pub floating: bool,
}

impl Selection {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Intersection of the selection rectangle with the canvas, rounded to
    /// whole pixels. None when the selection lies entirely off-canvas.
    /// Re-cuts and clipboard reads go through this so the grabbed pixels
    /// and their placement share one coordinate frame.
    pub fn canvas_rect(&self, canvas: &Canvas) -> Option<(u32, u32, u32, u32)> {
        let x = self.x.round() as i32;
        let y = self.y.round() as i32;
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + self.width() as i32).min(canvas.width() as i32);
        let y1 = (y + self.height() as i32).min(canvas.height() as i32);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32))
    }

    /// Put the cut pixels back on the base at the selection's position.
    /// No-op for anchored selections.
    pub fn restore_to(&mut self, canvas: &mut Canvas) {
        if self.floating {
            canvas
                .base_mut()
                .draw_image(&self.image, self.x.round() as i32, self.y.round() as i32);
            self.floating = false;
        }
    }
}

/// Where a pasted image of `img_w`×`img_h` lands when requested at
/// `cursor`: the top-left is pulled back so the whole image fits on a
/// `canvas_w`×`canvas_h` canvas (images larger than the canvas anchor at
/// the origin and clip on the far edges).
pub fn paste_anchor(
    canvas_w: u32,
    canvas_h: u32,
    cursor: (f32, f32),
    img_w: u32,
    img_h: u32,
) -> (i32, i32) {
    let x = (cursor.0.round() as i32)
        .min(canvas_w as i32 - img_w as i32)
        .max(0);
    let y = (cursor.1.round() as i32)
        .min(canvas_h as i32 - img_h as i32)
        .max(0);
    (x, y)
}

// ============================================================================
// TOOL SETTINGS — host-provided, tool-consumed
// ============================================================================

/// Fill-region connectivity for the bucket tool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Connectivity {
    /// N, E, S, W neighbors only.
    #[default]
    FourWay,
    /// Adds the four diagonals.
    EightWay,
}

impl Connectivity {
    pub fn offsets(&self) -> &'static [(i32, i32)] {
        const N4: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
        const N8: [(i32, i32); 8] = [
            (1, 0),
            (-1, 0),
            (0, 1),
            (0, -1),
            (1, 1),
            (1, -1),
            (-1, 1),
            (-1, -1),
        ];
        match self {
            Connectivity::FourWay => &N4,
            Connectivity::EightWay => &N8,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Connectivity::FourWay => "4-way",
            Connectivity::EightWay => "8-way",
        }
    }
}

/// Font choice for the text tool.
#[derive(Clone, Debug)]
pub struct FontSpec {
    pub family: String,
    pub size: f32,
    pub bold: bool,
    pub italic: bool,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: "Arial".to_string(),
            size: 20.0,
            bold: false,
            italic: false,
        }
    }
}

/// Drawing properties owned by the host and read by the tools.
#[derive(Clone, Debug)]
pub struct ToolSettings {
    /// Outline / stroke color (packed ARGB).
    pub stroke: u32,
    /// Interior fill color; fully transparent means "no fill".
    pub fill: u32,
    /// Text color; falls back to opaque black when transparent.
    pub text_color: u32,
    /// Brush diameter in canvas pixels, 1..=50.
    pub brush: f32,
    pub font: FontSpec,
    /// Bucket tolerance in [0, 1].
    pub fill_tolerance: f32,
    pub fill_connectivity: Connectivity,
    /// Mask dilation passes after region growth, 0..=3.
    pub fill_expand: u8,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            stroke: 0xFF00_0000,
            fill: 0x0000_0000,
            text_color: 0xFF00_0000,
            brush: 3.0,
            font: FontSpec::default(),
            fill_tolerance: 0.0,
            fill_connectivity: Connectivity::FourWay,
            fill_expand: 0,
        }
    }
}

impl ToolSettings {
    pub fn brush(&self) -> f32 {
        self.brush.clamp(1.0, 50.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_overlay_matches_direct_draw() {
        let mut a = Canvas::new(8, 8);
        let mut b = Canvas::new(8, 8);
        a.base_mut().put_pixel(1, 1, 0xFF11_2233);
        b.base_mut().put_pixel(1, 1, 0xFF11_2233);

        // Draw the same semi-transparent square via overlay-commit vs direct.
        for y in 0..4 {
            for x in 0..4 {
                a.overlay_mut().put_pixel(x, y, 0x80AA_0000);
                b.base_mut().blend_pixel(x, y, 0x80AA_0000);
            }
        }
        a.commit_overlay();
        assert_eq!(a.base().as_slice(), b.base().as_slice());
        assert!(a.overlay().as_slice().iter().all(|&p| p == 0));
    }

    #[test]
    fn test_commit_overlay_idempotent_when_empty() {
        let mut c = Canvas::new(4, 4);
        c.base_mut().put_pixel(2, 2, 0xFFAB_CDEF);
        let before = c.snapshot_base();
        c.commit_overlay();
        c.commit_overlay();
        assert_eq!(c.base().as_slice(), before.as_slice());
    }

    #[test]
    fn test_resize_preserves_content() {
        let mut c = Canvas::new(4, 4);
        c.base_mut().put_pixel(3, 3, 0xFF01_0101);
        c.overlay_mut().put_pixel(0, 0, 0xFF09_0909);
        c.resize(6, 6);
        assert_eq!(c.width(), 6);
        assert_eq!(c.base().pixel(3, 3), 0xFF01_0101);
        assert_eq!(c.base().pixel(5, 5), 0);
        // Overlay is discarded on resize.
        assert!(c.overlay().as_slice().iter().all(|&p| p == 0));
    }

    #[test]
    fn test_selection_restore() {
        let mut c = Canvas::new(6, 6);
        let mut img = PixelBuffer::new(2, 2);
        img.fill(0xFF12_3456);
        let mut sel = Selection { image: img, x: 1.0, y: 1.0, floating: true };
        sel.restore_to(&mut c);
        assert_eq!(c.base().pixel(1, 1), 0xFF12_3456);
        assert!(!sel.floating);
        // Anchored restore is a no-op.
        c.clear_base_transparent();
        sel.restore_to(&mut c);
        assert_eq!(c.base().pixel(1, 1), 0);
    }
}
