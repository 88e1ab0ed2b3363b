use image::RgbaImage;

// ============================================================================
// PIXEL BUFFER — packed ARGB, non-premultiplied
// ============================================================================

/// An owned W×H raster of packed 32-bit ARGB pixels with straight
/// (non-premultiplied) alpha. Origin is top-left, y grows downward, and a
/// pixel lives at index `y * width + x`.
///
/// Dimensions are fixed for the lifetime of a buffer; resizing the canvas
/// allocates a new buffer and blits the old content.
#[derive(Clone, PartialEq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl PixelBuffer {
    /// Create a fully transparent buffer. Zero dimensions are clamped to 1×1
    /// so downstream index math never divides by zero.
    pub fn new(width: u32, height: u32) -> Self {
        let (width, height) = if width == 0 || height == 0 {
            crate::log_warn!("PixelBuffer::new: zero dimension {}×{}, clamped to 1×1", width, height);
            (1.max(width), 1.max(height))
        } else {
            (width, height)
        };
        Self {
            width,
            height,
            pixels: vec![0u32; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Flat pixel slice, row-major.
    pub fn as_slice(&self) -> &[u32] {
        &self.pixels
    }

    pub fn as_mut_slice(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Read a pixel. Out-of-bounds reads return transparent.
    #[inline]
    pub fn pixel(&self, x: i32, y: i32) -> u32 {
        if self.contains(x, y) {
            self.pixels[y as usize * self.width as usize + x as usize]
        } else {
            0
        }
    }

    /// Overwrite a pixel (no blending). Out-of-bounds writes are dropped.
    #[inline]
    pub fn put_pixel(&mut self, x: i32, y: i32, argb: u32) {
        if self.contains(x, y) {
            let i = y as usize * self.width as usize + x as usize;
            self.pixels[i] = argb;
        }
    }

    /// Source-over blend a pixel. Out-of-bounds writes are dropped.
    #[inline]
    pub fn blend_pixel(&mut self, x: i32, y: i32, argb: u32) {
        if self.contains(x, y) {
            let i = y as usize * self.width as usize + x as usize;
            self.pixels[i] = source_over(self.pixels[i], argb);
        }
    }

    /// Source-over blend with fractional coverage (anti-aliased edges).
    #[inline]
    pub fn blend_coverage(&mut self, x: i32, y: i32, argb: u32, coverage: f32) {
        if coverage <= 0.001 {
            return;
        }
        let a = alpha(argb) as f32 * coverage.min(1.0);
        self.blend_pixel(x, y, with_alpha(argb, a.round() as u32));
    }

    /// Set every pixel to transparent.
    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    pub fn fill(&mut self, argb: u32) {
        self.pixels.fill(argb);
    }

    /// Set a rectangle to transparent. The rect is clamped to the buffer.
    pub fn clear_rect(&mut self, x: i32, y: i32, w: u32, h: u32) {
        let x0 = x.max(0) as u32;
        let y0 = y.max(0) as u32;
        let x1 = ((x + w as i32).max(0) as u32).min(self.width);
        let y1 = ((y + h as i32).max(0) as u32).min(self.height);
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        for yy in y0..y1 {
            let row = yy as usize * self.width as usize;
            self.pixels[row + x0 as usize..row + x1 as usize].fill(0);
        }
    }

    /// Copy `src` into this buffer at (x, y), replacing destination pixels
    /// (no blending). Clipped to the destination bounds.
    pub fn blit(&mut self, src: &PixelBuffer, x: i32, y: i32) {
        self.copy_rows(src, x, y, |_dst, s| s);
    }

    /// Source-over composite `src` onto this buffer at (x, y).
    pub fn draw_image(&mut self, src: &PixelBuffer, x: i32, y: i32) {
        self.copy_rows(src, x, y, source_over);
    }

    fn copy_rows(&mut self, src: &PixelBuffer, x: i32, y: i32, op: impl Fn(u32, u32) -> u32) {
        let dx0 = x.max(0);
        let dy0 = y.max(0);
        let dx1 = (x + src.width as i32).min(self.width as i32);
        let dy1 = (y + src.height as i32).min(self.height as i32);
        if dx0 >= dx1 || dy0 >= dy1 {
            return;
        }
        let sw = src.width as usize;
        let dw = self.width as usize;
        for dy in dy0..dy1 {
            let sy = (dy - y) as usize;
            let sx = (dx0 - x) as usize;
            let src_row = &src.pixels[sy * sw + sx..sy * sw + sx + (dx1 - dx0) as usize];
            let dst_start = dy as usize * dw + dx0 as usize;
            let dst_row = &mut self.pixels[dst_start..dst_start + (dx1 - dx0) as usize];
            for (d, s) in dst_row.iter_mut().zip(src_row) {
                *d = op(*d, *s);
            }
        }
    }

    /// Deep-copy a sub-rectangle into a new buffer. The rect must already be
    /// clamped into bounds with w,h ≥ 1 (callers validate marquee bounds).
    pub fn sub_buffer(&self, x: u32, y: u32, w: u32, h: u32) -> PixelBuffer {
        let w = w.min(self.width.saturating_sub(x)).max(1);
        let h = h.min(self.height.saturating_sub(y)).max(1);
        let mut out = PixelBuffer::new(w, h);
        for yy in 0..h {
            let src_start = (y + yy) as usize * self.width as usize + x as usize;
            let dst_start = yy as usize * w as usize;
            out.pixels[dst_start..dst_start + w as usize]
                .copy_from_slice(&self.pixels[src_start..src_start + w as usize]);
        }
        out
    }

    // ---- interchange with the image crate ----------------------------------

    /// Import from an RGBA8 image (straight alpha).
    pub fn from_rgba_image(img: &RgbaImage) -> Self {
        let mut out = PixelBuffer::new(img.width(), img.height());
        for (dst, px) in out.pixels.iter_mut().zip(img.pixels()) {
            let [r, g, b, a] = px.0;
            *dst = pack_argb(a, r, g, b);
        }
        out
    }

    /// Export to an RGBA8 image (straight alpha, PNG-ready).
    pub fn to_rgba_image(&self) -> RgbaImage {
        let mut raw = Vec::with_capacity(self.pixels.len() * 4);
        for &p in &self.pixels {
            raw.extend_from_slice(&[red(p), green(p), blue(p), alpha(p)]);
        }
        // Length is exactly w*h*4 by construction.
        RgbaImage::from_raw(self.width, self.height, raw)
            .unwrap_or_else(|| RgbaImage::new(self.width, self.height))
    }
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PixelBuffer({}×{})", self.width, self.height)
    }
}

// ============================================================================
// Packed-ARGB helpers
// ============================================================================

#[inline]
pub fn pack_argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
    ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Pack floating RGBA in [0,1]⁴, rounding each channel to 0..=255.
pub fn pack_rgba_f32(r: f32, g: f32, b: f32, a: f32) -> u32 {
    let to8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    pack_argb(to8(a), to8(r), to8(g), to8(b))
}

#[inline]
pub fn alpha(argb: u32) -> u8 {
    (argb >> 24) as u8
}

#[inline]
pub fn red(argb: u32) -> u8 {
    (argb >> 16) as u8
}

#[inline]
pub fn green(argb: u32) -> u8 {
    (argb >> 8) as u8
}

#[inline]
pub fn blue(argb: u32) -> u8 {
    argb as u8
}

#[inline]
fn with_alpha(argb: u32, a: u32) -> u32 {
    (argb & 0x00FF_FFFF) | (a.min(255) << 24)
}

/// Source-over for straight-alpha packed ARGB:
///   a_out = a_s + a_d·(1−a_s)
///   c_out = (c_s·a_s + c_d·a_d·(1−a_s)) / a_out
#[inline]
pub fn source_over(dst: u32, src: u32) -> u32 {
    let sa = alpha(src) as u32;
    if sa == 255 {
        return src;
    }
    if sa == 0 {
        return dst;
    }
    let da = alpha(dst) as u32;
    if da == 0 {
        return src;
    }

    let inv = 255 - sa;
    // Work in units of 1/255² alpha to stay in integers.
    let out_a = sa * 255 + da * inv; // 0..=65025
    let channel = |s: u32, d: u32| -> u32 {
        let num = s * sa * 255 + d * da * inv;
        ((num + out_a / 2) / out_a).min(255)
    };
    let r = channel(red(src) as u32, red(dst) as u32);
    let g = channel(green(src) as u32, green(dst) as u32);
    let b = channel(blue(src) as u32, blue(dst) as u32);
    let a = (out_a + 127) / 255;
    pack_argb(a.min(255) as u8, r as u8, g as u8, b as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_unpack_roundtrip() {
        let p = pack_argb(0x80, 0x11, 0x22, 0x33);
        assert_eq!(p, 0x8011_2233);
        assert_eq!(alpha(p), 0x80);
        assert_eq!(red(p), 0x11);
        assert_eq!(green(p), 0x22);
        assert_eq!(blue(p), 0x33);
    }

    #[test]
    fn test_pack_rgba_f32_rounds() {
        assert_eq!(pack_rgba_f32(1.0, 0.0, 0.0, 1.0), 0xFFFF_0000);
        assert_eq!(pack_rgba_f32(0.5, 0.5, 0.5, 0.0), 0x0080_8080);
    }

    #[test]
    fn test_source_over_opaque_replaces() {
        assert_eq!(source_over(0xFF00_FF00, 0xFFFF_0000), 0xFFFF_0000);
    }

    #[test]
    fn test_source_over_transparent_keeps_dst() {
        assert_eq!(source_over(0xFF00_FF00, 0x0000_0000), 0xFF00_FF00);
    }

    #[test]
    fn test_source_over_onto_transparent() {
        // Compositing over nothing keeps the source untouched, alpha included.
        assert_eq!(source_over(0, 0x8012_3456), 0x8012_3456);
    }

    #[test]
    fn test_blit_clips() {
        let mut dst = PixelBuffer::new(4, 4);
        let mut src = PixelBuffer::new(3, 3);
        src.fill(0xFFAA_BBCC);
        dst.blit(&src, 2, 2);
        assert_eq!(dst.pixel(2, 2), 0xFFAA_BBCC);
        assert_eq!(dst.pixel(3, 3), 0xFFAA_BBCC);
        assert_eq!(dst.pixel(1, 1), 0);
        // Negative offsets clip as well.
        let mut dst2 = PixelBuffer::new(4, 4);
        dst2.blit(&src, -2, -2);
        assert_eq!(dst2.pixel(0, 0), 0xFFAA_BBCC);
        assert_eq!(dst2.pixel(1, 1), 0);
    }

    #[test]
    fn test_clear_rect() {
        let mut buf = PixelBuffer::new(4, 4);
        buf.fill(0xFFFF_FFFF);
        buf.clear_rect(1, 1, 2, 2);
        assert_eq!(buf.pixel(0, 0), 0xFFFF_FFFF);
        assert_eq!(buf.pixel(1, 1), 0);
        assert_eq!(buf.pixel(2, 2), 0);
        assert_eq!(buf.pixel(3, 3), 0xFFFF_FFFF);
    }

    #[test]
    fn test_sub_buffer() {
        let mut buf = PixelBuffer::new(5, 5);
        buf.put_pixel(2, 3, 0xFF01_0203);
        let sub = buf.sub_buffer(2, 3, 2, 2);
        assert_eq!(sub.width(), 2);
        assert_eq!(sub.height(), 2);
        assert_eq!(sub.pixel(0, 0), 0xFF01_0203);
    }

    #[test]
    fn test_rgba_image_roundtrip() {
        let mut buf = PixelBuffer::new(2, 2);
        buf.put_pixel(0, 0, 0x80FF_0000);
        buf.put_pixel(1, 1, 0xFF00_FF00);
        let back = PixelBuffer::from_rgba_image(&buf.to_rgba_image());
        assert_eq!(back.as_slice(), buf.as_slice());
    }
}
