use ab_glyph::{point, Font, FontArc, GlyphId, ScaleFont};
use font_kit::family_name::FamilyName;
use font_kit::properties::{Properties, Style, Weight};
use font_kit::source::SystemSource;

use crate::canvas::FontSpec;
use crate::log_warn;
use crate::raster::{self, PixelBuffer};

// ============================================================================
// TEXT — system font lookup + single-line rasterization
// ============================================================================

/// Resolve a system font matching the requested family and style. Falls back
/// to the platform sans-serif when the family is missing, and returns None
/// only when no usable font exists at all.
pub fn load_system_font(spec: &FontSpec) -> Option<FontArc> {
    let mut props = Properties::new();
    props.weight = if spec.bold { Weight::BOLD } else { Weight::NORMAL };
    props.style = if spec.italic { Style::Italic } else { Style::Normal };

    let source = SystemSource::new();
    let families = [
        FamilyName::Title(spec.family.clone()),
        FamilyName::SansSerif,
    ];
    for family in families {
        let Ok(handle) = source.select_best_match(&[family], &props) else {
            continue;
        };
        let Ok(font) = handle.load() else {
            continue;
        };
        let Some(data) = font.copy_font_data() else {
            continue;
        };
        match ab_glyph::FontVec::try_from_vec((*data).clone()) {
            Ok(vec) => return Some(FontArc::from(vec)),
            Err(err) => {
                log_warn!("font '{}' failed to parse: {}", spec.family, err);
            }
        }
    }
    log_warn!("no usable system font for '{}'", spec.family);
    None
}

/// Lay out one line at the given pixel size: glyph ids with x offsets from
/// the line start, kerning applied. Returns the positioned glyphs and the
/// total advance width.
fn layout_line(font: &FontArc, text: &str, size: f32) -> (Vec<(GlyphId, f32)>, f32) {
    let scaled = font.as_scaled(size);
    let mut glyphs = Vec::with_capacity(text.len());
    let mut cursor = 0.0f32;
    let mut prev: Option<GlyphId> = None;
    for ch in text.chars() {
        let id = font.glyph_id(ch);
        if let Some(p) = prev {
            cursor += scaled.kern(p, id);
        }
        glyphs.push((id, cursor));
        cursor += scaled.h_advance(id);
        prev = Some(id);
    }
    (glyphs, cursor)
}

/// Rasterize `text` onto `buf` with the anchor at the top-left of the line
/// box; the baseline sits one font-size below the anchor. Glyph coverage is
/// blended with the source-over rule, so text composites correctly over
/// existing content. Returns false when nothing was drawn.
pub fn draw_text(
    buf: &mut PixelBuffer,
    font: &FontArc,
    text: &str,
    size: f32,
    anchor_x: f32,
    anchor_y: f32,
    argb: u32,
) -> bool {
    if text.is_empty() || size <= 0.0 {
        return false;
    }
    let baseline = anchor_y + size;
    let (glyphs, _width) = layout_line(font, text, size);

    let mut drew = false;
    for (id, dx) in glyphs {
        let glyph = id.with_scale_and_position(size, point(anchor_x + dx, baseline));
        let Some(outlined) = font.outline_glyph(glyph) else {
            continue;
        };
        let bounds = outlined.px_bounds();
        let gx = bounds.min.x as i32;
        let gy = bounds.min.y as i32;
        outlined.draw(|x, y, coverage| {
            buf.blend_coverage(gx + x as i32, gy + y as i32, argb, coverage);
        });
        drew = true;
    }
    drew
}

/// Advance width of `text` at `size`, for sizing the inline editor.
pub fn measure_text(font: &FontArc, text: &str, size: f32) -> f32 {
    layout_line(font, text, size).1
}

/// Line-box height (ascent − descent), for sizing the inline editor.
pub fn line_height(font: &FontArc, size: f32) -> f32 {
    let scaled = font.as_scaled(size);
    scaled.ascent() - scaled.descent()
}

/// Text color rule: a fully transparent setting falls back to opaque black.
pub fn effective_text_color(argb: u32) -> u32 {
    if raster::alpha(argb) == 0 {
        0xFF00_0000
    } else {
        argb
    }
}
