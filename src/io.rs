use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, RgbImage};

use crate::log_info;
use crate::raster::PixelBuffer;

// ============================================================================
// FILE I/O — open and save canvas rasters
// ============================================================================

/// Formats the save dialog offers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveFormat {
    Png,
    Jpeg,
}

impl SaveFormat {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "jpg" | "jpeg" => SaveFormat::Jpeg,
            _ => SaveFormat::Png,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            SaveFormat::Png => "png",
            SaveFormat::Jpeg => "jpg",
        }
    }
}

/// Decode an image file into a straight-alpha raster.
pub fn open_image(path: &Path) -> Result<PixelBuffer, String> {
    let reader = BufReader::new(
        File::open(path).map_err(|e| format!("Cannot open {}: {}", path.display(), e))?,
    );
    let img = image::io::Reader::new(reader)
        .with_guessed_format()
        .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?
        .decode()
        .map_err(|e| format!("Cannot decode {}: {}", path.display(), e))?;
    let rgba = img.to_rgba8();
    log_info!(
        "opened {} ({}×{})",
        path.display(),
        rgba.width(),
        rgba.height()
    );
    Ok(PixelBuffer::from_rgba_image(&rgba))
}

/// Encode the committed raster to disk. PNG keeps the alpha channel; JPEG
/// has none, so transparent areas are flattened onto white first.
pub fn save_image(path: &Path, buf: &PixelBuffer, format: SaveFormat) -> Result<(), String> {
    let file = File::create(path).map_err(|e| format!("Cannot create {}: {}", path.display(), e))?;
    let writer = BufWriter::new(file);

    match format {
        SaveFormat::Png => {
            let rgba = buf.to_rgba_image();
            PngEncoder::new(writer)
                .write_image(rgba.as_raw(), rgba.width(), rgba.height(), ColorType::Rgba8)
                .map_err(|e| format!("PNG encode failed: {}", e))?;
        }
        SaveFormat::Jpeg => {
            let flat = flatten_on_white(buf);
            JpegEncoder::new_with_quality(writer, 92)
                .write_image(flat.as_raw(), flat.width(), flat.height(), ColorType::Rgb8)
                .map_err(|e| format!("JPEG encode failed: {}", e))?;
        }
    }
    log_info!("saved {} as {}", path.display(), format.extension());
    Ok(())
}

/// Composite straight-alpha pixels over an opaque white background.
fn flatten_on_white(buf: &PixelBuffer) -> RgbImage {
    let rgba = buf.to_rgba_image();
    let mut out = RgbImage::new(rgba.width(), rgba.height());
    for (dst, src) in out.pixels_mut().zip(rgba.pixels()) {
        let [r, g, b, a] = src.0;
        let a = a as u32;
        let blend = |c: u8| -> u8 { ((c as u32 * a + 255 * (255 - a) + 127) / 255) as u8 };
        dst.0 = [blend(r), blend(g), blend(b)];
    }
    out
}
