// ============================================================================
// CLIPBOARD — app-level image slot with OS clipboard bridge
// ============================================================================

use std::borrow::Cow;
use std::sync::Mutex;

use image::RgbaImage;

use crate::log_warn;
use crate::raster::PixelBuffer;

/// In-app clipboard storing a raster with full transparency. The OS
/// clipboard round-trips through RGBA bytes and may lose nothing, but some
/// platforms have no image clipboard at all, so this slot is the source of
/// truth and the OS copy is best-effort.
static APP_CLIPBOARD: Mutex<Option<PixelBuffer>> = Mutex::new(None);

/// Store an image on both the app and OS clipboards.
pub fn put_image(img: PixelBuffer) {
    copy_to_system_clipboard(&img.to_rgba_image());
    *APP_CLIPBOARD.lock().unwrap_or_else(|e| e.into_inner()) = Some(img);
}

/// Fetch an image, preferring the app slot, then the OS clipboard.
pub fn get_image() -> Option<PixelBuffer> {
    if let Some(img) = APP_CLIPBOARD
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .clone()
    {
        return Some(img);
    }
    get_from_system_clipboard().map(|img| PixelBuffer::from_rgba_image(&img))
}

pub fn has_image() -> bool {
    if APP_CLIPBOARD
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .is_some()
    {
        return true;
    }
    // Cheap existence probe against the OS clipboard.
    arboard::Clipboard::new()
        .and_then(|mut c| c.get_image().map(|_| ()))
        .is_ok()
}

/// Write an RGBA image to the system clipboard (best-effort).
fn copy_to_system_clipboard(img: &RgbaImage) {
    match arboard::Clipboard::new() {
        Ok(mut clip) => {
            let data = arboard::ImageData {
                width: img.width() as usize,
                height: img.height() as usize,
                bytes: Cow::Borrowed(img.as_raw()),
            };
            if let Err(err) = clip.set_image(data) {
                log_warn!("system clipboard write failed: {}", err);
            }
        }
        Err(err) => log_warn!("system clipboard unavailable: {}", err),
    }
}

/// Read raw image data from the system clipboard, if any.
fn get_from_system_clipboard() -> Option<RgbaImage> {
    let mut clip = arboard::Clipboard::new().ok()?;
    let data = clip.get_image().ok()?;
    RgbaImage::from_raw(
        data.width as u32,
        data.height as u32,
        data.bytes.into_owned(),
    )
}
