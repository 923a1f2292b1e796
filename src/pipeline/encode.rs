//! Image encoding: `DynamicImage` → JPEG [`PreviewImage`].
//!
//! A resume page is mostly text on white; JPEG at quality 85 keeps it legible
//! to the model at a fraction of the PNG size. JPEG has no alpha channel, so
//! the rendered RGBA bitmap is flattened to RGB first.

use crate::output::PreviewImage;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use tracing::debug;

/// Media type of every preview.
pub const JPEG_MIME: &str = "image/jpeg";

/// Encode a rendered page as JPEG at `quality` (1–100).
pub fn encode_preview(img: &DynamicImage, quality: u8) -> Result<PreviewImage, image::ImageError> {
    let rgb = img.to_rgb8();
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100)).encode_image(&rgb)?;

    debug!(
        "Encoded {}x{} page → {} bytes JPEG (q={})",
        rgb.width(),
        rgb.height(),
        buf.len(),
        quality
    );

    Ok(PreviewImage {
        bytes: buf,
        mime_type: JPEG_MIME.to_string(),
        width: rgb.width(),
        height: rgb.height(),
    })
}
