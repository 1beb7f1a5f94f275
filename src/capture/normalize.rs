//! JPEG normalization of captured images
//!
//! Pure format conversion: the output keeps the source's native dimensions.

use anyhow::{Context, Result};
use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;

use super::image::RawImage;
use crate::domain::ImageBlob;

/// Lossy encoder quality used for uploads (0.8 on a 0..1 scale)
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Encode a raw image as JPEG at `quality` (1-100). Alpha is dropped; JPEG has none.
pub fn normalize(image: &RawImage, quality: u8) -> Result<ImageBlob> {
    let rgb = DynamicImage::ImageRgba8(image.rgba.clone()).to_rgb8();

    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100));
    rgb.write_with_encoder(encoder)
        .with_context(|| format!("Failed to encode {}x{} image as JPEG", rgb.width(), rgb.height()))?;

    log::info!(
        "Normalized {:?} image {}x{} to {} JPEG bytes (quality {})",
        image.source,
        image.width(),
        image.height(),
        bytes.len(),
        quality
    );

    Ok(ImageBlob {
        bytes,
        width: rgb.width(),
        height: rgb.height(),
    })
}
