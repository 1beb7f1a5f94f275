//! Raw pixel source produced by input acquisition

use std::path::Path;

use image::RgbaImage;

use crate::error::ScanError;

/// Where a raw image came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageSource {
    Camera,
    File,
}

/// A decoded image with known dimensions, not yet encoded for upload
#[derive(Clone, Debug)]
pub struct RawImage {
    pub rgba: RgbaImage,
    pub source: ImageSource,
}

impl RawImage {
    /// Wrap a frozen camera frame
    pub fn from_camera(rgba: RgbaImage) -> Self {
        log::debug!("Camera frame captured: {}x{} pixels", rgba.width(), rgba.height());
        Self {
            rgba,
            source: ImageSource::Camera,
        }
    }

    /// Read and decode an image file
    pub fn from_file(path: &Path) -> Result<Self, ScanError> {
        let decoded = image::open(path).map_err(|e| {
            log::error!("Failed to read image {}: {}", path.display(), e);
            ScanError::UnreadableImage(e.to_string())
        })?;
        let rgba = decoded.to_rgba8();
        log::debug!(
            "Image file decoded: {} ({}x{} pixels)",
            path.display(),
            rgba.width(),
            rgba.height()
        );
        Ok(Self {
            rgba,
            source: ImageSource::File,
        })
    }

    /// Get the width of the image
    pub fn width(&self) -> u32 {
        self.rgba.width()
    }

    /// Get the height of the image
    pub fn height(&self) -> u32 {
        self.rgba.height()
    }
}
