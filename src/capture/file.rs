//! User-selected image files
//!
//! A selection carries the media type it declares through its extension.
//! Only `image/*` selections are accepted; everything else is surfaced as
//! `InvalidFileType` and never retried.

use std::path::{Path, PathBuf};

use image::ImageFormat;

use super::image::RawImage;
use crate::error::ScanError;

/// Extensions offered by the file dialog
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "bmp", "tif", "tiff"];

/// A file chosen by the user together with its declared media type
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub media_type: String,
}

impl SelectedFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let media_type = declared_media_type(&path);
        Self { path, media_type }
    }

    /// Accept only selections that declare an image media type
    pub fn validate(&self) -> Result<(), ScanError> {
        if self.media_type.starts_with("image/") {
            Ok(())
        } else {
            log::warn!(
                "Rejected {} with media type {}",
                self.path.display(),
                self.media_type
            );
            Err(ScanError::InvalidFileType(self.media_type.clone()))
        }
    }

    /// Decode the selected file into a raw pixel source
    pub fn load(&self) -> Result<RawImage, ScanError> {
        RawImage::from_file(&self.path)
    }
}

/// Media type a file declares through its extension
pub fn declared_media_type(path: &Path) -> String {
    if let Ok(format) = ImageFormat::from_path(path) {
        return format.to_mime_type().to_string();
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("txt") | Some("text") => "text/plain",
        Some("html") | Some("htm") => "text/html",
        Some("csv") => "text/csv",
        Some("json") => "application/json",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
    .to_string()
}

/// Single-slot file picker value. Taking the selection clears it so the same
/// file can be chosen again later.
#[derive(Debug, Default)]
pub struct FileInput {
    value: Option<SelectedFile>,
}

impl FileInput {
    pub fn set(&mut self, path: impl Into<PathBuf>) {
        self.value = Some(SelectedFile::new(path));
    }

    pub fn take(&mut self) -> Option<SelectedFile> {
        self.value.take()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }
}

/// Open the native file dialog filtered to image files
pub async fn pick(start_dir: Option<&Path>) -> Option<PathBuf> {
    let mut dialog = rfd::AsyncFileDialog::new().add_filter("Images", IMAGE_EXTENSIONS);
    if let Some(dir) = start_dir {
        dialog = dialog.set_directory(dir);
    }

    dialog.pick_file().await.map(|handle| handle.path().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_media_types() {
        assert_eq!(declared_media_type(Path::new("label.jpg")), "image/jpeg");
        assert_eq!(declared_media_type(Path::new("label.PNG")), "image/png");
        assert_eq!(declared_media_type(Path::new("notes.txt")), "text/plain");
        assert_eq!(
            declared_media_type(Path::new("no_extension")),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_text_file_is_rejected() {
        let file = SelectedFile::new("notes.txt");
        assert_eq!(
            file.validate(),
            Err(ScanError::InvalidFileType("text/plain".to_string()))
        );
    }

    #[test]
    fn test_image_file_is_accepted() {
        assert!(SelectedFile::new("/tmp/label.jpeg").validate().is_ok());
        assert!(SelectedFile::new("/tmp/label.webp").validate().is_ok());
    }

    #[test]
    fn test_take_clears_value() {
        let mut input = FileInput::default();
        input.set("label.jpg");
        assert!(!input.is_empty());

        let taken = input.take().unwrap();
        assert_eq!(taken.path, PathBuf::from("label.jpg"));
        assert!(input.is_empty());
        assert!(input.take().is_none());

        // Same file can be selected again
        input.set("label.jpg");
        assert_eq!(input.take(), Some(taken));
    }

    #[test]
    fn test_garbage_image_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").unwrap();

        let file = SelectedFile::new(&path);
        assert!(file.validate().is_ok());
        assert!(matches!(file.load(), Err(ScanError::UnreadableImage(_))));
    }
}
