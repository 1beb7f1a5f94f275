//! Encoded image bytes ready for upload

/// Compressed JPEG bytes plus the pixel dimensions they encode
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageBlob {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl ImageBlob {
    pub const MIME_TYPE: &'static str = "image/jpeg";
    pub const FILE_NAME: &'static str = "scan.jpg";
}
