//! Error kinds that end a scan attempt

use crate::fl;
use crate::session::state::ScanState;

/// Terminal failure for the current attempt. None of these are retried automatically;
/// the session always stays restartable through a reset.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// Camera permission denied, no capture device, or the pipeline never went live
    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),
    /// Selected file does not declare an `image/*` media type
    #[error("invalid file type: {0}")]
    InvalidFileType(String),
    /// File declared an image type but could not be read or decoded
    #[error("unreadable image: {0}")]
    UnreadableImage(String),
    /// Transport, HTTP, parsing or application-level failure from the OCR endpoint
    #[error("{0}")]
    AnalysisFailed(String),
    /// A capture or upload is already running for this session
    #[error("scan already in progress ({0:?})")]
    Busy(ScanState),
}

impl ScanError {
    /// Message shown to the user for this error
    pub fn user_message(&self) -> String {
        match self {
            ScanError::CameraUnavailable(_) => fl!("camera-unavailable"),
            ScanError::InvalidFileType(_) => fl!("invalid-file-type"),
            ScanError::UnreadableImage(_) => fl!("unreadable-image"),
            ScanError::AnalysisFailed(message) => {
                fl!("error-processing", message = message.as_str())
            }
            ScanError::Busy(_) => fl!("scan-in-progress"),
        }
    }
}
