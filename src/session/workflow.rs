//! Capture-and-analyze workflow
//!
//! Input acquisition → normalization → submission → presentation, as
//! sequential awaited steps on one capture session. The camera and the
//! network are the only suspension points.

use std::path::PathBuf;

use tokio::sync::mpsc::UnboundedSender;

use super::messages::ViewRequest;
use super::state::{CaptureSession, UploadTicket};
use crate::api::Submit;
use crate::capture::camera::MediaDevices;
use crate::capture::file::FileInput;
use crate::error::ScanError;
use crate::render::{self, RenderedView};

/// Scanner view: one capture session plus its collaborators
pub struct Scanner<D, S> {
    session: CaptureSession,
    devices: D,
    submitter: S,
    file_input: FileInput,
    jpeg_quality: u8,
}

impl<D: MediaDevices, S: Submit> Scanner<D, S> {
    pub fn new(
        devices: D,
        submitter: S,
        jpeg_quality: u8,
        navigation: UnboundedSender<ViewRequest>,
    ) -> Self {
        Self {
            session: CaptureSession::new(navigation),
            devices,
            submitter,
            file_input: FileInput::default(),
            jpeg_quality,
        }
    }

    pub fn session(&self) -> &CaptureSession {
        &self.session
    }

    /// Open the camera for preview
    pub fn start_camera(&mut self) -> Result<(), ScanError> {
        self.session.start_camera(&self.devices)
    }

    /// Freeze the previewed frame and analyze it
    pub async fn capture(&mut self) -> Result<(), ScanError> {
        let ticket = self.session.capture(self.jpeg_quality)?;
        self.upload(ticket).await
    }

    /// Open the camera and analyze the first frame it delivers
    pub async fn scan_camera_frame(&mut self) -> Result<(), ScanError> {
        self.start_camera()?;
        self.capture().await
    }

    pub fn choose_file(&mut self, path: impl Into<PathBuf>) {
        self.file_input.set(path);
    }

    /// Analyze the pending file selection, if any. The selection is cleared
    /// whatever the outcome.
    pub async fn scan_selected_file(&mut self) -> Result<(), ScanError> {
        let Some(file) = self.file_input.take() else {
            return Ok(());
        };
        log::info!("Scanning {} ({})", file.path.display(), file.media_type);
        let ticket = self.session.submit_file(&file, self.jpeg_quality)?;
        self.upload(ticket).await
    }

    pub async fn scan_file(&mut self, path: impl Into<PathBuf>) -> Result<(), ScanError> {
        self.choose_file(path);
        self.scan_selected_file().await
    }

    async fn upload(&mut self, ticket: UploadTicket) -> Result<(), ScanError> {
        let result = self.submitter.submit(&ticket.blob).await;
        let failure = result.as_ref().err().cloned();
        self.session.finish_upload(ticket, result);
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Stop the camera preview without scanning
    pub fn cancel(&mut self) {
        self.session.cancel();
    }

    /// "Scan again"
    pub fn reset(&mut self) {
        self.session.reset();
    }

    pub fn lookup_medication(&self, name: &str) -> bool {
        self.session.lookup_medication(name)
    }

    pub fn render(&self) -> RenderedView {
        render::render(&self.session.view())
    }

    pub fn render_text(&self) -> String {
        render::render_text(&self.session.view())
    }
}
