//! Capture session state
//!
//! `Idle → Capturing → Uploading → {Displaying, Failed} → Idle`, with
//! `Idle → Uploading` for file uploads and `Capturing → Idle` on cancel.
//! Only one capture or upload runs per session at a time.

use tokio::sync::mpsc::UnboundedSender;

use super::messages::ViewRequest;
use crate::capture::camera::{CameraStream, MediaDevices};
use crate::capture::file::SelectedFile;
use crate::capture::image::RawImage;
use crate::capture::normalize::normalize;
use crate::domain::{AnalysisResult, ImageBlob, ScanOutcome};
use crate::error::ScanError;
use crate::render::ScanView;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScanState {
    #[default]
    Idle,
    /// Live camera preview; the session owns an active stream
    Capturing,
    /// Image sent, waiting for the server
    Uploading,
    Displaying,
    Failed,
}

impl ScanState {
    /// Whether a capture or upload is in flight
    pub fn is_busy(self) -> bool {
        matches!(self, ScanState::Capturing | ScanState::Uploading)
    }
}

/// An upload started by the session. Its result is only accepted while the
/// session has not been reset or restarted since.
#[derive(Debug)]
pub struct UploadTicket {
    generation: u64,
    pub blob: ImageBlob,
}

/// Client-side state for one scan-to-result cycle
pub struct CaptureSession {
    state: ScanState,
    active_stream: Option<Box<dyn CameraStream>>,
    last_image_blob: Option<ImageBlob>,
    outcome: Option<ScanOutcome>,
    notice: Option<String>,
    generation: u64,
    navigation: UnboundedSender<ViewRequest>,
}

impl CaptureSession {
    pub fn new(navigation: UnboundedSender<ViewRequest>) -> Self {
        Self {
            state: ScanState::Idle,
            active_stream: None,
            last_image_blob: None,
            outcome: None,
            notice: None,
            generation: 0,
            navigation,
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn last_image_blob(&self) -> Option<&ImageBlob> {
        self.last_image_blob.as_ref()
    }

    pub fn outcome(&self) -> Option<&ScanOutcome> {
        self.outcome.as_ref()
    }

    /// Live tracks of the active stream (zero when there is none)
    pub fn live_tracks(&self) -> usize {
        self.active_stream
            .as_ref()
            .map_or(0, |stream| stream.live_tracks())
    }

    /// Snapshot for the presenter
    pub fn view(&self) -> ScanView {
        ScanView {
            outcome: self.outcome.clone(),
            notice: self.notice.clone(),
        }
    }

    fn ensure_ready(&mut self) -> Result<(), ScanError> {
        if self.state.is_busy() {
            log::warn!("Ignoring new scan while {:?}", self.state);
            return Err(ScanError::Busy(self.state));
        }
        Ok(())
    }

    /// Start of a new attempt: nothing from the previous run survives
    fn begin_attempt(&mut self) {
        self.outcome = None;
        self.notice = None;
        self.last_image_blob = None;
        self.generation += 1;
        self.state = ScanState::Idle;
    }

    /// Surface an error that leaves the session idle and actionable
    fn abort_to_idle(&mut self, err: &ScanError) {
        self.release_stream();
        self.notice = Some(err.user_message());
        self.state = ScanState::Idle;
    }

    /// Stop every track of the active stream and drop the handle
    fn release_stream(&mut self) {
        if let Some(mut stream) = self.active_stream.take() {
            stream.stop();
        }
    }

    /// Request the camera and attach it for preview
    pub fn start_camera(&mut self, devices: &dyn MediaDevices) -> Result<(), ScanError> {
        self.ensure_ready()?;
        self.begin_attempt();

        match devices.open_rear_camera() {
            Ok(stream) => {
                self.active_stream = Some(stream);
                self.state = ScanState::Capturing;
                log::info!("Camera preview started");
                Ok(())
            }
            Err(err) => {
                self.abort_to_idle(&err);
                Err(err)
            }
        }
    }

    /// Freeze the current camera frame, release the camera and start uploading it
    pub fn capture(&mut self, quality: u8) -> Result<UploadTicket, ScanError> {
        let Some(stream) = self.active_stream.as_mut() else {
            return Err(ScanError::CameraUnavailable(
                "no active camera stream".to_string(),
            ));
        };

        let frame = stream.grab_frame();
        self.release_stream();

        match frame {
            Ok(frame) => self.upload_image(&frame, quality),
            Err(e) => {
                log::error!("Failed to capture camera frame: {:#}", e);
                let err = ScanError::CameraUnavailable(format!("{:#}", e));
                self.abort_to_idle(&err);
                Err(err)
            }
        }
    }

    /// Validate and decode a selected file, then start uploading it
    pub fn submit_file(
        &mut self,
        file: &SelectedFile,
        quality: u8,
    ) -> Result<UploadTicket, ScanError> {
        self.ensure_ready()?;
        self.begin_attempt();

        let image = file.validate().and_then(|_| file.load());
        match image {
            Ok(image) => self.upload_image(&image, quality),
            Err(err) => {
                self.abort_to_idle(&err);
                Err(err)
            }
        }
    }

    fn upload_image(&mut self, image: &RawImage, quality: u8) -> Result<UploadTicket, ScanError> {
        let blob = match normalize(image, quality) {
            Ok(blob) => blob,
            Err(e) => {
                log::error!("Failed to normalize image: {:#}", e);
                let err = ScanError::UnreadableImage(format!("{:#}", e));
                self.abort_to_idle(&err);
                return Err(err);
            }
        };

        self.last_image_blob = Some(blob.clone());
        self.state = ScanState::Uploading;
        Ok(UploadTicket {
            generation: self.generation,
            blob,
        })
    }

    /// Apply the server's answer. Returns false when the ticket belongs to a
    /// superseded attempt and the result was discarded.
    pub fn finish_upload(
        &mut self,
        ticket: UploadTicket,
        result: Result<AnalysisResult, ScanError>,
    ) -> bool {
        if ticket.generation != self.generation || self.state != ScanState::Uploading {
            log::info!(
                "Discarding late OCR result for superseded scan {} (current {}, {:?})",
                ticket.generation,
                self.generation,
                self.state
            );
            return false;
        }

        match result {
            Ok(result) => {
                log::info!(
                    "OCR results: {} allergens, {} medications",
                    result.detected_allergens.len(),
                    result.detected_medications.len()
                );
                self.outcome = Some(ScanOutcome::Analyzed(result));
                self.state = ScanState::Displaying;
            }
            Err(err) => {
                log::error!("OCR error: {}", err);
                self.outcome = Some(ScanOutcome::Failed(err.user_message()));
                self.state = ScanState::Failed;
            }
        }
        true
    }

    /// Stop the camera preview without scanning
    pub fn cancel(&mut self) {
        log::debug!("Scan cancelled while {:?}", self.state);
        self.reset();
    }

    /// Return to `Idle` from any state. Clears results and releases the camera;
    /// an upload still in flight will have its result discarded.
    pub fn reset(&mut self) {
        self.release_stream();
        self.outcome = None;
        self.notice = None;
        self.last_image_blob = None;
        self.generation += 1;
        self.state = ScanState::Idle;
    }

    /// Hand a detected medication to the medication lookup view
    pub fn lookup_medication(&self, name: &str) -> bool {
        let detected = match &self.outcome {
            Some(ScanOutcome::Analyzed(result)) => {
                result.detected_medications.iter().any(|m| m == name)
            }
            _ => false,
        };
        if !detected {
            log::warn!("Lookup requested for undetected medication {:?}", name);
            return false;
        }
        self.navigation
            .send(ViewRequest::LookupMedication(name.to_string()))
            .is_ok()
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.release_stream();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use image::{Rgba, RgbaImage};
    use tokio::sync::mpsc;

    use super::*;

    /// Camera whose track count is observable after the stream is gone
    pub(crate) struct FakeStream {
        pub frame: Option<RgbaImage>,
        pub live: Rc<Cell<usize>>,
    }

    impl CameraStream for FakeStream {
        fn grab_frame(&mut self) -> anyhow::Result<RawImage> {
            let frame = self
                .frame
                .clone()
                .ok_or_else(|| anyhow::anyhow!("no frame"))?;
            Ok(RawImage::from_camera(frame))
        }

        fn stop(&mut self) {
            self.live.set(0);
        }

        fn live_tracks(&self) -> usize {
            self.live.get()
        }
    }

    pub(crate) struct FakeDevices {
        pub available: bool,
        pub frame: Option<RgbaImage>,
        pub live: Rc<Cell<usize>>,
    }

    impl FakeDevices {
        pub fn working(width: u32, height: u32) -> Self {
            Self {
                available: true,
                frame: Some(RgbaImage::from_pixel(width, height, Rgba([200, 180, 90, 255]))),
                live: Rc::new(Cell::new(0)),
            }
        }

        pub fn denied() -> Self {
            Self {
                available: false,
                frame: None,
                live: Rc::new(Cell::new(0)),
            }
        }
    }

    impl MediaDevices for FakeDevices {
        fn open_rear_camera(&self) -> Result<Box<dyn CameraStream>, ScanError> {
            if !self.available {
                return Err(ScanError::CameraUnavailable("permission denied".into()));
            }
            self.live.set(1);
            Ok(Box::new(FakeStream {
                frame: self.frame.clone(),
                live: self.live.clone(),
            }))
        }
    }

    fn session() -> (CaptureSession, mpsc::UnboundedReceiver<ViewRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (CaptureSession::new(tx), rx)
    }

    fn png_file(dir: &tempfile::TempDir, width: u32, height: u32) -> SelectedFile {
        let path = dir.path().join("label.png");
        RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();
        SelectedFile::new(path)
    }

    #[test]
    fn test_reset_from_capturing_releases_stream() {
        let devices = FakeDevices::working(64, 48);
        let (mut session, _rx) = session();

        session.start_camera(&devices).unwrap();
        assert_eq!(session.state(), ScanState::Capturing);
        assert_eq!(session.live_tracks(), 1);

        session.reset();
        assert_eq!(session.state(), ScanState::Idle);
        assert_eq!(session.live_tracks(), 0);
        assert_eq!(devices.live.get(), 0);
    }

    #[test]
    fn test_cancel_returns_to_idle_without_upload() {
        let devices = FakeDevices::working(8, 8);
        let (mut session, _rx) = session();

        session.start_camera(&devices).unwrap();
        session.cancel();
        assert_eq!(session.state(), ScanState::Idle);
        assert_eq!(devices.live.get(), 0);
        assert!(session.last_image_blob().is_none());
    }

    #[test]
    fn test_camera_unavailable_stays_idle_with_notice() {
        let (mut session, _rx) = session();

        let err = session.start_camera(&FakeDevices::denied()).unwrap_err();
        assert!(matches!(err, ScanError::CameraUnavailable(_)));
        assert_eq!(session.state(), ScanState::Idle);
        assert_eq!(
            session.view().notice.as_deref(),
            Some("Could not access camera. Please check permissions.")
        );
    }

    #[test]
    fn test_capture_releases_stream_before_upload() {
        let devices = FakeDevices::working(64, 48);
        let (mut session, _rx) = session();

        session.start_camera(&devices).unwrap();
        let ticket = session.capture(80).unwrap();

        assert_eq!(session.state(), ScanState::Uploading);
        assert_eq!(devices.live.get(), 0);
        assert_eq!((ticket.blob.width, ticket.blob.height), (64, 48));
        assert_eq!(session.last_image_blob(), Some(&ticket.blob));
    }

    #[test]
    fn test_failed_frame_grab_releases_stream() {
        let mut devices = FakeDevices::working(4, 4);
        devices.frame = None;
        let (mut session, _rx) = session();

        session.start_camera(&devices).unwrap();
        let err = session.capture(80).unwrap_err();
        assert!(matches!(err, ScanError::CameraUnavailable(_)));
        assert_eq!(session.state(), ScanState::Idle);
        assert_eq!(devices.live.get(), 0);
    }

    #[test]
    fn test_invalid_file_type_stays_idle() {
        let (mut session, _rx) = session();

        let err = session
            .submit_file(&SelectedFile::new("notes.txt"), 80)
            .unwrap_err();
        assert_eq!(err, ScanError::InvalidFileType("text/plain".into()));
        assert_eq!(session.state(), ScanState::Idle);
        assert!(session.last_image_blob().is_none());
    }

    #[test]
    fn test_file_goes_straight_to_uploading() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, _rx) = session();

        let ticket = session.submit_file(&png_file(&dir, 30, 20), 80).unwrap();
        assert_eq!(session.state(), ScanState::Uploading);
        assert_eq!((ticket.blob.width, ticket.blob.height), (30, 20));
    }

    #[test]
    fn test_no_new_scan_while_busy() {
        let dir = tempfile::tempdir().unwrap();
        let devices = FakeDevices::working(8, 8);
        let (mut session, _rx) = session();

        session.start_camera(&devices).unwrap();
        assert_eq!(
            session.start_camera(&devices).unwrap_err(),
            ScanError::Busy(ScanState::Capturing)
        );
        assert_eq!(
            session.submit_file(&png_file(&dir, 4, 4), 80).unwrap_err(),
            ScanError::Busy(ScanState::Capturing)
        );
        // The running preview is untouched
        assert_eq!(session.state(), ScanState::Capturing);
        assert_eq!(devices.live.get(), 1);

        let _ticket = session.capture(80).unwrap();
        assert_eq!(
            session.start_camera(&devices).unwrap_err(),
            ScanError::Busy(ScanState::Uploading)
        );
    }

    #[test]
    fn test_late_result_after_reset_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, _rx) = session();

        let ticket = session.submit_file(&png_file(&dir, 4, 4), 80).unwrap();
        session.reset();

        let applied = session.finish_upload(
            ticket,
            Ok(AnalysisResult {
                raw_text: "stale".into(),
                ..Default::default()
            }),
        );
        assert!(!applied);
        assert_eq!(session.state(), ScanState::Idle);
        assert!(session.outcome().is_none());
    }

    #[test]
    fn test_results_and_failures() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, _rx) = session();

        let ticket = session.submit_file(&png_file(&dir, 4, 4), 80).unwrap();
        assert!(session.finish_upload(
            ticket,
            Ok(AnalysisResult {
                raw_text: "milk".into(),
                detected_allergens: vec!["dairy".into()],
                ..Default::default()
            })
        ));
        assert_eq!(session.state(), ScanState::Displaying);

        // A new attempt drops the previous result before it resolves
        let ticket = session.submit_file(&png_file(&dir, 4, 4), 80).unwrap();
        assert!(session.outcome().is_none());

        assert!(session.finish_upload(
            ticket,
            Err(ScanError::AnalysisFailed("bad image".into()))
        ));
        assert_eq!(session.state(), ScanState::Failed);
        assert_eq!(
            session.outcome(),
            Some(&ScanOutcome::Failed(
                "Error processing image: bad image".into()
            ))
        );

        session.reset();
        assert_eq!(session.state(), ScanState::Idle);
        assert_eq!(session.view(), ScanView::default());
    }

    #[test]
    fn test_lookup_medication_emits_request() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, mut rx) = session();

        let ticket = session.submit_file(&png_file(&dir, 4, 4), 80).unwrap();
        session.finish_upload(
            ticket,
            Ok(AnalysisResult {
                raw_text: "Ibuprofen".into(),
                detected_medications: vec!["Ibuprofen".into()],
                ..Default::default()
            }),
        );

        assert!(session.lookup_medication("Ibuprofen"));
        assert!(!session.lookup_medication("Warfarin"));
        assert_eq!(
            rx.try_recv().unwrap(),
            ViewRequest::LookupMedication("Ibuprofen".into())
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_drop_releases_stream() {
        let devices = FakeDevices::working(8, 8);
        let (mut session, _rx) = session();

        session.start_camera(&devices).unwrap();
        drop(session);
        assert_eq!(devices.live.get(), 0);
    }

    #[test]
    fn test_reset_is_safe_from_any_state() {
        let (mut session, _rx) = session();
        session.reset();
        session.reset();
        assert_eq!(session.state(), ScanState::Idle);
    }
}
