//! Live camera streams
//!
//! A stream is owned by exactly one capture session. Stopping it tears down
//! every track; a stream that is dropped without being stopped is stopped
//! on drop.

use std::time::Duration;

use anyhow::{Context, Result};
use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer_app as gst_app;
use gstreamer_video as gst_video;
use image::RgbaImage;

use super::image::RawImage;
use crate::error::ScanError;

/// A live camera stream attached for preview
pub trait CameraStream {
    /// Freeze the current frame
    fn grab_frame(&mut self) -> Result<RawImage>;
    /// Stop every track. Calling it again is a no-op.
    fn stop(&mut self);
    /// Number of tracks still producing frames
    fn live_tracks(&self) -> usize;
}

/// Platform media-capture capability
pub trait MediaDevices {
    /// Request the rear-facing (environment) camera
    fn open_rear_camera(&self) -> Result<Box<dyn CameraStream>, ScanError>;
}

/// Camera access through a GStreamer capture pipeline
pub struct GstMediaDevices {
    /// V4L2 device node; `None` lets `autovideosrc` pick the preferred camera
    device: Option<String>,
    /// How long to wait for the pipeline to go live and for a frame
    frame_timeout: Duration,
}

impl GstMediaDevices {
    pub fn new(device: Option<String>, frame_timeout: Duration) -> Self {
        Self {
            device,
            frame_timeout,
        }
    }
}

impl MediaDevices for GstMediaDevices {
    fn open_rear_camera(&self) -> Result<Box<dyn CameraStream>, ScanError> {
        match GstCameraStream::start(self.device.as_deref(), self.frame_timeout) {
            Ok(stream) => Ok(Box::new(stream)),
            Err(e) => {
                log::error!("Camera error: {:#}", e);
                Err(ScanError::CameraUnavailable(format!("{:#}", e)))
            }
        }
    }
}

/// `<source> ! videoconvert ! video/x-raw,format=RGBA ! appsink`
pub struct GstCameraStream {
    pipeline: gst::Pipeline,
    appsink: gst_app::AppSink,
    frame_timeout: Duration,
    live: bool,
}

/// Element feeding the capture pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
enum SourceElement {
    V4l2(String),
    Auto,
}

/// Pick the pipeline source. Without a configured device, `autovideosrc`
/// is only used when at least one video source is present: it falls back to
/// a black test pattern instead of failing when there is none.
fn select_source(device: Option<&str>, video_sources: usize) -> Result<SourceElement> {
    match device {
        Some(device) => Ok(SourceElement::V4l2(device.to_string())),
        None if video_sources == 0 => anyhow::bail!("No camera found"),
        None => Ok(SourceElement::Auto),
    }
}

/// Number of video capture devices GStreamer can see
fn count_video_sources() -> usize {
    let monitor = gst::DeviceMonitor::new();
    monitor.add_filter(Some("Video/Source"), None);
    if let Err(e) = monitor.start() {
        log::warn!("Failed to list video devices: {}", e);
        return 0;
    }
    let count = monitor.devices().len();
    monitor.stop();
    log::debug!("Found {} video source(s)", count);
    count
}

impl GstCameraStream {
    fn start(device: Option<&str>, frame_timeout: Duration) -> Result<Self> {
        gst::init().context("Failed to initialize GStreamer")?;

        let video_sources = match device {
            Some(_) => 0,
            None => count_video_sources(),
        };

        let pipeline = gst::Pipeline::new();

        let source = match select_source(device, video_sources)? {
            SourceElement::V4l2(device) => gst::ElementFactory::make("v4l2src")
                .property("device", device.as_str())
                .build()
                .with_context(|| format!("Failed to create v4l2src for {}", device))?,
            SourceElement::Auto => gst::ElementFactory::make("autovideosrc")
                .build()
                .context("Failed to create autovideosrc element")?,
        };

        let videoconvert = gst::ElementFactory::make("videoconvert")
            .build()
            .context("Failed to create videoconvert element")?;

        let caps = gst::Caps::builder("video/x-raw")
            .field("format", "RGBA")
            .build();

        // Keep only the newest frame so a capture freezes what the preview shows
        let appsink = gst_app::AppSink::builder()
            .name("camera-sink")
            .caps(&caps)
            .max_buffers(1)
            .drop(true)
            .build();

        pipeline.add_many([&source, &videoconvert, appsink.upcast_ref()])?;
        gst::Element::link_many([&source, &videoconvert, appsink.upcast_ref()])?;

        log::info!(
            "Starting camera pipeline (device: {})",
            device.unwrap_or("auto")
        );

        if let Err(e) = pipeline.set_state(gst::State::Playing) {
            let _ = pipeline.set_state(gst::State::Null);
            return Err(e).context("Failed to start camera pipeline");
        }

        // Permission and device errors surface while the pipeline goes live
        let (result, current, _pending) =
            pipeline.state(gst::ClockTime::from_mseconds(frame_timeout.as_millis() as u64));
        if result.is_err() || current != gst::State::Playing {
            let _ = pipeline.set_state(gst::State::Null);
            anyhow::bail!("Camera pipeline did not go live (state {:?})", current);
        }

        Ok(Self {
            pipeline,
            appsink,
            frame_timeout,
            live: true,
        })
    }
}

impl CameraStream for GstCameraStream {
    fn grab_frame(&mut self) -> Result<RawImage> {
        anyhow::ensure!(self.live, "Camera stream already stopped");

        let timeout = gst::ClockTime::from_mseconds(self.frame_timeout.as_millis() as u64);
        let sample = self
            .appsink
            .try_pull_sample(timeout)
            .context("No frame received from camera")?;

        let caps = sample.caps().context("Camera frame has no caps")?;
        let info = gst_video::VideoInfo::from_caps(caps)
            .context("Failed to read camera frame format")?;
        let buffer = sample.buffer().context("Camera frame has no buffer")?;
        let map = buffer
            .map_readable()
            .context("Failed to map camera frame")?;

        let (width, height) = (info.width(), info.height());
        let stride = info.stride()[0] as usize;
        let row_bytes = width as usize * 4;

        // Rows may be padded to the stride; copy only the visible pixels
        let mut pixels = Vec::with_capacity(row_bytes * height as usize);
        for row in map.as_slice().chunks(stride).take(height as usize) {
            let visible = row
                .get(..row_bytes)
                .context("Camera frame row shorter than its width")?;
            pixels.extend_from_slice(visible);
        }

        let rgba = RgbaImage::from_raw(width, height, pixels)
            .context("Camera frame size does not match its caps")?;
        Ok(RawImage::from_camera(rgba))
    }

    fn stop(&mut self) {
        if !self.live {
            return;
        }
        if let Err(e) = self.pipeline.set_state(gst::State::Null) {
            log::error!("Failed to stop camera pipeline: {}", e);
        }
        self.live = false;
        log::info!("Camera stream stopped");
    }

    fn live_tracks(&self) -> usize {
        usize::from(self.live)
    }
}

impl Drop for GstCameraStream {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_video_source_is_an_error() {
        let err = select_source(None, 0).unwrap_err();
        assert_eq!(err.to_string(), "No camera found");
    }

    #[test]
    fn test_auto_source_when_cameras_present() {
        assert_eq!(select_source(None, 2).unwrap(), SourceElement::Auto);
    }

    #[test]
    fn test_configured_device_uses_v4l2src() {
        assert_eq!(
            select_source(Some("/dev/video2"), 0).unwrap(),
            SourceElement::V4l2("/dev/video2".into())
        );
    }
}
