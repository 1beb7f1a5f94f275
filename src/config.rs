//! Configuration persistence for allergyscan settings
//!
//! The analysis endpoint is deliberately not configurable here: it follows
//! the page origin (see `api::analysis_endpoint`).

use std::path::PathBuf;
use std::time::Duration;

use cosmic_config::{self, CosmicConfigEntry, cosmic_config_derive::CosmicConfigEntry};
use serde::{Deserialize, Serialize};

use crate::capture::normalize::DEFAULT_JPEG_QUALITY;

/// Where HTML scan reports are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReportLocation {
    #[default]
    Documents,
    Downloads,
}

impl ReportLocation {
    pub fn dir(self) -> Option<PathBuf> {
        match self {
            ReportLocation::Documents => {
                dirs::document_dir().or_else(|| dirs::home_dir().map(|h| h.join("Documents")))
            }
            ReportLocation::Downloads => {
                dirs::download_dir().or_else(|| dirs::home_dir().map(|h| h.join("Downloads")))
            }
        }
    }
}

/// Application configuration persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, CosmicConfigEntry)]
#[version = 1]
pub struct ScannerConfig {
    /// V4L2 device node (None = let GStreamer pick the preferred camera)
    pub camera_device: Option<String>,
    /// JPEG quality for uploads (1-100)
    pub jpeg_quality: u8,
    /// Milliseconds to wait for the camera to go live and deliver a frame
    pub frame_timeout_ms: u64,
    /// Where to write HTML reports
    pub report_location: ReportLocation,
    /// Whether to write an HTML report after each scan
    pub write_report: bool,
    /// Directory the file dialog opened last
    #[serde(default)]
    pub open_dialog_dir: Option<String>,
}

impl ScannerConfig {
    /// Configuration ID for cosmic-config
    pub const ID: &'static str = "io.github.allergybuster.allergyscan";

    /// Load configuration from disk, or return defaults if unavailable
    pub fn load() -> Self {
        match cosmic_config::Config::new(Self::ID, Self::VERSION) {
            Ok(config) => match Self::get_entry(&config) {
                Ok(entry) => entry,
                Err((errs, entry)) => {
                    log::warn!("Error loading config, using defaults: {:?}", errs);
                    entry
                }
            },
            Err(err) => {
                log::warn!("Could not create config handler: {:?}", err);
                Self::default()
            }
        }
    }

    /// Save configuration to disk
    pub fn save(&self) {
        match cosmic_config::Config::new(Self::ID, Self::VERSION) {
            Ok(config) => {
                if let Err(err) = self.write_entry(&config) {
                    log::error!("Failed to save config: {:?}", err);
                }
            }
            Err(err) => {
                log::error!("Could not create config handler for saving: {:?}", err);
            }
        }
    }

    pub fn frame_timeout(&self) -> Duration {
        Duration::from_millis(self.frame_timeout_ms)
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            camera_device: None,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            frame_timeout_ms: 3000,
            report_location: ReportLocation::Documents,
            write_report: true,
            open_dialog_dir: None,
        }
    }
}
