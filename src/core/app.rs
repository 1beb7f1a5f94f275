//! Command line entry point

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use super::report::{report_path, write_report};
use crate::api::{OcrClient, Submit, analysis_endpoint};
use crate::capture::camera::{GstMediaDevices, MediaDevices};
use crate::capture::file;
use crate::config::ScannerConfig;
use crate::domain::ScanOutcome;
use crate::error::ScanError;
use crate::fl;
use crate::session::messages::ViewRequest;
use crate::session::workflow::Scanner;

#[derive(Parser, Debug)]
#[command(
    name = "allergyscan",
    version,
    about = "Scan ingredient labels and medication packaging for allergens"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Write the HTML report to this file")]
    pub html: Option<PathBuf>,
    #[arg(long, global = true, help = "Do not write an HTML report")]
    pub no_report: bool,
    #[arg(
        long,
        global = true,
        help = "Request a medication lookup for every detected medication"
    )]
    pub lookup_medications: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Preview the camera, then capture a frame and analyze it
    Camera {
        #[arg(long, help = "V4L2 device node, e.g. /dev/video0")]
        device: Option<String>,
        #[arg(long, help = "Capture the first frame without waiting for Enter")]
        instant: bool,
    },
    /// Analyze an image file (opens a file dialog when no path is given)
    Upload { path: Option<PathBuf> },
    /// Print the endpoint scans are sent to
    Endpoint,
}

enum ScanSource {
    Camera { device: Option<String>, instant: bool },
    File(Option<PathBuf>),
}

/// Answer typed at the capture prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaptureReply {
    Capture,
    Cancel,
}

/// `None` means the input was not understood and the prompt is repeated.
/// End of input cancels.
fn capture_reply(line: Option<&str>) -> Option<CaptureReply> {
    let Some(line) = line else {
        return Some(CaptureReply::Cancel);
    };
    match line.trim().to_ascii_lowercase().as_str() {
        "" | "c" | "capture" => Some(CaptureReply::Capture),
        "q" | "quit" | "cancel" => Some(CaptureReply::Cancel),
        _ => None,
    }
}

/// Keep the camera previewing until the user captures or cancels.
/// Returns `false` when the scan was cancelled.
async fn preview_and_capture<D: MediaDevices, S: Submit>(
    scanner: &mut Scanner<D, S>,
) -> Result<bool, ScanError> {
    scanner.start_camera()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", fl!("camera-ready"));
        std::io::stdout().flush().ok();

        let line = match lines.next_line().await {
            Ok(line) => line,
            Err(e) => {
                log::error!("Failed to read from stdin: {}", e);
                None
            }
        };
        match capture_reply(line.as_deref()) {
            Some(CaptureReply::Capture) => return scanner.capture().await.map(|()| true),
            Some(CaptureReply::Cancel) => {
                scanner.cancel();
                return Ok(false);
            }
            None => continue,
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            log::error!("Failed to start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run_command(cli)) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_command(cli: Cli) -> anyhow::Result<ExitCode> {
    let source = match cli.command {
        Commands::Endpoint => {
            println!("{}", analysis_endpoint());
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Camera { device, instant } => ScanSource::Camera { device, instant },
        Commands::Upload { path } => ScanSource::File(path),
    };

    let mut config = ScannerConfig::load();

    let device = match &source {
        ScanSource::Camera {
            device: Some(device),
            ..
        } => Some(device.clone()),
        _ => config.camera_device.clone(),
    };
    let devices = GstMediaDevices::new(device, config.frame_timeout());
    let client = OcrClient::new()?;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut scanner = Scanner::new(devices, client, config.jpeg_quality, tx);

    let result = match source {
        ScanSource::Camera { instant: true, .. } => scanner.scan_camera_frame().await,
        ScanSource::Camera { instant: false, .. } => {
            match preview_and_capture(&mut scanner).await {
                Ok(false) => {
                    println!("{}", fl!("capture-cancelled"));
                    return Ok(ExitCode::SUCCESS);
                }
                result => result.map(|_| ()),
            }
        }
        ScanSource::File(path) => {
            let path = match path {
                Some(path) => path,
                None => {
                    let start = config.open_dialog_dir.as_deref().map(Path::new);
                    let Some(path) = file::pick(start).await else {
                        log::info!("No file selected");
                        return Ok(ExitCode::SUCCESS);
                    };
                    remember_dialog_dir(&mut config, &path);
                    path
                }
            };
            scanner.scan_file(path).await
        }
    };

    if let Err(err) = &result {
        log::error!("Scan failed: {}", err);
    }
    print!("{}", scanner.render_text());

    if cli.lookup_medications {
        if let Some(ScanOutcome::Analyzed(analysis)) = scanner.session().outcome() {
            for medication in &analysis.detected_medications {
                scanner.lookup_medication(medication);
            }
        }
        while let Ok(ViewRequest::LookupMedication(name)) = rx.try_recv() {
            println!("{}", fl!("medication-lookup", name = name.as_str()));
        }
    }

    if !cli.no_report && (cli.html.is_some() || config.write_report) {
        let path = cli
            .html
            .or_else(|| config.report_location.dir().map(|dir| report_path(&dir)));
        match path {
            Some(path) => match write_report(&path, &scanner.render()) {
                Ok(()) => println!("{}", fl!("report-saved", path = path.display().to_string())),
                Err(e) => log::error!("{:#}", e),
            },
            None => log::warn!("No directory available for the report"),
        }
    }

    scanner.reset();

    Ok(if result.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn remember_dialog_dir(config: &mut ScannerConfig, path: &Path) {
    let Some(dir) = path.parent().and_then(|dir| dir.to_str()) else {
        return;
    };
    if config.open_dialog_dir.as_deref() != Some(dir) {
        config.open_dialog_dir = Some(dir.to_string());
        config.save();
    }
}
