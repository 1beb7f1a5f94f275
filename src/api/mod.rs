//! Submission client for the OCR analysis endpoint
//!
//! One multipart upload per scan. No retry, no timeout and no cancellation:
//! once sent, the caller waits for the server to answer.

pub mod response;

use futures::FutureExt;
use futures::future::BoxFuture;
use reqwest::multipart::{Form, Part};

use crate::domain::{AnalysisResult, ImageBlob};
use crate::error::ScanError;

pub use response::parse_response;

/// Path of the OCR endpoint, relative to the page origin
pub const OCR_PATH: &str = "/api/chatbot/ocr/";
/// Origin the frontend is served from during local development
pub const DEV_PAGE_ORIGIN: &str = "http://localhost:8080";
/// Backend origin used while developing locally
pub const DEV_BACKEND_ORIGIN: &str = "http://localhost:8000";
/// Environment variable naming the origin this client runs under
pub const PAGE_ORIGIN_ENV: &str = "ALLERGYSCAN_PAGE_ORIGIN";

/// Resolve the analysis endpoint for a page origin.
///
/// The local development origin talks to the local backend; any other origin
/// uses the same-origin relative path.
pub fn endpoint_for(page_origin: &str) -> String {
    let origin = page_origin.trim_end_matches('/');
    if origin == DEV_PAGE_ORIGIN {
        format!("{}{}", DEV_BACKEND_ORIGIN, OCR_PATH)
    } else {
        format!("{}{}", origin, OCR_PATH)
    }
}

/// Endpoint for the current environment, checked on every call
pub fn analysis_endpoint() -> String {
    let origin = std::env::var(PAGE_ORIGIN_ENV).unwrap_or_else(|_| DEV_PAGE_ORIGIN.to_string());
    endpoint_for(&origin)
}

/// Sends an encoded image for analysis
pub trait Submit {
    fn submit<'a>(&'a self, blob: &'a ImageBlob) -> BoxFuture<'a, Result<AnalysisResult, ScanError>>;
}

/// HTTP client for the OCR endpoint
pub struct OcrClient {
    http: reqwest::Client,
    /// Fixed endpoint; `None` resolves it from the environment on every call
    endpoint: Option<String>,
}

impl OcrClient {
    pub fn new() -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            endpoint: None,
        })
    }

    /// Client that always posts to `endpoint`
    pub fn with_endpoint(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: Some(endpoint.into()),
        }
    }

    pub fn endpoint(&self) -> String {
        self.endpoint.clone().unwrap_or_else(analysis_endpoint)
    }

    /// Upload `blob` as the `image` part and parse the answer
    pub async fn analyze(&self, blob: &ImageBlob) -> Result<AnalysisResult, ScanError> {
        let url = self.endpoint();
        log::info!(
            "Sending {} byte image ({}x{}) to OCR API: {}",
            blob.bytes.len(),
            blob.width,
            blob.height,
            url
        );

        let part = Part::bytes(blob.bytes.clone())
            .file_name(ImageBlob::FILE_NAME)
            .mime_str(ImageBlob::MIME_TYPE)
            .map_err(|e| ScanError::AnalysisFailed(e.to_string()))?;
        let form = Form::new().part("image", part);

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(transport_error)?;
        log::debug!("OCR API answered {} with {} bytes", status, body.len());

        parse_response(status, &body)
    }
}

impl Submit for OcrClient {
    fn submit<'a>(&'a self, blob: &'a ImageBlob) -> BoxFuture<'a, Result<AnalysisResult, ScanError>> {
        self.analyze(blob).boxed()
    }
}

fn transport_error(e: reqwest::Error) -> ScanError {
    log::error!("OCR error: {}", e);
    ScanError::AnalysisFailed(e.to_string())
}
