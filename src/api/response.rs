//! OCR endpoint response parsing

use serde::Deserialize;

use crate::domain::AnalysisResult;
use crate::error::ScanError;

/// JSON body returned by `POST /api/chatbot/ocr/`
#[derive(Debug, Deserialize)]
struct OcrResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    raw_text: Option<String>,
    #[serde(default)]
    detected_allergens: Option<Vec<String>>,
    #[serde(default)]
    detected_medications: Option<Vec<String>>,
    /// Older backends report `detected_medicines`, often as `null`
    #[serde(default)]
    detected_medicines: Option<Vec<String>>,
    #[serde(default)]
    ai_analysis: Option<String>,
}

impl From<OcrResponse> for AnalysisResult {
    fn from(response: OcrResponse) -> Self {
        Self {
            raw_text: response.raw_text.unwrap_or_default(),
            detected_allergens: response.detected_allergens.unwrap_or_default(),
            detected_medications: response
                .detected_medications
                .or(response.detected_medicines)
                .unwrap_or_default(),
            ai_analysis: response.ai_analysis,
        }
    }
}

/// Turn an HTTP status and body into an analysis result.
///
/// Every failure collapses into `AnalysisFailed` with a readable message;
/// a `message` from the server wins over the generic text.
pub fn parse_response(http_status: u16, body: &[u8]) -> Result<AnalysisResult, ScanError> {
    let parsed = serde_json::from_slice::<OcrResponse>(body);

    if !(200..300).contains(&http_status) {
        let message = parsed
            .ok()
            .and_then(|response| response.message)
            .unwrap_or_else(|| format!("HTTP error! Status: {}", http_status));
        return Err(ScanError::AnalysisFailed(message));
    }

    let response = parsed.map_err(|e| {
        log::error!("OCR response is not valid JSON: {}", e);
        ScanError::AnalysisFailed(format!("Invalid response from server: {}", e))
    })?;

    if response.status.as_deref() != Some("success") {
        let message = response
            .message
            .unwrap_or_else(|| "OCR processing failed".to_string());
        return Err(ScanError::AnalysisFailed(message));
    }

    Ok(response.into())
}
