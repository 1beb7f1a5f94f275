//! Analysis result returned by the OCR backend

/// Outcome of one successful submission. Superseded wholesale by the next result.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnalysisResult {
    /// Text extracted from the image, verbatim
    pub raw_text: String,
    /// Allergen names matched in the text (possibly empty)
    pub detected_allergens: Vec<String>,
    /// Medication names found in the text
    pub detected_medications: Vec<String>,
    /// Free-form analysis with light inline markup
    pub ai_analysis: Option<String>,
}

impl AnalysisResult {
    pub fn has_allergens(&self) -> bool {
        !self.detected_allergens.is_empty()
    }

    pub fn has_medications(&self) -> bool {
        !self.detected_medications.is_empty()
    }

    /// Analysis text, if the backend sent anything besides whitespace
    pub fn analysis(&self) -> Option<&str> {
        self.ai_analysis
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }
}

/// What the presenter shows for the latest finished attempt
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScanOutcome {
    Analyzed(AnalysisResult),
    /// User-facing error message
    Failed(String),
}
