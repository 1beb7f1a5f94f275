//! Requests a capture session hands to other views

/// Navigation requests emitted by the result presenter's actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewRequest {
    /// Open the medication lookup view for this name
    LookupMedication(String),
}
