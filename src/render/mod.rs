//! Result presentation
//!
//! This module contains:
//! - The view model handed to the presenter (`ScanView`)
//! - HTML rendering of results and errors (html.rs)
//! - Inline markup for free-form analysis text (analysis.rs)
//! - Plain text rendering for the terminal (text.rs)
//!
//! Rendering is a pure function of the view: the same input always yields the
//! same output, so there is nothing to re-apply or re-sync afterwards.

pub mod analysis;
pub mod html;
pub mod text;

use crate::domain::ScanOutcome;

pub use html::render;
pub use text::render_text;

/// Snapshot of everything the presenter needs from a capture session
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanView {
    /// Latest finished attempt, if any
    pub outcome: Option<ScanOutcome>,
    /// Message for errors that do not replace the results area
    pub notice: Option<String>,
}

/// Rendered content for each display location
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderedView {
    /// Extracted text box
    pub raw_text: String,
    /// Ingredients box; always the same text as `raw_text`
    pub ingredients_text: String,
    /// Allergen, medication and analysis sections (or the error)
    pub results_html: String,
    /// Whether the results area is shown at all
    pub results_visible: bool,
    /// Transient alert (camera unavailable, wrong file type)
    pub alert: Option<String>,
}

/// Escape text for interpolation into HTML content or attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Tom & Jerry's"</b>"#),
            "&lt;b&gt;&quot;Tom &amp; Jerry&#39;s&quot;&lt;/b&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }
}
