//! Plain text rendering for terminal output

use std::fmt::Write;

use super::ScanView;
use super::analysis::format_analysis_plain;
use crate::domain::ScanOutcome;
use crate::fl;

/// Render a session snapshot as plain text
pub fn render_text(view: &ScanView) -> String {
    let mut out = String::new();

    if let Some(notice) = &view.notice {
        let _ = writeln!(out, "! {}", notice);
    }

    match &view.outcome {
        None => {}
        Some(ScanOutcome::Failed(message)) => {
            let _ = writeln!(out, "{}", message);
        }
        Some(ScanOutcome::Analyzed(result)) => {
            let _ = writeln!(out, "{}", fl!("raw-text"));
            if result.raw_text.trim().is_empty() {
                let _ = writeln!(out, "  {}", fl!("no-text-detected"));
            } else {
                for line in result.raw_text.lines() {
                    let _ = writeln!(out, "  {}", line);
                }
            }
            out.push('\n');

            if result.has_allergens() {
                let _ = writeln!(out, "{}", fl!("allergens-detected"));
                for allergen in &result.detected_allergens {
                    let _ = writeln!(out, "  ⚠ {}", allergen);
                }
            } else {
                let _ = writeln!(out, "{}", fl!("no-allergens"));
            }

            if result.has_medications() {
                out.push('\n');
                let _ = writeln!(out, "{}", fl!("medications-detected"));
                for medication in &result.detected_medications {
                    let _ = writeln!(out, "  • {}", medication);
                }
            }

            if let Some(analysis) = result.analysis() {
                out.push('\n');
                let _ = writeln!(out, "{}", fl!("ai-analysis"));
                for line in format_analysis_plain(analysis) {
                    let _ = writeln!(out, "  {}", line);
                }
            }
        }
    }

    out
}
