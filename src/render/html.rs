//! HTML rendering of scan results

use std::fmt::Write;

use super::analysis::format_analysis;
use super::{RenderedView, ScanView, escape_html};
use crate::domain::{AnalysisResult, ScanOutcome};
use crate::fl;

/// Render a session snapshot. Pure: identical views give identical output.
pub fn render(view: &ScanView) -> RenderedView {
    let alert = view.notice.clone();

    match &view.outcome {
        None => RenderedView {
            alert,
            ..RenderedView::default()
        },
        Some(ScanOutcome::Analyzed(result)) => {
            // One source of truth for both text boxes
            let text = if result.raw_text.trim().is_empty() {
                fl!("no-text-detected")
            } else {
                result.raw_text.clone()
            };
            RenderedView {
                raw_text: text.clone(),
                ingredients_text: text,
                results_html: results_html(result),
                results_visible: true,
                alert,
            }
        }
        Some(ScanOutcome::Failed(message)) => RenderedView {
            results_html: error_html(message),
            results_visible: true,
            alert,
            ..RenderedView::default()
        },
    }
}

fn results_html(result: &AnalysisResult) -> String {
    let mut html = String::new();

    if result.has_allergens() {
        html.push_str(r#"<div class="result-section allergens-section">"#);
        let _ = write!(
            html,
            r#"<h3><i class="fas fa-exclamation-triangle"></i> {}</h3>"#,
            fl!("allergens-detected")
        );
        html.push_str(r#"<ul class="allergen-list">"#);
        for allergen in &result.detected_allergens {
            let _ = write!(
                html,
                r#"<li class="allergen-item warning"><i class="fas fa-exclamation-triangle"></i> {}</li>"#,
                escape_html(allergen)
            );
        }
        html.push_str("</ul></div>");
    } else {
        let _ = write!(html, r#"<p class="no-allergens">{}</p>"#, fl!("no-allergens"));
    }

    if result.has_medications() {
        html.push_str(r#"<div class="result-section medications-section">"#);
        let _ = write!(
            html,
            r#"<h3><i class="fas fa-pills"></i> {}</h3>"#,
            fl!("medications-detected")
        );
        html.push_str(r#"<ul class="medication-list">"#);
        for medication in &result.detected_medications {
            let name = escape_html(medication);
            let _ = write!(
                html,
                r#"<li class="medication-item"><i class="fas fa-pills"></i> {name} <button class="btn btn-primary lookup-med-btn" data-med="{name}"><i class="fas fa-search"></i> {label}</button></li>"#,
                name = name,
                label = escape_html(&fl!("lookup-medication", name = medication.as_str())),
            );
        }
        html.push_str("</ul></div>");
    }

    if let Some(analysis) = result.analysis() {
        html.push_str(r#"<div class="result-section ai-analysis-section">"#);
        let _ = write!(
            html,
            r#"<h3><i class="fas fa-robot"></i> {}</h3>"#,
            fl!("ai-analysis")
        );
        let _ = write!(
            html,
            r#"<div class="ai-analysis">{}</div>"#,
            format_analysis(analysis)
        );
        html.push_str("</div>");
    }

    html.push_str(&scan_actions());
    html
}

fn error_html(message: &str) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        r#"<p class="scan-error"><i class="fas fa-times-circle"></i> {}</p>"#,
        escape_html(message)
    );
    html.push_str(&scan_actions());
    html
}

fn scan_actions() -> String {
    format!(
        r#"<div class="scan-actions"><button class="btn btn-outline" id="scan-again-btn"><i class="fas fa-redo"></i> {}</button></div>"#,
        fl!("scan-again")
    )
}
