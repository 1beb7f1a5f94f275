//! HTML scan reports
//!
//! A report lays the rendered view out the way the scanner page does: the
//! extracted text box, the ingredients box and the results area.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::fl;
use crate::render::{RenderedView, escape_html};

/// Default report path inside `dir`, named after the current time
pub fn report_path(dir: &Path) -> PathBuf {
    let name = chrono::Local::now()
        .format("allergyscan-%Y-%m-%d_%H-%M-%S.html")
        .to_string();
    dir.join(name)
}

/// Full HTML document for a rendered view
pub fn report_document(view: &RenderedView) -> String {
    let mut doc = String::new();
    doc.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    doc.push_str(&format!("<title>{}</title>\n", escape_html(&fl!("report-title"))));
    doc.push_str("</head>\n<body>\n");

    if let Some(alert) = &view.alert {
        doc.push_str(&format!(
            "<div class=\"alert\" role=\"alert\">{}</div>\n",
            escape_html(alert)
        ));
    }

    let display = if view.results_visible { "block" } else { "none" };
    doc.push_str(&format!(
        "<section id=\"scan-results\" style=\"display: {}\">\n",
        display
    ));
    doc.push_str(&format!(
        "<h2>{}</h2>\n<pre id=\"raw-text\">{}</pre>\n",
        escape_html(&fl!("raw-text")),
        escape_html(&view.raw_text)
    ));
    doc.push_str(&format!(
        "<h2>{}</h2>\n<pre id=\"ingredients-text\">{}</pre>\n",
        escape_html(&fl!("ingredients")),
        escape_html(&view.ingredients_text)
    ));
    doc.push_str(&format!(
        "<div id=\"allergy-matches\">{}</div>\n",
        view.results_html
    ));
    doc.push_str("</section>\n</body>\n</html>\n");
    doc
}

/// Write the report atomically to `path`
pub fn write_report(path: &Path, view: &RenderedView) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create report directory: {}", dir.display()))?;

    let mut file = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary report in {}", dir.display()))?;
    file.write_all(report_document(view).as_bytes())?;
    file.persist(path)
        .with_context(|| format!("Failed to write report: {}", path.display()))?;

    log::info!("Report saved to {}", path.display());
    Ok(())
}
