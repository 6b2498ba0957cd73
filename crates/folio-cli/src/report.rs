//! Human-readable rendering of progress, summaries and export reports.

use std::fmt::Write;

use folio_core::{BatchProgress, BatchSummary, ExportReport, FolioError, ItemState, ProgressKind};

/// Line to print for a progress event. The final event prints nothing.
pub fn progress_line(progress: &BatchProgress) -> Option<String> {
    let item = progress.current_item()?;
    let position = progress.position()?;
    let prefix = format!("[{}/{}]", position, progress.total_count);

    match (progress.kind, item.state) {
        (ProgressKind::ItemStarted, _) => {
            Some(format!("{} Processing {}...", prefix, item.name()))
        }
        (ProgressKind::ItemFinished, ItemState::Succeeded) => {
            let chars = item
                .result
                .as_ref()
                .map(|r| r.cleaned_text_length)
                .unwrap_or_default();
            Some(format!("{} {}: {} characters", prefix, item.name(), chars))
        }
        (ProgressKind::ItemFinished, ItemState::Failed) => {
            let message = item.error.as_ref().map(|e| e.message.as_str()).unwrap_or("");
            Some(format!("{} {} failed: {}", prefix, item.name(), message))
        }
        _ => None,
    }
}

/// Multi-line report of a finished batch.
pub fn summary_text(summary: &BatchSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", summary.headline());

    if !summary.succeeded.is_empty() {
        let totals = &summary.totals;
        let _ = writeln!(
            out,
            "Text: {} raw characters, {} after cleanup ({} removed)",
            totals.raw_characters, totals.cleaned_characters, totals.characters_removed
        );
    }

    for failed in &summary.failed {
        let _ = writeln!(
            out,
            "  x {} ({}): {}",
            failed.filename, failed.error.class, failed.error.message
        );
    }

    if summary.dependency_missing().next().is_some() {
        let _ = writeln!(
            out,
            "The extraction service is missing a dependency; fix the service before retrying."
        );
    } else if summary.has_retriable_failures() {
        let _ = writeln!(out, "Some failures may succeed if the batch is run again.");
    }

    out
}

/// Multi-line report of an export.
pub fn export_text(report: &ExportReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Exported {} of {} documents",
        report.exported.len(),
        report.exported.len() + report.failed.len()
    );
    for item in &report.exported {
        match &item.receipt.url {
            Some(url) => {
                let _ = writeln!(out, "  + {} -> {}", item.title, url);
            }
            None => {
                let _ = writeln!(out, "  + {} -> page {}", item.title, item.receipt.page_id);
            }
        }
    }
    for item in &report.failed {
        let _ = writeln!(out, "  x {}: {}", item.title, item.message);
    }
    out
}

/// Remediation hint for a failed command, when the cause is a folio error
/// that has one.
pub fn error_hint(error: &anyhow::Error) -> Option<String> {
    let folio = error.downcast_ref::<FolioError>()?;
    folio
        .suggestion()
        .map(|hint| format!("hint [{}]: {}", folio.code().as_str(), hint))
}
