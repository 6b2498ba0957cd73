//! Export of a batch's succeeded items.

use serde::Serialize;

use crate::error::{FolioError, FolioResult};
use crate::summary::BatchSummary;
use crate::traits::{ExportError, ExportReceipt, WorkspaceExporter};
use crate::types::ItemId;

/// A document that was written to the workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedItem {
    pub item_id: ItemId,
    pub title: String,
    pub receipt: ExportReceipt,
}

/// A document the exporter rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedExport {
    pub item_id: ItemId,
    pub title: String,
    pub message: String,
    /// Whether exporting again later may succeed.
    pub retriable: bool,
}

/// Outcome of exporting a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportReport {
    pub exported: Vec<ExportedItem>,
    pub failed: Vec<FailedExport>,
}

impl ExportReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Export every succeeded item of `summary`, one at a time in order.
///
/// A failed export is recorded and the remaining documents are still
/// exported.
pub async fn export_succeeded(
    summary: &BatchSummary,
    exporter: &dyn WorkspaceExporter,
) -> FolioResult<ExportReport> {
    let documents = summary.export_documents();
    if documents.is_empty() {
        return Err(FolioError::NothingToExport);
    }

    let mut report = ExportReport::default();
    for document in documents {
        match exporter.export(&document).await {
            Ok(receipt) => {
                tracing::info!(
                    item = %document.item_id,
                    title = %document.title,
                    page_id = %receipt.page_id,
                    "Exported document"
                );
                report.exported.push(ExportedItem {
                    item_id: document.item_id,
                    title: document.title,
                    receipt,
                });
            }
            Err(e) => {
                tracing::warn!(
                    item = %document.item_id,
                    title = %document.title,
                    error = %e,
                    "Export failed"
                );
                report.failed.push(FailedExport {
                    item_id: document.item_id,
                    title: document.title,
                    retriable: matches!(e, ExportError::Transient(_)),
                    message: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        exported = report.exported.len(),
        failed = report.failed.len(),
        "Export finished"
    );
    Ok(report)
}
