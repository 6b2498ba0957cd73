//! Result aggregation.
//!
//! [`summarize`] partitions a batch snapshot into succeeded and failed
//! items. It reads the snapshot only; cleanup statistics are passed through
//! from each item's result and never recomputed.

use serde::Serialize;

use crate::traits::ExportDocument;
use crate::types::{
    Batch, BatchId, BatchStatus, ErrorClass, ExtractionOutput, ItemError, ItemId, ItemState,
};

/// A succeeded item in a summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SucceededItem {
    pub id: ItemId,
    pub filename: String,
    pub output: ExtractionOutput,
}

/// A failed item in a summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedItem {
    pub id: ItemId,
    pub filename: String,
    pub error: ItemError,
}

/// Character totals over the succeeded items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TextTotals {
    pub raw_characters: usize,
    pub cleaned_characters: usize,
    pub characters_removed: i64,
}

/// Immutable report of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// `None` for the empty summary.
    pub batch_id: Option<BatchId>,
    pub status: BatchStatus,
    pub total: usize,
    /// In original selection order.
    pub succeeded: Vec<SucceededItem>,
    /// In original selection order.
    pub failed: Vec<FailedItem>,
    pub totals: TextTotals,
}

impl BatchSummary {
    /// Zero summary returned before any item has resolved.
    pub fn empty() -> Self {
        Self {
            batch_id: None,
            status: BatchStatus::Idle,
            total: 0,
            succeeded: Vec::new(),
            failed: Vec::new(),
            totals: TextTotals::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.succeeded.is_empty() && self.failed.is_empty()
    }

    pub fn succeeded_count(&self) -> usize {
        self.succeeded.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    /// Whether every item of the batch has been reported.
    pub fn is_complete(&self) -> bool {
        self.status == BatchStatus::Completed
    }

    /// Failed items whose cause is a missing extraction dependency.
    pub fn dependency_missing(&self) -> impl Iterator<Item = &FailedItem> {
        self.failed
            .iter()
            .filter(|f| f.error.class == ErrorClass::DependencyMissing)
    }

    /// Whether any failure can be fixed by re-running the batch.
    pub fn has_retriable_failures(&self) -> bool {
        self.failed.iter().any(|f| f.error.class.is_retriable())
    }

    /// One-line description, e.g. "2 of 3 files processed, 1 failed".
    pub fn headline(&self) -> String {
        let mut line = format!(
            "{} of {} files processed",
            self.succeeded_count(),
            self.total
        );
        if !self.failed.is_empty() {
            line.push_str(&format!(", {} failed", self.failed_count()));
        }
        line
    }

    /// Documents for the export capability, one per succeeded item.
    pub fn export_documents(&self) -> Vec<ExportDocument> {
        self.succeeded
            .iter()
            .map(|s| ExportDocument {
                item_id: s.id,
                title: s.filename.clone(),
                content: s.output.cleaned_text.clone(),
            })
            .collect()
    }
}

impl Default for BatchSummary {
    fn default() -> Self {
        Self::empty()
    }
}

/// Summarize a batch snapshot.
///
/// Items still `Pending` or `InFlight` appear in neither partition.
pub fn summarize(batch: &Batch) -> BatchSummary {
    let mut succeeded = Vec::new();
    let mut failed = Vec::new();
    let mut totals = TextTotals::default();

    for item in &batch.items {
        match (item.state, &item.result, &item.error) {
            (ItemState::Succeeded, Some(output), _) => {
                totals.raw_characters += output.cleanup_stats.original_length;
                totals.cleaned_characters += output.cleanup_stats.cleaned_length;
                totals.characters_removed += output.cleanup_stats.characters_removed;
                succeeded.push(SucceededItem {
                    id: item.id,
                    filename: item.name().to_string(),
                    output: output.clone(),
                });
            }
            (ItemState::Failed, _, Some(error)) => failed.push(FailedItem {
                id: item.id,
                filename: item.name().to_string(),
                error: error.clone(),
            }),
            _ => {}
        }
    }

    BatchSummary {
        batch_id: Some(batch.id),
        status: batch.status,
        total: batch.len(),
        succeeded,
        failed,
        totals,
    }
}
