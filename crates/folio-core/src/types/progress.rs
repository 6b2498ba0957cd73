//! Progress events emitted while a batch runs.

use serde::Serialize;

use super::batch::{Batch, BatchId, BatchStatus};
use super::item::BatchItem;

/// What happened to produce a progress event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressKind {
    /// An item moved `Pending -> InFlight`.
    ItemStarted,
    /// An item reached `Succeeded` or `Failed`.
    ItemFinished,
    /// The batch reached `Completed`. Always the last event of a run.
    Completed,
}

/// Snapshot emitted after every transition of a running batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchProgress {
    pub batch_id: BatchId,
    /// Strictly increasing within one run, starting at 0.
    pub sequence: u64,
    pub kind: ProgressKind,
    /// Index of the item this event is about; `None` for `Completed`.
    pub current_index: Option<usize>,
    pub total_count: usize,
    pub status: BatchStatus,
    pub items: Vec<BatchItem>,
}

impl BatchProgress {
    pub(crate) fn from_batch(
        batch: &Batch,
        sequence: u64,
        kind: ProgressKind,
        current_index: Option<usize>,
    ) -> Self {
        Self {
            batch_id: batch.id,
            sequence,
            kind,
            current_index,
            total_count: batch.len(),
            status: batch.status,
            items: batch.items.clone(),
        }
    }

    /// The item this event is about.
    pub fn current_item(&self) -> Option<&BatchItem> {
        self.current_index.and_then(|i| self.items.get(i))
    }

    /// One-based position for "file k of n" displays.
    pub fn position(&self) -> Option<usize> {
        self.current_index.map(|i| i + 1)
    }

    pub fn is_final(&self) -> bool {
        self.kind == ProgressKind::Completed
    }
}
