//! Batch and progress snapshots.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::file::FileHandle;
use super::item::{BatchItem, ItemState};

/// Unique identifier of one batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(pub uuid::Uuid);

impl BatchId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Overall status of a batch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BatchStatus {
    #[default]
    Idle,
    Processing,
    /// Every item is `Succeeded` or `Failed`.
    Completed,
    /// The run failed as a whole (never caused by a single item).
    Fatal,
}

/// One user-initiated run over a fixed, ordered file selection.
#[derive(Debug, Clone, Serialize)]
pub struct Batch {
    pub id: BatchId,
    /// Items in submission order, which is the selection order.
    pub items: Vec<BatchItem>,
    /// Index of the item currently in flight.
    pub current_index: Option<usize>,
    pub status: BatchStatus,
    pub created_at: DateTime<Utc>,
}

impl Batch {
    /// Create an idle batch with one pending item per file, in input order.
    pub fn new(files: Vec<Arc<FileHandle>>) -> Self {
        let items = files
            .into_iter()
            .enumerate()
            .map(|(index, file)| BatchItem::pending(index, file))
            .collect();

        Self {
            id: BatchId::new(),
            items,
            current_index: None,
            status: BatchStatus::Idle,
            created_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of items in a terminal state.
    pub fn resolved_count(&self) -> usize {
        self.items.iter().filter(|i| i.state.is_terminal()).count()
    }

    /// Whether every item has left `Pending`/`InFlight`.
    pub fn all_resolved(&self) -> bool {
        self.items.iter().all(|i| i.state.is_terminal())
    }

    /// Number of items in the given state.
    pub fn count_in(&self, state: ItemState) -> usize {
        self.items.iter().filter(|i| i.state == state).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handles(names: &[&str]) -> Vec<Arc<FileHandle>> {
        names
            .iter()
            .map(|n| Arc::new(FileHandle::from_bytes(*n, "text/plain", b"x".to_vec())))
            .collect()
    }

    #[test]
    fn test_new_batch_preserves_order() {
        let batch = Batch::new(handles(&["a", "b", "c"]));
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.status, BatchStatus::Idle);
        assert!(batch.current_index.is_none());

        let names: Vec<_> = batch.items.iter().map(|i| i.name()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert!(batch.items.iter().enumerate().all(|(i, item)| item.id.index() == i));
        assert_eq!(batch.count_in(ItemState::Pending), 3);
    }

    #[test]
    fn test_batch_ids_are_unique() {
        let a = Batch::new(handles(&["a"]));
        let b = Batch::new(handles(&["a"]));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_batch_serializes_snapshot() {
        let batch = Batch::new(handles(&["a"]));
        let json = serde_json::to_value(&batch).unwrap();
        assert_eq!(json["status"], "idle");
        assert_eq!(json["items"][0]["state"], "pending");
        assert_eq!(json["items"][0]["source"]["name"], "a");
    }
}
