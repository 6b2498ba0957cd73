//! Per-file lifecycle tracking.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::file::FileHandle;

/// Position-derived identifier of an item, unique within its batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub usize);

impl ItemId {
    /// Zero-based position in the batch.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "item-{}", self.0)
    }
}

/// Lifecycle state of one item. Transitions only move forward.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ItemState {
    #[default]
    Pending,
    InFlight,
    Succeeded,
    Failed,
}

impl ItemState {
    /// Whether the item has reached `Succeeded` or `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ItemState::Succeeded | ItemState::Failed)
    }
}

/// Classification of an item failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorClass {
    /// The service was briefly unavailable, overloaded, or the call timed out.
    Transient,
    /// The extraction service's own runtime dependency (e.g. Tesseract) is absent.
    DependencyMissing,
    /// Anything else.
    Unknown,
}

impl ErrorClass {
    /// Whether re-running the batch unchanged may succeed.
    pub fn is_retriable(&self) -> bool {
        matches!(self, ErrorClass::Transient | ErrorClass::Unknown)
    }
}

/// Statistics describing what text cleanup did to the raw extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupStats {
    pub original_length: usize,
    pub cleaned_length: usize,
    pub characters_removed: i64,
    pub original_lines: usize,
    pub cleaned_lines: usize,
    pub paragraphs_created: usize,
}

impl CleanupStats {
    /// Compare text before and after cleanup. Lengths count characters.
    pub fn compute(original: &str, cleaned: &str) -> Self {
        let original_length = original.chars().count();
        let cleaned_length = cleaned.chars().count();
        Self {
            original_length,
            cleaned_length,
            characters_removed: original_length as i64 - cleaned_length as i64,
            original_lines: line_count(original),
            cleaned_lines: line_count(cleaned),
            paragraphs_created: if cleaned.is_empty() {
                0
            } else {
                cleaned.matches("\n\n").count() + 1
            },
        }
    }
}

fn line_count(text: &str) -> usize {
    if text.is_empty() {
        0
    } else {
        text.matches('\n').count() + 1
    }
}

/// Successful extraction result for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionOutput {
    /// File name as reported by the extraction service.
    pub filename: String,
    /// Text exactly as the OCR/text layer produced it.
    pub raw_text: String,
    /// Text after cleanup.
    pub cleaned_text: String,
    pub raw_text_length: usize,
    pub cleaned_text_length: usize,
    /// Whether the cleaned text has any non-whitespace content.
    pub has_text: bool,
    pub cleanup_stats: CleanupStats,
}

/// Classified failure stored on a failed item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemError {
    pub class: ErrorClass,
    /// User-facing message, rewritten when a remediation is known.
    pub message: String,
    /// Raw error text from the extraction capability.
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub detail: String,
    /// Status code reported by the extraction capability, if any.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub status: Option<u16>,
}

/// Terminal outcome of submitting one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Succeeded(ExtractionOutput),
    Failed(ItemError),
}

/// One file and its lifecycle within a batch.
///
/// `result` is set iff `state == Succeeded`, `error` iff `state == Failed`.
#[derive(Debug, Clone, Serialize)]
pub struct BatchItem {
    pub id: ItemId,
    pub source: Arc<FileHandle>,
    pub state: ItemState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ExtractionOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ItemError>,
}

impl BatchItem {
    /// Create a pending item.
    pub fn pending(index: usize, source: Arc<FileHandle>) -> Self {
        Self {
            id: ItemId(index),
            source,
            state: ItemState::Pending,
            result: None,
            error: None,
        }
    }

    /// Display name of the underlying file.
    pub fn name(&self) -> &str {
        &self.source.name
    }

    /// Whether `result`/`error` agree with `state`.
    pub fn is_consistent(&self) -> bool {
        match self.state {
            ItemState::Pending | ItemState::InFlight => {
                self.result.is_none() && self.error.is_none()
            }
            ItemState::Succeeded => self.result.is_some() && self.error.is_none(),
            ItemState::Failed => self.result.is_none() && self.error.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_item_state_terminal() {
        assert!(!ItemState::Pending.is_terminal());
        assert!(!ItemState::InFlight.is_terminal());
        assert!(ItemState::Succeeded.is_terminal());
        assert!(ItemState::Failed.is_terminal());
    }

    #[test]
    fn test_error_class_strings() {
        assert_eq!(ErrorClass::DependencyMissing.to_string(), "dependency_missing");
        assert_eq!(
            ErrorClass::from_str("transient").unwrap(),
            ErrorClass::Transient
        );
        assert!(!ErrorClass::DependencyMissing.is_retriable());
    }

    #[test]
    fn test_cleanup_stats_compute() {
        let stats = CleanupStats::compute("a  b\n\n\n\nc\n", "a b\n\nc");
        assert_eq!(stats.original_length, 10);
        assert_eq!(stats.cleaned_length, 6);
        assert_eq!(stats.characters_removed, 4);
        assert_eq!(stats.original_lines, 6);
        assert_eq!(stats.cleaned_lines, 3);
        assert_eq!(stats.paragraphs_created, 2);

        let empty = CleanupStats::compute("", "");
        assert_eq!(empty, CleanupStats::default());
    }

    #[test]
    fn test_cleanup_stats_counts_characters_not_bytes() {
        let stats = CleanupStats::compute("caf\u{e9}", "caf");
        assert_eq!(stats.original_length, 4);
        assert_eq!(stats.characters_removed, 1);
    }

    #[test]
    fn test_item_id_display() {
        assert_eq!(ItemId(3).to_string(), "item-3");
        assert_eq!(ItemId(3).index(), 3);
    }

    #[test]
    fn test_pending_item_is_consistent() {
        let handle = Arc::new(FileHandle::from_bytes("a.txt", "text/plain", b"a".to_vec()));
        let item = BatchItem::pending(0, handle);
        assert_eq!(item.state, ItemState::Pending);
        assert!(item.is_consistent());
        assert_eq!(item.name(), "a.txt");
    }
}
