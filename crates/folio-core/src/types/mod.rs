//! Core data model: files, items, batches and progress snapshots.

mod batch;
mod file;
mod item;
mod progress;

pub use batch::{Batch, BatchId, BatchStatus};
pub use file::{guess_mime_type, FileHandle, FileSource};
pub use item::{
    BatchItem, CleanupStats, ErrorClass, ExtractionOutput, ItemError, ItemId, ItemOutcome,
    ItemState,
};
pub use progress::{BatchProgress, ProgressKind};
