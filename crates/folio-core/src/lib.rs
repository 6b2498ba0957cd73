//! folio-core - Core library for folio.
//!
//! This crate provides the batch pipeline that turns a selection of scanned
//! documents into extracted text: per-item state tracking, error
//! classification, sequential orchestration and result aggregation.
//!
//! # Example
//!
//! ```ignore
//! use folio_core::{BatchOrchestrator, BatchSession, FileHandle};
//! use futures::StreamExt;
//!
//! let mut session = BatchSession::new(BatchOrchestrator::with_defaults(extractor));
//! let files = vec![Arc::new(FileHandle::from_path("notes.pdf").await?)];
//!
//! let mut run = session.start_batch(files)?;
//! while let Some(progress) = run.next().await {
//!     println!("{:?} {}/{}", progress.kind, progress.position().unwrap_or(0), progress.total_count);
//! }
//!
//! let summary = session.summary();
//! ```

pub mod classify;
pub mod config;
pub mod error;
pub mod export;
pub mod orchestrator;
pub mod session;
pub mod state;
pub mod summary;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use classify::{ClassifierConfig, DependencySignature, ErrorClassifier};
pub use config::{ExtractionBackend, FolioConfig};
pub use error::{ErrorCode, FolioError, FolioResult};
pub use export::{export_succeeded, ExportReport};
pub use orchestrator::{BatchOrchestrator, BatchRun, OrchestratorConfig};
pub use session::BatchSession;
pub use summary::{summarize, BatchSummary, FailedItem, SucceededItem, TextTotals};
pub use traits::{
    ExportDocument, ExportError, ExportReceipt, ExtractionFailure, ExtractionService,
    WorkspaceExporter,
};
pub use types::{
    Batch, BatchId, BatchItem, BatchProgress, BatchStatus, CleanupStats, ErrorClass,
    ExtractionOutput, FileHandle, ItemError, ItemId, ItemState, ProgressKind,
};
