//! Caller-facing batch session.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::error::{FolioError, FolioResult};
use crate::orchestrator::{BatchOrchestrator, BatchRun};
use crate::summary::{summarize, BatchSummary};
use crate::types::{Batch, BatchId, BatchStatus, FileHandle};

struct ActiveBatch {
    id: BatchId,
    cancel: CancellationToken,
    snapshot: watch::Receiver<Batch>,
}

impl ActiveBatch {
    fn status(&self) -> BatchStatus {
        let status = self.snapshot.borrow().status;
        // The run publishes until it ends; a closed channel means nothing
        // drives this batch any more.
        if status == BatchStatus::Processing && self.snapshot.has_changed().is_err() {
            BatchStatus::Fatal
        } else {
            status
        }
    }
}

/// Owns an orchestrator and at most one active batch.
///
/// Starting a new batch or resetting abandons the previous run: its stream
/// ends and it no longer contributes to [`summary`](Self::summary).
pub struct BatchSession {
    orchestrator: BatchOrchestrator,
    active: Option<ActiveBatch>,
    last_selection: Option<Vec<Arc<FileHandle>>>,
}

impl BatchSession {
    pub fn new(orchestrator: BatchOrchestrator) -> Self {
        Self {
            orchestrator,
            active: None,
            last_selection: None,
        }
    }

    pub fn orchestrator(&self) -> &BatchOrchestrator {
        &self.orchestrator
    }

    /// Begin a run over `files`, abandoning any previous run.
    ///
    /// An empty selection is rejected before anything else happens, so the
    /// previous batch stays in place.
    pub fn start_batch(&mut self, files: Vec<Arc<FileHandle>>) -> FolioResult<BatchRun> {
        if files.is_empty() {
            return Err(FolioError::EmptySelection);
        }

        self.abandon_active();

        let cancel = CancellationToken::new();
        let run = self.orchestrator.run_with_cancel(files.clone(), cancel.clone())?;
        self.active = Some(ActiveBatch {
            id: run.batch_id(),
            cancel,
            snapshot: run.watch(),
        });
        self.last_selection = Some(files);

        Ok(run)
    }

    /// Re-run every file of the last selection as a fresh batch.
    pub fn retry_batch(&mut self) -> FolioResult<BatchRun> {
        let files = self.last_selection.clone().ok_or(FolioError::NothingToRetry)?;
        tracing::info!(files = files.len(), "Retrying batch");
        self.start_batch(files)
    }

    /// Discard the current batch and selection. Safe to call at any time.
    pub fn reset_batch(&mut self) {
        self.abandon_active();
        self.last_selection = None;
    }

    /// Summary of the current batch, or the empty summary if no item has
    /// resolved yet.
    pub fn summary(&self) -> BatchSummary {
        match self.snapshot() {
            Some(batch) if batch.resolved_count() > 0 => BatchSummary {
                status: self.status(),
                ..summarize(&batch)
            },
            _ => BatchSummary::empty(),
        }
    }

    /// Status of the current batch; `Idle` when there is none.
    ///
    /// A batch whose run was dropped mid-way reports `Fatal`.
    pub fn status(&self) -> BatchStatus {
        self.active
            .as_ref()
            .map(ActiveBatch::status)
            .unwrap_or_default()
    }

    /// Latest snapshot of the current batch.
    pub fn snapshot(&self) -> Option<Batch> {
        self.active.as_ref().map(|a| a.snapshot.borrow().clone())
    }

    pub fn batch_id(&self) -> Option<BatchId> {
        self.active.as_ref().map(|a| a.id)
    }

    /// Whether [`retry_batch`](Self::retry_batch) has a selection to re-run.
    pub fn can_retry(&self) -> bool {
        self.last_selection.is_some()
    }

    fn abandon_active(&mut self) {
        if let Some(active) = self.active.take() {
            tracing::debug!(batch_id = %active.id, "Discarding batch");
            active.cancel.cancel();
        }
    }
}

impl Drop for BatchSession {
    fn drop(&mut self) {
        self.abandon_active();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{ExtractionFailure, MockExtractionService};
    use crate::types::{CleanupStats, ExtractionOutput, ItemState, ProgressKind};
    use futures::StreamExt;

    fn files(names: &[&str]) -> Vec<Arc<FileHandle>> {
        names
            .iter()
            .map(|n| Arc::new(FileHandle::from_bytes(*n, "image/png", b"\x89PNG".to_vec())))
            .collect()
    }

    fn session() -> BatchSession {
        let mut mock = MockExtractionService::new();
        mock.expect_submit().returning(|file| {
            if file.name.starts_with("bad") {
                return Err(ExtractionFailure::with_status("Tesseract OCR not found", 500));
            }
            Ok(ExtractionOutput {
                filename: file.name.clone(),
                raw_text: "hello".to_string(),
                cleaned_text: "hello".to_string(),
                raw_text_length: 5,
                cleaned_text_length: 5,
                has_text: true,
                cleanup_stats: CleanupStats::default(),
            })
        });
        BatchSession::new(BatchOrchestrator::with_defaults(Arc::new(mock)))
    }

    #[tokio::test]
    async fn test_summary_before_and_after_run() {
        let mut session = session();
        assert_eq!(session.summary(), BatchSummary::empty());
        assert_eq!(session.status(), BatchStatus::Idle);

        let run = session.start_batch(files(&["a.png", "bad.png", "c.png"])).unwrap();
        assert_eq!(session.summary(), BatchSummary::empty());

        run.collect_batch().await;
        let summary = session.summary();
        assert_eq!(session.status(), BatchStatus::Completed);
        assert_eq!(summary.succeeded_count(), 2);
        assert_eq!(summary.failed_count(), 1);
        assert_eq!(summary.dependency_missing().count(), 1);
        assert_eq!(summary, session.summary());
    }

    #[tokio::test]
    async fn test_empty_start_keeps_previous_batch() {
        let mut session = session();
        session.start_batch(files(&["a.png"])).unwrap().collect_batch().await;
        let before = session.batch_id();

        let result = session.start_batch(Vec::new());
        assert!(matches!(result, Err(FolioError::EmptySelection)));
        assert_eq!(session.batch_id(), before);
        assert_eq!(session.summary().succeeded_count(), 1);
    }

    #[tokio::test]
    async fn test_reset_mid_run_leaves_no_residue() {
        let mut session = session();
        let mut run = session.start_batch(files(&["a.png", "b.png", "c.png"])).unwrap();

        while let Some(event) = run.next().await {
            if event.kind == ProgressKind::ItemFinished && event.current_index == Some(0) {
                break;
            }
        }
        session.reset_batch();
        assert!(run.next().await.is_none());
        assert_eq!(session.status(), BatchStatus::Idle);
        assert!(!session.can_retry());

        let fresh = session.start_batch(files(&["x.png"])).unwrap();
        let snapshot = session.snapshot().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.items[0].state, ItemState::Pending);
        assert_eq!(session.summary(), BatchSummary::empty());

        fresh.collect_batch().await;
        let summary = session.summary();
        assert_eq!(summary.total, 1);
        assert_eq!(summary.succeeded[0].filename, "x.png");
    }

    #[tokio::test]
    async fn test_retry_reruns_whole_selection() {
        let mut session = session();
        let first = session.start_batch(files(&["a.png", "bad.png"])).unwrap();
        let first_id = first.batch_id();
        first.collect_batch().await;

        let retry = session.retry_batch().unwrap();
        assert_ne!(retry.batch_id(), first_id);
        let batch = retry.collect_batch().await;
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.items[0].state, ItemState::Succeeded);
        assert_eq!(batch.items[1].state, ItemState::Failed);
    }

    #[tokio::test]
    async fn test_dropped_run_is_not_reported_as_processing() {
        let mut session = session();
        let run = session.start_batch(files(&["a.png"])).unwrap();
        assert_eq!(session.status(), BatchStatus::Processing);

        drop(run);
        assert_eq!(session.status(), BatchStatus::Fatal);
        assert_eq!(session.summary(), BatchSummary::empty());
        assert!(session.can_retry());

        let batch = session.retry_batch().unwrap().collect_batch().await;
        assert_eq!(batch.status, BatchStatus::Completed);
        assert_eq!(session.status(), BatchStatus::Completed);
    }

    #[tokio::test]
    async fn test_dropped_run_keeps_partial_summary() {
        let mut session = session();
        let mut run = session.start_batch(files(&["a.png", "b.png", "c.png"])).unwrap();
        while let Some(event) = run.next().await {
            if event.kind == ProgressKind::ItemFinished {
                break;
            }
        }

        drop(run);
        assert_eq!(session.status(), BatchStatus::Fatal);
        let summary = session.summary();
        assert_eq!(summary.succeeded_count(), 1);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.status, BatchStatus::Fatal);
    }

    #[test]
    fn test_retry_without_selection() {
        let mut session = session();
        assert!(matches!(session.retry_batch(), Err(FolioError::NothingToRetry)));
    }

    #[tokio::test]
    async fn test_new_start_abandons_previous_run() {
        let mut session = session();
        let mut old = session.start_batch(files(&["a.png", "b.png"])).unwrap();
        old.next().await.unwrap();

        let new = session.start_batch(files(&["c.png"])).unwrap();
        assert!(old.next().await.is_none());
        assert_eq!(session.batch_id(), Some(new.batch_id()));
    }
}
