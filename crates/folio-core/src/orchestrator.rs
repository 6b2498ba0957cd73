//! Batch orchestrator.
//!
//! Drives one batch through the extraction capability, strictly one item at
//! a time in selection order. A run is a lazy [`Stream`] of
//! [`BatchProgress`] events: nothing is submitted until the stream is
//! polled, and item `i + 1` is only submitted after the event for item
//! `i`'s terminal state has been yielded.
//!
//! Item failures are classified and stored on the item; they never end the
//! run. Cancelling the run's token drops the in-flight call, stops further
//! submissions and ends the stream without another event.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::stream::{BoxStream, Stream, StreamExt};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::classify::ErrorClassifier;
use crate::config::PipelineConfig;
use crate::error::{FolioError, FolioResult};
use crate::state::{apply, Transition};
use crate::traits::ExtractionService;
use crate::types::{
    Batch, BatchId, BatchProgress, BatchStatus, FileHandle, ItemOutcome, ItemState, ProgressKind,
};

/// Orchestrator settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Upper bound on a single extraction call. `None` waits indefinitely.
    pub item_timeout: Option<Duration>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self::from(&PipelineConfig::default())
    }
}

impl From<&PipelineConfig> for OrchestratorConfig {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            item_timeout: config.item_timeout(),
        }
    }
}

/// Runs batches against an extraction capability.
#[derive(Clone)]
pub struct BatchOrchestrator {
    extractor: Arc<dyn ExtractionService>,
    classifier: Arc<ErrorClassifier>,
    config: OrchestratorConfig,
}

impl BatchOrchestrator {
    /// Create a new orchestrator.
    pub fn new(
        extractor: Arc<dyn ExtractionService>,
        classifier: ErrorClassifier,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            extractor,
            classifier: Arc::new(classifier),
            config,
        }
    }

    /// Create an orchestrator with the default classifier and settings.
    pub fn with_defaults(extractor: Arc<dyn ExtractionService>) -> Self {
        Self::new(extractor, ErrorClassifier::new(), OrchestratorConfig::default())
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Start a run over `files`.
    ///
    /// Fails synchronously with [`FolioError::EmptySelection`] when `files`
    /// is empty; no batch is created in that case.
    pub fn run(&self, files: Vec<Arc<FileHandle>>) -> FolioResult<BatchRun> {
        self.run_with_cancel(files, CancellationToken::new())
    }

    /// Start a run that stops when `cancel` is triggered.
    pub fn run_with_cancel(
        &self,
        files: Vec<Arc<FileHandle>>,
        cancel: CancellationToken,
    ) -> FolioResult<BatchRun> {
        if files.is_empty() {
            return Err(FolioError::EmptySelection);
        }

        let batch = apply(&Batch::new(files), Transition::Start)?;
        let batch_id = batch.id;
        let total = batch.len();
        let (publisher, snapshot) = watch::channel(batch.clone());

        tracing::info!(batch_id = %batch_id, total, "Starting batch");

        let driver = RunDriver {
            batch,
            extractor: self.extractor.clone(),
            classifier: self.classifier.clone(),
            item_timeout: self.config.item_timeout,
            cancel: cancel.clone(),
            publisher,
            step: Step::Begin(0),
            sequence: 0,
        };

        Ok(BatchRun {
            batch_id,
            total,
            snapshot,
            cancel,
            events: futures::stream::unfold(driver, RunDriver::advance).boxed(),
        })
    }

    /// Run a batch to the end and return the final snapshot.
    pub async fn run_to_completion(&self, files: Vec<Arc<FileHandle>>) -> FolioResult<Batch> {
        Ok(self.run(files)?.collect_batch().await)
    }
}

/// A running batch, consumed as a stream of progress events.
///
/// The final event of a run that was not cancelled has kind
/// [`ProgressKind::Completed`].
pub struct BatchRun {
    batch_id: BatchId,
    total: usize,
    snapshot: watch::Receiver<Batch>,
    cancel: CancellationToken,
    events: BoxStream<'static, BatchProgress>,
}

impl BatchRun {
    pub fn batch_id(&self) -> BatchId {
        self.batch_id
    }

    /// Number of items in the batch.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Batch {
        self.snapshot.borrow().clone()
    }

    /// Receiver that observes every published snapshot.
    pub fn watch(&self) -> watch::Receiver<Batch> {
        self.snapshot.clone()
    }

    /// Token that abandons this run when cancelled.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Abandon the run.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Drive the run to its end and return the final snapshot.
    pub async fn collect_batch(mut self) -> Batch {
        while self.events.next().await.is_some() {}
        self.snapshot()
    }
}

impl Stream for BatchRun {
    type Item = BatchProgress;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().events.poll_next_unpin(cx)
    }
}

impl std::fmt::Debug for BatchRun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchRun")
            .field("batch_id", &self.batch_id)
            .field("total", &self.total)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

#[derive(Debug, Clone, Copy)]
enum Step {
    Begin(usize),
    Submit(usize),
    Complete,
    Done,
}

/// State carried between events of one run.
struct RunDriver {
    batch: Batch,
    extractor: Arc<dyn ExtractionService>,
    classifier: Arc<ErrorClassifier>,
    item_timeout: Option<Duration>,
    cancel: CancellationToken,
    publisher: watch::Sender<Batch>,
    step: Step,
    sequence: u64,
}

impl RunDriver {
    /// Perform the next transition and yield its event.
    async fn advance(mut self) -> Option<(BatchProgress, Self)> {
        if matches!(self.step, Step::Done) {
            return None;
        }
        if self.cancel.is_cancelled() {
            self.abandon();
            return None;
        }

        match self.step {
            Step::Begin(index) => {
                self.transition(Transition::Begin(index))?;
                self.step = Step::Submit(index);

                let item = &self.batch.items[index];
                tracing::debug!(
                    batch_id = %self.batch.id,
                    item = index + 1,
                    total = self.batch.len(),
                    file = %item.name(),
                    "Submitting item"
                );
                let event = self.event(ProgressKind::ItemStarted, Some(index));
                Some((event, self))
            }

            Step::Submit(index) => {
                let file = self.batch.items[index].source.clone();
                let cancel = self.cancel.clone();

                let outcome = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => None,
                    outcome = submit_item(
                        self.extractor.as_ref(),
                        &self.classifier,
                        self.item_timeout,
                        &file,
                    ) => Some(outcome),
                };
                let Some(outcome) = outcome else {
                    self.abandon();
                    return None;
                };

                match &outcome {
                    ItemOutcome::Succeeded(output) => tracing::info!(
                        batch_id = %self.batch.id,
                        file = %file.name,
                        characters = output.cleaned_text_length,
                        "Item succeeded"
                    ),
                    ItemOutcome::Failed(error) => tracing::warn!(
                        batch_id = %self.batch.id,
                        file = %file.name,
                        class = %error.class,
                        status = ?error.status,
                        error = %error.message,
                        "Item failed"
                    ),
                }

                self.transition(Transition::Resolve(index, outcome))?;
                self.step = if index + 1 < self.batch.len() {
                    Step::Begin(index + 1)
                } else {
                    Step::Complete
                };
                let event = self.event(ProgressKind::ItemFinished, Some(index));
                Some((event, self))
            }

            Step::Complete => {
                self.transition(Transition::Complete)?;
                self.step = Step::Done;

                tracing::info!(
                    batch_id = %self.batch.id,
                    succeeded = self.batch.count_in(ItemState::Succeeded),
                    failed = self.batch.count_in(ItemState::Failed),
                    "Batch completed"
                );
                let event = self.event(ProgressKind::Completed, None);
                Some((event, self))
            }

            Step::Done => None,
        }
    }

    /// Apply a transition, publishing the result. An invalid transition
    /// marks the batch `Fatal` and ends the run.
    fn transition(&mut self, transition: Transition) -> Option<()> {
        match apply(&self.batch, transition) {
            Ok(next) => {
                self.batch = next;
                self.publisher.send_replace(self.batch.clone());
                Some(())
            }
            Err(e) => {
                tracing::error!(
                    batch_id = %self.batch.id,
                    error = %e,
                    "Batch state machine rejected transition"
                );
                self.batch.status = BatchStatus::Fatal;
                self.batch.current_index = None;
                self.publisher.send_replace(self.batch.clone());
                self.step = Step::Done;
                None
            }
        }
    }

    fn event(&mut self, kind: ProgressKind, index: Option<usize>) -> BatchProgress {
        let event = BatchProgress::from_batch(&self.batch, self.sequence, kind, index);
        self.sequence += 1;
        event
    }

    /// Stop the run after cancellation or when its stream is dropped. A run
    /// abandoned before any item resolved is `Fatal`; otherwise the partial
    /// snapshot is left as is.
    fn abandon(&mut self) {
        tracing::info!(
            batch_id = %self.batch.id,
            resolved = self.batch.resolved_count(),
            total = self.batch.len(),
            "Batch cancelled"
        );
        if self.batch.resolved_count() == 0 {
            if let Ok(next) = apply(&self.batch, Transition::Abort) {
                self.batch = next;
                self.publisher.send_replace(self.batch.clone());
            }
        }
        self.step = Step::Done;
    }
}

impl Drop for RunDriver {
    fn drop(&mut self) {
        if !matches!(self.step, Step::Done) {
            self.abandon();
        }
    }
}

/// Submit one file and classify any failure. Never returns an error.
async fn submit_item(
    extractor: &dyn ExtractionService,
    classifier: &ErrorClassifier,
    timeout: Option<Duration>,
    file: &FileHandle,
) -> ItemOutcome {
    let call = extractor.submit(file);
    let result = match timeout {
        Some(limit) => match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => return ItemOutcome::Failed(classifier.classify_timeout(limit)),
        },
        None => call.await,
    };

    match result {
        Ok(output) => ItemOutcome::Succeeded(output),
        Err(failure) => ItemOutcome::Failed(classifier.classify(&failure)),
    }
}
