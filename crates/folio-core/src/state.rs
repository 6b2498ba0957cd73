//! Batch state machine.
//!
//! [`apply`] is the only way the orchestrator changes a [`Batch`]. It is a
//! pure function of the previous snapshot and one [`Transition`], so the
//! whole lifecycle can be exercised without any extraction service.

use crate::error::{FolioError, FolioResult};
use crate::types::{Batch, BatchStatus, ItemOutcome, ItemState};

/// A single lifecycle step.
#[derive(Debug, Clone)]
pub enum Transition {
    /// `Idle -> Processing`.
    Start,
    /// Item `i`: `Pending -> InFlight`.
    Begin(usize),
    /// Item `i`: `InFlight -> Succeeded | Failed`.
    Resolve(usize, ItemOutcome),
    /// `Processing -> Completed`, once every item is terminal.
    Complete,
    /// `Idle | Processing -> Fatal`.
    Abort,
}

impl Transition {
    fn name(&self) -> &'static str {
        match self {
            Transition::Start => "start",
            Transition::Begin(_) => "begin",
            Transition::Resolve(..) => "resolve",
            Transition::Complete => "complete",
            Transition::Abort => "abort",
        }
    }
}

/// Apply a transition, returning the next snapshot.
///
/// The input is left untouched; an invalid transition returns
/// [`FolioError::InvalidTransition`].
pub fn apply(batch: &Batch, transition: Transition) -> FolioResult<Batch> {
    let name = transition.name();
    let mut next = batch.clone();

    match transition {
        Transition::Start => {
            require_status(batch, BatchStatus::Idle, name)?;
            if batch.is_empty() {
                return Err(FolioError::invalid_transition("cannot start an empty batch"));
            }
            next.status = BatchStatus::Processing;
        }

        Transition::Begin(index) => {
            require_status(batch, BatchStatus::Processing, name)?;
            if let Some(current) = batch.current_index {
                return Err(FolioError::invalid_transition(format!(
                    "item {} is still in flight",
                    current
                )));
            }
            let item = batch.items.get(index).ok_or_else(|| out_of_range(batch, index))?;
            if item.state != ItemState::Pending {
                return Err(FolioError::invalid_transition(format!(
                    "item {} is {}, expected pending",
                    index, item.state
                )));
            }
            if let Some(earlier) = batch.items[..index].iter().find(|i| !i.state.is_terminal()) {
                return Err(FolioError::invalid_transition(format!(
                    "item {} must resolve before item {} starts",
                    earlier.id.index(),
                    index
                )));
            }

            next.items[index].state = ItemState::InFlight;
            next.current_index = Some(index);
        }

        Transition::Resolve(index, outcome) => {
            require_status(batch, BatchStatus::Processing, name)?;
            let item = batch.items.get(index).ok_or_else(|| out_of_range(batch, index))?;
            if item.state != ItemState::InFlight || batch.current_index != Some(index) {
                return Err(FolioError::invalid_transition(format!(
                    "item {} is {}, expected in_flight",
                    index, item.state
                )));
            }

            let slot = &mut next.items[index];
            match outcome {
                ItemOutcome::Succeeded(output) => {
                    slot.state = ItemState::Succeeded;
                    slot.result = Some(output);
                }
                ItemOutcome::Failed(error) => {
                    slot.state = ItemState::Failed;
                    slot.error = Some(error);
                }
            }
            next.current_index = None;
        }

        Transition::Complete => {
            require_status(batch, BatchStatus::Processing, name)?;
            if !batch.all_resolved() {
                return Err(FolioError::invalid_transition(format!(
                    "{} of {} items are still unresolved",
                    batch.len() - batch.resolved_count(),
                    batch.len()
                )));
            }
            next.status = BatchStatus::Completed;
        }

        Transition::Abort => {
            if !matches!(batch.status, BatchStatus::Idle | BatchStatus::Processing) {
                return Err(FolioError::invalid_transition(format!(
                    "cannot abort a {} batch",
                    batch.status
                )));
            }
            next.status = BatchStatus::Fatal;
            next.current_index = None;
        }
    }

    Ok(next)
}

fn require_status(batch: &Batch, expected: BatchStatus, transition: &str) -> FolioResult<()> {
    if batch.status == expected {
        Ok(())
    } else {
        Err(FolioError::invalid_transition(format!(
            "{} requires a {} batch, found {}",
            transition, expected, batch.status
        )))
    }
}

fn out_of_range(batch: &Batch, index: usize) -> FolioError {
    FolioError::invalid_transition(format!(
        "item {} out of range for a batch of {}",
        index,
        batch.len()
    ))
}
