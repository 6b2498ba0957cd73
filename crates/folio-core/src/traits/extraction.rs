//! Extraction capability trait.

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{ExtractionOutput, FileHandle};

/// Raw failure reported by an extraction capability, before classification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ExtractionFailure {
    /// Error text exactly as the capability reported it.
    pub message: String,
    /// Status code of the remote response, if there was one.
    pub status: Option<u16>,
    /// Set when the call never produced a response (connect/transport errors).
    pub retriable: bool,
}

impl ExtractionFailure {
    /// Create a failure from a message alone.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            retriable: false,
        }
    }

    /// Create a failure carrying a response status.
    pub fn with_status(message: impl Into<String>, status: u16) -> Self {
        Self {
            message: message.into(),
            status: Some(status),
            retriable: false,
        }
    }

    /// Create a failure for a call that never got a response.
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            retriable: true,
        }
    }
}

/// Converts one file into text. Invoked at most once per item per run.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExtractionService: Send + Sync {
    /// Extract and clean the text of a file.
    async fn submit(&self, file: &FileHandle) -> Result<ExtractionOutput, ExtractionFailure>;
}
