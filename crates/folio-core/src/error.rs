//! Error types for folio operations.
//!
//! Only orchestration-level failures live here. Per-item extraction
//! failures never surface as `FolioError`; they are captured into the
//! item as an [`ItemError`](crate::types::ItemError).

use thiserror::Error;

/// Result type alias for folio operations.
pub type FolioResult<T> = Result<T, FolioError>;

/// Main error type for batch-level operations.
#[derive(Error, Debug)]
pub enum FolioError {
    /// A batch was requested without any files.
    #[error("Cannot start a batch with an empty file selection")]
    EmptySelection,

    /// Input validation failed.
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        code: ErrorCode,
        suggestion: Option<String>,
    },

    /// A lifecycle transition was rejected by the batch state machine.
    #[error("Invalid transition: {message}")]
    InvalidTransition { message: String },

    /// Export was requested for a batch with no succeeded items.
    #[error("No succeeded items to export")]
    NothingToExport,

    /// Retry was requested before any batch was started.
    #[error("No previous file selection to retry")]
    NothingToRetry,

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Validation (VAL_xxx)
    ValEmptySelection,
    ValInvalidInput,

    // State machine (STATE_xxx)
    StateInvalidTransition,

    // Export (EXP_xxx)
    ExpNothingToExport,

    // Retry (RETRY_xxx)
    RetryNothingToRetry,

    // Configuration (CFG_xxx)
    CfgInvalid,

    // IO (IO_xxx)
    Io,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValEmptySelection => "VAL_001",
            ErrorCode::ValInvalidInput => "VAL_002",
            ErrorCode::StateInvalidTransition => "STATE_001",
            ErrorCode::ExpNothingToExport => "EXP_001",
            ErrorCode::RetryNothingToRetry => "RETRY_001",
            ErrorCode::CfgInvalid => "CFG_001",
            ErrorCode::Io => "IO_001",
        }
    }
}

impl FolioError {
    /// Create a validation error with suggestion.
    pub fn validation_with_suggestion(
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValInvalidInput,
            suggestion: Some(suggestion.into()),
        }
    }

    /// Create an invalid transition error.
    pub fn invalid_transition(message: impl Into<String>) -> Self {
        Self::InvalidTransition {
            message: message.into(),
        }
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::EmptySelection => ErrorCode::ValEmptySelection,
            Self::Validation { code, .. } => *code,
            Self::InvalidTransition { .. } => ErrorCode::StateInvalidTransition,
            Self::NothingToExport => ErrorCode::ExpNothingToExport,
            Self::NothingToRetry => ErrorCode::RetryNothingToRetry,
            Self::Configuration(_) => ErrorCode::CfgInvalid,
            Self::Io(_) => ErrorCode::Io,
        }
    }

    /// Get a user-friendly suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::EmptySelection => Some("Select at least one file before starting a batch"),
            Self::Validation { suggestion, .. } => suggestion.as_deref(),
            Self::NothingToExport => Some("Only successfully converted files can be exported"),
            Self::NothingToRetry => Some("Start a batch first"),
            Self::Configuration(_) => Some("Please check your folio configuration file"),
            Self::InvalidTransition { .. } | Self::Io(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_selection_error() {
        let err = FolioError::EmptySelection;
        assert_eq!(err.code(), ErrorCode::ValEmptySelection);
        assert!(err.suggestion().is_some());
        assert!(err.to_string().contains("empty file selection"));
    }

    #[test]
    fn test_validation_error_carries_suggestion() {
        let err =
            FolioError::validation_with_suggestion("'notes' is not a regular file", "Pass files");
        assert_eq!(err.code(), ErrorCode::ValInvalidInput);
        assert_eq!(err.code().as_str(), "VAL_002");
        assert!(err.to_string().contains("notes"));
        assert_eq!(err.suggestion(), Some("Pass files"));
    }

    #[test]
    fn test_io_error_has_no_suggestion() {
        let err = FolioError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.code(), ErrorCode::Io);
        assert_eq!(err.suggestion(), None);
    }

    #[test]
    fn test_error_code_as_str() {
        assert_eq!(ErrorCode::ValEmptySelection.as_str(), "VAL_001");
        assert_eq!(ErrorCode::StateInvalidTransition.as_str(), "STATE_001");
    }
}
