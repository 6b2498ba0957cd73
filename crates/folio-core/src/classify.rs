//! Error classification for failed extraction calls.
//!
//! Matching rules live in a signature table instead of control flow so a
//! different backend only needs a different [`ClassifierConfig`].

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::traits::ExtractionFailure;
use crate::types::{ErrorClass, ItemError};

/// Remediation shown for every Tesseract-related signature.
pub const TESSERACT_REMEDIATION: &str = "Tesseract OCR not installed. Please install Tesseract OCR and restart the server. See TESSERACT_SETUP.md for instructions.";

const POPPLER_REMEDIATION: &str = "Poppler is not installed on the extraction server. Install poppler-utils so PDF pages can be rendered for OCR, then restart the server.";

const PDF2IMAGE_REMEDIATION: &str = "The pdf2image package is missing on the extraction server. Install it with `pip install pdf2image` and retry.";

const UNKNOWN_MESSAGE: &str = "Unknown extraction error";

const TRANSIENT_MESSAGE: &str = "Extraction service temporarily unavailable";

/// A known "remote dependency not installed" error signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencySignature {
    /// Substring searched for, case-insensitively, in the raw error text.
    pub pattern: String,
    /// Actionable message that replaces the raw text on a match.
    pub message: String,
}

impl DependencySignature {
    pub fn new(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            message: message.into(),
        }
    }
}

/// Classifier rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Checked in order; the first match wins.
    pub dependency_signatures: Vec<DependencySignature>,
    /// Response statuses that mark a failure as transient.
    pub transient_statuses: Vec<u16>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            dependency_signatures: vec![
                DependencySignature::new("TesseractNotFoundError", TESSERACT_REMEDIATION),
                DependencySignature::new("Tesseract OCR not installed", TESSERACT_REMEDIATION),
                DependencySignature::new("Tesseract OCR not found", TESSERACT_REMEDIATION),
                DependencySignature::new("tesseract is not installed", TESSERACT_REMEDIATION),
                DependencySignature::new("Unable to get page count", POPPLER_REMEDIATION),
                DependencySignature::new("poppler", POPPLER_REMEDIATION),
                DependencySignature::new("pdf2image", PDF2IMAGE_REMEDIATION),
            ],
            transient_statuses: vec![408, 425, 429, 502, 503, 504],
        }
    }
}

#[derive(Debug, Clone)]
struct CompiledSignature {
    needle: String,
    message: String,
}

/// Maps raw extraction failures to an [`ErrorClass`] and a user-facing message.
///
/// Total and side-effect free: every input yields exactly one classification.
#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    signatures: Vec<CompiledSignature>,
    transient_statuses: HashSet<u16>,
}

impl ErrorClassifier {
    /// Create a classifier with the default signature table.
    pub fn new() -> Self {
        Self::with_config(&ClassifierConfig::default())
    }

    /// Create a classifier from explicit rules.
    pub fn with_config(config: &ClassifierConfig) -> Self {
        let signatures = config
            .dependency_signatures
            .iter()
            .filter(|s| !s.pattern.trim().is_empty())
            .map(|s| CompiledSignature {
                needle: s.pattern.to_lowercase(),
                message: s.message.clone(),
            })
            .collect();

        Self {
            signatures,
            transient_statuses: config.transient_statuses.iter().copied().collect(),
        }
    }

    /// Classify a raw failure.
    pub fn classify(&self, failure: &ExtractionFailure) -> ItemError {
        let (class, message) =
            self.classify_parts(&failure.message, failure.status, failure.retriable);
        ItemError {
            class,
            message,
            detail: failure.message.clone(),
            status: failure.status,
        }
    }

    /// Classification of a call that exceeded the per-item timeout.
    pub fn classify_timeout(&self, timeout: Duration) -> ItemError {
        ItemError {
            class: ErrorClass::Transient,
            message: format!(
                "Extraction timed out after {}s. The service may be overloaded; retry the batch.",
                timeout.as_secs_f32()
            ),
            detail: String::new(),
            status: None,
        }
    }

    fn classify_parts(
        &self,
        raw: &str,
        status: Option<u16>,
        retriable: bool,
    ) -> (ErrorClass, String) {
        let haystack = raw.to_lowercase();
        if let Some(signature) = self.signatures.iter().find(|s| haystack.contains(&s.needle)) {
            let message = if signature.message.trim().is_empty() {
                normalize(raw, UNKNOWN_MESSAGE)
            } else {
                signature.message.clone()
            };
            return (ErrorClass::DependencyMissing, message);
        }

        let transient_status = status.is_some_and(|s| self.transient_statuses.contains(&s));
        if retriable || transient_status {
            return (ErrorClass::Transient, normalize(raw, TRANSIENT_MESSAGE));
        }

        (ErrorClass::Unknown, normalize(raw, UNKNOWN_MESSAGE))
    }
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(raw: &str, fallback: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tesseract_signature_rewrites_message() {
        let classifier = ErrorClassifier::new();
        let failure = ExtractionFailure::with_status(
            "Processing failed: TesseractNotFoundError: tesseract is not installed or it's not in your PATH",
            500,
        );

        let error = classifier.classify(&failure);
        assert_eq!(error.class, ErrorClass::DependencyMissing);
        assert_eq!(error.message, TESSERACT_REMEDIATION);
        assert!(error.detail.contains("TesseractNotFoundError"));
        assert_eq!(error.status, Some(500));
    }

    #[test]
    fn test_signature_beats_transient_status() {
        // The backend reports a missing Tesseract with 503.
        let classifier = ErrorClassifier::new();
        let failure = ExtractionFailure::with_status(
            "Tesseract OCR not installed. Please install Tesseract OCR and restart the server.",
            503,
        );
        assert_eq!(classifier.classify(&failure).class, ErrorClass::DependencyMissing);
    }

    #[test]
    fn test_signature_match_is_case_insensitive() {
        let classifier = ErrorClassifier::new();
        let failure = ExtractionFailure::new("PDFInfoNotInstalledError: Unable to get page count. Is POPPLER installed?");
        let error = classifier.classify(&failure);
        assert_eq!(error.class, ErrorClass::DependencyMissing);
        assert!(error.message.contains("poppler-utils"));
    }

    #[test]
    fn test_first_signature_wins() {
        let config = ClassifierConfig {
            dependency_signatures: vec![
                DependencySignature::new("missing", "first"),
                DependencySignature::new("missing lib", "second"),
            ],
            transient_statuses: vec![],
        };
        let classifier = ErrorClassifier::with_config(&config);
        let error = classifier.classify(&ExtractionFailure::new("missing lib"));
        assert_eq!(error.message, "first");
    }

    #[test]
    fn test_transient_status() {
        let classifier = ErrorClassifier::new();
        let error = classifier.classify(&ExtractionFailure::with_status("Service Unavailable", 503));
        assert_eq!(error.class, ErrorClass::Transient);
        assert_eq!(error.message, "Service Unavailable");
    }

    #[test]
    fn test_transport_failure_is_transient() {
        let classifier = ErrorClassifier::new();
        let error = classifier.classify(&ExtractionFailure::transport("connection refused"));
        assert_eq!(error.class, ErrorClass::Transient);
    }

    #[test]
    fn test_unmatched_is_unknown() {
        let classifier = ErrorClassifier::new();
        let error = classifier.classify(&ExtractionFailure::with_status(
            "Only PDF files are supported for OCR processing",
            400,
        ));
        assert_eq!(error.class, ErrorClass::Unknown);
        assert_eq!(error.message, "Only PDF files are supported for OCR processing");
    }

    #[test]
    fn test_classifier_is_total_on_degenerate_input() {
        let classifier = ErrorClassifier::new();
        let inputs = [
            ExtractionFailure::new(""),
            ExtractionFailure::new("   \n\t"),
            ExtractionFailure::with_status("", 503),
            ExtractionFailure::with_status("\u{0}\u{fffd}", 0),
            ExtractionFailure::transport(""),
        ];

        for input in &inputs {
            let error = classifier.classify(input);
            assert!(!error.message.is_empty());
        }
        assert_eq!(classifier.classify(&inputs[0]).message, UNKNOWN_MESSAGE);
        assert_eq!(classifier.classify(&inputs[2]).message, TRANSIENT_MESSAGE);
    }

    #[test]
    fn test_empty_patterns_are_ignored() {
        let config = ClassifierConfig {
            dependency_signatures: vec![DependencySignature::new("  ", "never")],
            transient_statuses: vec![],
        };
        let classifier = ErrorClassifier::with_config(&config);
        assert_eq!(
            classifier.classify(&ExtractionFailure::new("anything")).class,
            ErrorClass::Unknown
        );
    }

    #[test]
    fn test_timeout_is_transient() {
        let classifier = ErrorClassifier::new();
        let error = classifier.classify_timeout(Duration::from_secs(30));
        assert_eq!(error.class, ErrorClass::Transient);
        assert!(error.message.contains("30s"));
    }
}
