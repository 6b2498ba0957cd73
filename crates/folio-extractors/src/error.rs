//! Extraction error types.

use folio_core::ExtractionFailure;
use thiserror::Error;

/// Errors that can occur during content extraction.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Content type is not supported by any extractor.
    #[error("Unsupported content type: {0}")]
    UnsupportedType(String),

    /// Extraction process failed.
    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    /// Nothing readable was found in the file.
    #[error("Failed to extract text from {0}. The file may be corrupted or contain no readable text.")]
    EmptyContent(String),

    /// IO error during extraction.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// PDF-specific extraction error.
    #[cfg(feature = "pdf")]
    #[error("PDF extraction error: {0}")]
    Pdf(String),

    /// Image decoding or format error.
    #[error("Image error: {0}")]
    Image(String),

    /// The `tesseract` binary could not be run.
    #[error("TesseractNotFoundError: {0}")]
    TesseractNotFound(String),

    /// The PDF page renderer (`pdftoppm`) could not be run.
    #[error("Unable to get page count. Is poppler installed and in PATH? ({0} could not be run)")]
    RendererNotFound(String),

    /// The PDF page renderer ran but failed.
    #[error("PDF page rendering failed: {0}")]
    Render(String),

    /// Tesseract ran but failed.
    #[error("OCR processing failed: {0}")]
    Ocr(String),

    /// The extraction service endpoint is not a usable URL.
    #[error("Invalid extraction endpoint: {0}")]
    InvalidEndpoint(String),

    /// Task join error from spawn_blocking.
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl ExtractError {
    /// Status code reported for this error, mirroring the OCR service.
    pub fn status(&self) -> u16 {
        match self {
            ExtractError::UnsupportedType(_) => 400,
            ExtractError::EmptyContent(_) => 422,
            _ => 500,
        }
    }
}

impl From<ExtractError> for ExtractionFailure {
    fn from(e: ExtractError) -> Self {
        ExtractionFailure::with_status(e.to_string(), e.status())
    }
}

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;
