//! folio-extractors - Text extraction backends for folio.
//!
//! Provides the [`ExtractionService`](folio_core::ExtractionService)
//! implementations the batch pipeline submits files to, plus the
//! trait-based extractors and text cleanup behind the in-process one.
//!
//! # Features
//!
//! - `pdf` (default) - PDF text-layer extraction via pdf-extract
//! - `image` - Image decoding
//! - `ocr` - Image OCR via tesseract (requires tesseract installed); with
//!   `pdf`, scanned PDFs are rendered with poppler's `pdftoppm` and OCRed
//!   page by page
//! - `full` - All extraction features
//!
//! # Example
//!
//! ```ignore
//! use folio_extractors::{ExtractionPipeline, HttpExtractionService, LocalExtractionService};
//!
//! // Talk to the OCR service
//! let remote = HttpExtractionService::new("http://localhost:8000", Duration::from_secs(300))?;
//!
//! // Or extract in-process with MIME type routing
//! let local = LocalExtractionService::new(ExtractionPipeline::with_defaults());
//! ```

pub mod cleanup;
mod error;
mod factory;
mod http;
mod local;
mod pipeline;
mod text;
mod types;

#[cfg(feature = "pdf")]
mod pdf;

#[cfg(feature = "ocr")]
mod ocr;

#[cfg(all(feature = "pdf", feature = "ocr"))]
mod render;

pub use cleanup::{clean_text, process_text};
pub use error::{ExtractError, ExtractResult};
pub use factory::ExtractorFactory;
pub use http::HttpExtractionService;
pub use local::LocalExtractionService;
pub use pipeline::ExtractionPipeline;
pub use text::PlainTextExtractor;
pub use types::{ExtractedText, ExtractionMethod};

#[cfg(feature = "pdf")]
pub use pdf::PdfExtractor;

#[cfg(feature = "ocr")]
pub use ocr::{OcrConfig, OcrExtractor};

#[cfg(all(feature = "pdf", feature = "ocr"))]
pub use render::PageRenderer;

use async_trait::async_trait;

/// Core Extractor trait - every in-process extractor implements this.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extract raw text from bytes.
    async fn extract(&self, content: &[u8]) -> ExtractResult<ExtractedText>;

    /// Supported MIME types for this extractor.
    fn supported_types(&self) -> &[&str];

    /// Check if this extractor handles the given MIME type.
    fn supports(&self, mime_type: &str) -> bool {
        self.supported_types().contains(&mime_type)
    }

    /// Human-readable name for this extractor.
    fn name(&self) -> &str;
}
