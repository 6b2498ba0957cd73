//! Factory for creating extractors and extraction services.

use std::sync::Arc;
use std::time::Duration;

use folio_core::config::{ExtractionBackend, ExtractionConfig};
use folio_core::ExtractionService;

use crate::error::{ExtractError, ExtractResult};
use crate::{Extractor, HttpExtractionService, LocalExtractionService, PlainTextExtractor};

#[cfg(feature = "pdf")]
use crate::PdfExtractor;

#[cfg(feature = "ocr")]
use crate::OcrExtractor;

/// Factory for creating content extractors.
pub struct ExtractorFactory;

impl ExtractorFactory {
    /// Create a plain text extractor.
    pub fn text() -> Arc<dyn Extractor> {
        Arc::new(PlainTextExtractor::new())
    }

    /// Create a PDF extractor.
    #[cfg(feature = "pdf")]
    pub fn pdf() -> Arc<dyn Extractor> {
        Arc::new(PdfExtractor::new())
    }

    /// Create an OCR extractor.
    #[cfg(feature = "ocr")]
    pub fn ocr() -> Arc<dyn Extractor> {
        Arc::new(OcrExtractor::new())
    }

    /// Create extractor for a given MIME type.
    pub fn for_mime_type(mime_type: &str) -> ExtractResult<Arc<dyn Extractor>> {
        match mime_type {
            "text/plain" | "text/markdown" => Ok(Self::text()),

            #[cfg(feature = "pdf")]
            "application/pdf" => Ok(Self::pdf()),

            #[cfg(feature = "ocr")]
            "image/png" | "image/jpeg" | "image/gif" | "image/webp" => Ok(Self::ocr()),

            _ => Err(ExtractError::UnsupportedType(mime_type.to_string())),
        }
    }

    /// Get all available extractors.
    #[allow(clippy::vec_init_then_push)]
    pub fn all() -> Vec<Arc<dyn Extractor>> {
        let mut extractors: Vec<Arc<dyn Extractor>> = Vec::new();

        extractors.push(Self::text());

        #[cfg(feature = "pdf")]
        extractors.push(Self::pdf());

        #[cfg(feature = "ocr")]
        extractors.push(Self::ocr());

        extractors
    }

    /// Create the extraction service selected by configuration.
    pub fn service(config: &ExtractionConfig) -> ExtractResult<Arc<dyn ExtractionService>> {
        match config.backend {
            ExtractionBackend::Local => Ok(Arc::new(LocalExtractionService::with_defaults())),
            ExtractionBackend::Remote => Ok(Arc::new(HttpExtractionService::new(
                &config.endpoint,
                Duration::from_secs(config.request_timeout_secs),
            )?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_all_extractors() {
        let extractors = ExtractorFactory::all();

        #[cfg(all(feature = "pdf", not(feature = "ocr")))]
        assert_eq!(extractors.len(), 2);

        #[cfg(all(feature = "pdf", feature = "ocr"))]
        assert_eq!(extractors.len(), 3);

        #[cfg(all(not(feature = "pdf"), not(feature = "ocr")))]
        assert_eq!(extractors.len(), 1);
    }

    #[test]
    fn test_factory_for_mime_type() {
        assert!(ExtractorFactory::for_mime_type("text/plain").is_ok());
        assert!(matches!(
            ExtractorFactory::for_mime_type("video/mp4"),
            Err(ExtractError::UnsupportedType(_))
        ));

        #[cfg(feature = "pdf")]
        assert!(ExtractorFactory::for_mime_type("application/pdf").is_ok());
    }

    #[test]
    fn test_service_from_config() {
        let remote = ExtractionConfig::default();
        assert!(ExtractorFactory::service(&remote).is_ok());

        let local = ExtractionConfig {
            backend: ExtractionBackend::Local,
            ..ExtractionConfig::default()
        };
        assert!(ExtractorFactory::service(&local).is_ok());

        let broken = ExtractionConfig {
            endpoint: "not a url".to_string(),
            ..ExtractionConfig::default()
        };
        assert!(ExtractorFactory::service(&broken).is_err());
    }
}
