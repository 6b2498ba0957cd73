//! Routes file bytes to the extractor registered for their MIME type.

use std::sync::Arc;

use crate::error::{ExtractError, ExtractResult};
use crate::types::ExtractedText;
use crate::Extractor;

/// Ordered set of extractors. The first one that accepts a type handles it.
pub struct ExtractionPipeline {
    extractors: Vec<Arc<dyn Extractor>>,
}

impl ExtractionPipeline {
    /// Pipeline with no extractors; every type is unsupported.
    pub fn new() -> Self {
        Self {
            extractors: Vec::new(),
        }
    }

    /// Pipeline over every extractor enabled at compile time.
    pub fn with_defaults() -> Self {
        Self {
            extractors: crate::ExtractorFactory::all(),
        }
    }

    pub fn add_extractor(mut self, extractor: Arc<dyn Extractor>) -> Self {
        self.extractors.push(extractor);
        self
    }

    /// Extract text from `content` declared as `mime_type`.
    ///
    /// Parameters such as `; charset=utf-8` and letter case are ignored when
    /// picking the extractor.
    pub async fn extract(&self, content: &[u8], mime_type: &str) -> ExtractResult<ExtractedText> {
        let essence = essence(mime_type);
        let extractor = self
            .extractors
            .iter()
            .find(|e| e.supports(&essence))
            .ok_or_else(|| ExtractError::UnsupportedType(mime_type.to_string()))?;

        tracing::debug!(
            extractor = extractor.name(),
            mime_type = %essence,
            bytes = content.len(),
            "Routing file to extractor"
        );
        extractor.extract(content).await
    }
}

impl Default for ExtractionPipeline {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn essence(mime_type: &str) -> String {
    mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}
