//! In-process extraction service.

use async_trait::async_trait;
use folio_core::{ExtractionFailure, ExtractionOutput, ExtractionService, FileHandle};

use crate::cleanup::process_text;
use crate::error::ExtractError;
use crate::pipeline::ExtractionPipeline;

/// Runs extraction and cleanup inside the current process.
pub struct LocalExtractionService {
    pipeline: ExtractionPipeline,
}

impl LocalExtractionService {
    pub fn new(pipeline: ExtractionPipeline) -> Self {
        Self { pipeline }
    }

    /// Service over every extractor enabled at compile time.
    pub fn with_defaults() -> Self {
        Self::new(ExtractionPipeline::with_defaults())
    }
}

#[async_trait]
impl ExtractionService for LocalExtractionService {
    async fn submit(&self, file: &FileHandle) -> Result<ExtractionOutput, ExtractionFailure> {
        let bytes = file.read_bytes().await.map_err(ExtractError::from)?;
        let extracted = self.pipeline.extract(&bytes, &file.mime_type).await?;

        if !extracted.has_text() {
            return Err(ExtractError::EmptyContent(file.name.clone()).into());
        }

        tracing::debug!(
            file = %file.name,
            method = ?extracted.method,
            pages = ?extracted.page_count,
            "Extracted text locally"
        );
        Ok(process_text(file.name.clone(), extracted.text))
    }
}
