//! PDF extraction: the text layer via pdf-extract, with an OCR fallback for
//! scanned documents when the `ocr` feature is enabled.

use async_trait::async_trait;

use crate::error::{ExtractError, ExtractResult};
use crate::types::{ExtractedText, ExtractionMethod};
use crate::Extractor;

#[cfg(feature = "ocr")]
use crate::ocr::{OcrConfig, OcrExtractor};
#[cfg(feature = "ocr")]
use crate::render::{join_pages, PageRenderer};

/// PDF content extractor.
///
/// Reads the embedded text layer first. A PDF without one (a scan) is
/// rendered page by page and OCRed when built with `ocr`; otherwise it
/// yields empty text and the caller reports it as unreadable.
#[derive(Debug, Clone)]
pub struct PdfExtractor {
    /// Text shorter than this (after trimming) counts as no text.
    min_text_length: usize,
    #[cfg(feature = "ocr")]
    scan: Option<ScanFallback>,
}

#[cfg(feature = "ocr")]
#[derive(Debug, Clone)]
struct ScanFallback {
    renderer: PageRenderer,
    ocr: OcrExtractor,
}

impl PdfExtractor {
    /// Create new PDF extractor with default settings.
    pub fn new() -> Self {
        Self {
            min_text_length: 1,
            #[cfg(feature = "ocr")]
            scan: Some(ScanFallback::new(PageRenderer::new())),
        }
    }

    /// Create PDF extractor with custom minimum text threshold.
    pub fn with_min_text_length(min_text_length: usize) -> Self {
        Self {
            min_text_length,
            ..Self::new()
        }
    }

    /// Render scanned pages with `renderer` instead of the default `pdftoppm`.
    #[cfg(feature = "ocr")]
    pub fn with_renderer(mut self, renderer: PageRenderer) -> Self {
        self.scan = Some(ScanFallback::new(renderer));
        self
    }

    /// Read the text layer only.
    #[cfg(feature = "ocr")]
    pub fn without_ocr(mut self) -> Self {
        self.scan = None;
        self
    }

    async fn text_layer(&self, content: &[u8]) -> ExtractResult<String> {
        let bytes = content.to_vec();
        // pdf-extract is synchronous and CPU bound
        tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
            .await?
            .map_err(|e| ExtractError::Pdf(e.to_string()))
    }

    #[cfg(feature = "ocr")]
    async fn scanned(&self, content: &[u8]) -> ExtractResult<Option<ExtractedText>> {
        match &self.scan {
            Some(scan) => scan.extract(content).await.map(Some),
            None => Ok(None),
        }
    }

    #[cfg(not(feature = "ocr"))]
    async fn scanned(&self, _content: &[u8]) -> ExtractResult<Option<ExtractedText>> {
        Ok(None)
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "ocr")]
impl ScanFallback {
    fn new(renderer: PageRenderer) -> Self {
        let ocr = OcrExtractor::with_config(OcrConfig {
            dpi: Some(renderer.dpi() as i32),
            ..OcrConfig::default()
        });
        Self { renderer, ocr }
    }

    /// OCR every rendered page. A page that fails is skipped, except when
    /// Tesseract itself is missing.
    async fn extract(&self, content: &[u8]) -> ExtractResult<ExtractedText> {
        let images = self.renderer.render(content).await?;
        let page_count = images.len();

        let mut pages = Vec::with_capacity(page_count);
        for (index, image) in images.iter().enumerate() {
            match self.ocr.extract(image).await {
                Ok(page) => pages.push((index + 1, page.text)),
                Err(e @ ExtractError::TesseractNotFound(_)) => return Err(e),
                Err(e) => tracing::warn!(page = index + 1, error = %e, "Skipping page"),
            }
        }

        let text = join_pages(&pages);
        Ok(ExtractedText::new(text, ExtractionMethod::Ocr).with_page_count(page_count))
    }
}

#[async_trait]
impl Extractor for PdfExtractor {
    async fn extract(&self, content: &[u8]) -> ExtractResult<ExtractedText> {
        if !content.starts_with(b"%PDF") {
            return Err(ExtractError::Pdf("missing %PDF header".to_string()));
        }

        let text = self.text_layer(content).await?;
        if text.trim().chars().count() >= self.min_text_length {
            // pdf-extract separates pages with form feeds
            let pages = text.matches('\x0c').count() + 1;
            return Ok(
                ExtractedText::new(text.replace('\x0c', "\n\n"), ExtractionMethod::TextLayer)
                    .with_page_count(pages),
            );
        }

        tracing::debug!(chars = text.trim().len(), "PDF has no usable text layer");
        match self.scanned(content).await? {
            Some(scanned) => Ok(scanned),
            None => Ok(ExtractedText::new(String::new(), ExtractionMethod::TextLayer)),
        }
    }

    fn supported_types(&self) -> &[&str] {
        &["application/pdf"]
    }

    fn name(&self) -> &str {
        "pdf-extract"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_non_pdf() {
        let result = PdfExtractor::new().extract(b"not a pdf").await;
        assert!(matches!(result, Err(ExtractError::Pdf(_))));
    }

    #[tokio::test]
    async fn test_corrupt_pdf_is_error() {
        let result = PdfExtractor::new().extract(b"%PDF-1.4\ngarbage").await;
        assert!(result.is_err());
    }

    #[cfg(feature = "ocr")]
    #[tokio::test]
    async fn test_scan_fallback_needs_poppler() {
        let extractor = PdfExtractor::new()
            .with_renderer(PageRenderer::new().with_program("folio-test-no-such-pdftoppm"));
        let result = extractor.scanned(b"%PDF-1.4").await;
        assert!(matches!(result, Err(ExtractError::RendererNotFound(_))));

        let text_only = PdfExtractor::new().without_ocr();
        assert!(text_only.scanned(b"%PDF-1.4").await.unwrap().is_none());
    }

    #[test]
    fn test_supports() {
        let extractor = PdfExtractor::with_min_text_length(10);
        assert!(extractor.supports("application/pdf"));
        assert_eq!(extractor.name(), "pdf-extract");
    }
}
