//! Image OCR via Tesseract.

use async_trait::async_trait;

use crate::error::{ExtractError, ExtractResult};
use crate::types::{ExtractedText, ExtractionMethod};
use crate::Extractor;

/// Tesseract settings.
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Tesseract language code(s), e.g. `eng` or `eng+deu`.
    pub lang: String,
    /// Rendering resolution hint passed to Tesseract.
    pub dpi: Option<i32>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            lang: "eng".to_string(),
            dpi: Some(150),
        }
    }
}

/// Extracts text from scanned images with Tesseract.
///
/// Requires the `tesseract` binary on `PATH`. When it is missing the error
/// message carries the `TesseractNotFoundError` signature.
#[derive(Debug, Clone, Default)]
pub struct OcrExtractor {
    config: OcrConfig,
}

impl OcrExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: OcrConfig) -> Self {
        Self { config }
    }

    /// Detect image format from bytes.
    fn detect_format(content: &[u8]) -> ExtractResult<&'static str> {
        if content.len() < 8 {
            return Err(ExtractError::Image("Content too short".to_string()));
        }

        if content.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            Ok("png")
        } else if content.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Ok("jpeg")
        } else if content.starts_with(b"GIF87a") || content.starts_with(b"GIF89a") {
            Ok("gif")
        } else if content.starts_with(b"RIFF") && content.len() > 12 && &content[8..12] == b"WEBP" {
            Ok("webp")
        } else {
            Err(ExtractError::Image("Unknown image format".to_string()))
        }
    }
}

#[async_trait]
impl Extractor for OcrExtractor {
    async fn extract(&self, content: &[u8]) -> ExtractResult<ExtractedText> {
        use rusty_tesseract::{Args, Image};

        let format = Self::detect_format(content)?;
        let content = content.to_vec();
        let args = Args {
            lang: self.config.lang.clone(),
            dpi: self.config.dpi,
            ..Args::default()
        };

        // Run Tesseract in blocking task to avoid blocking async runtime
        let text = tokio::task::spawn_blocking(move || {
            let img = image::load_from_memory(&content)
                .map_err(|e| ExtractError::Image(e.to_string()))?;

            // Convert to grayscale format Tesseract expects
            let gray = image::DynamicImage::ImageLuma8(img.to_luma8());
            let tesseract_image =
                Image::from_dynamic_image(&gray).map_err(|e| ExtractError::Image(e.to_string()))?;

            rusty_tesseract::image_to_string(&tesseract_image, &args).map_err(tess_error)
        })
        .await??;

        tracing::debug!(format, chars = text.len(), "OCR finished");
        Ok(ExtractedText::new(text, ExtractionMethod::Ocr).with_page_count(1))
    }

    fn supported_types(&self) -> &[&str] {
        &["image/png", "image/jpeg", "image/gif", "image/webp"]
    }

    fn name(&self) -> &str {
        "tesseract"
    }
}

/// A missing binary keeps the `TesseractNotFoundError` signature.
fn tess_error(e: rusty_tesseract::TessError) -> ExtractError {
    match e {
        rusty_tesseract::TessError::TesseractNotFoundError => {
            ExtractError::TesseractNotFound(e.to_string())
        }
        other => ExtractError::Ocr(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection_png() {
        let png = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(OcrExtractor::detect_format(&png).unwrap(), "png");
    }

    #[test]
    fn test_format_detection_jpeg() {
        let jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46];
        assert_eq!(OcrExtractor::detect_format(&jpeg).unwrap(), "jpeg");
    }

    #[test]
    fn test_format_detection_webp() {
        let mut webp = Vec::new();
        webp.extend_from_slice(b"RIFF");
        webp.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
        webp.extend_from_slice(b"WEBP");
        webp.extend_from_slice(&[0x00]);
        assert_eq!(OcrExtractor::detect_format(&webp).unwrap(), "webp");
    }

    #[test]
    fn test_format_detection_rejects_unknown_and_short() {
        assert!(OcrExtractor::detect_format(&[0u8; 8]).is_err());
        assert!(OcrExtractor::detect_format(&[0x89, 0x50]).is_err());
    }

    #[tokio::test]
    async fn test_unknown_bytes_fail_before_tesseract() {
        let result = OcrExtractor::new().extract(b"definitely not an image").await;
        assert!(matches!(result, Err(ExtractError::Image(_))));
    }

    #[test]
    fn test_missing_tesseract_is_dependency_missing() {
        use folio_core::{ErrorClass, ErrorClassifier, ExtractionFailure};

        let error = tess_error(rusty_tesseract::TessError::TesseractNotFoundError);
        assert!(matches!(error, ExtractError::TesseractNotFound(_)));
        assert!(error.to_string().starts_with("TesseractNotFoundError"));

        let classified = ErrorClassifier::new().classify(&ExtractionFailure::from(error));
        assert_eq!(classified.class, ErrorClass::DependencyMissing);
    }

    #[test]
    fn test_supports() {
        let extractor = OcrExtractor::new();
        assert!(extractor.supports("image/png"));
        assert!(!extractor.supports("application/pdf"));
        assert_eq!(extractor.name(), "tesseract");
    }
}
