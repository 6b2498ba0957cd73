//! Plain text passthrough.

use async_trait::async_trait;

use crate::error::ExtractResult;
use crate::types::{ExtractedText, ExtractionMethod};
use crate::Extractor;

/// Decodes text files as UTF-8, replacing invalid sequences.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Extractor for PlainTextExtractor {
    async fn extract(&self, content: &[u8]) -> ExtractResult<ExtractedText> {
        let text = String::from_utf8_lossy(content).into_owned();
        Ok(ExtractedText::new(text, ExtractionMethod::Plain))
    }

    fn supported_types(&self) -> &[&str] {
        &["text/plain", "text/markdown"]
    }

    fn name(&self) -> &str {
        "plain-text"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_decodes_lossy() {
        let result = PlainTextExtractor::new().extract(b"notes \xff here").await.unwrap();
        assert_eq!(result.text, "notes \u{fffd} here");
        assert_eq!(result.method, ExtractionMethod::Plain);
    }

    #[test]
    fn test_supports() {
        let extractor = PlainTextExtractor::new();
        assert!(extractor.supports("text/plain"));
        assert!(!extractor.supports("application/pdf"));
    }
}
