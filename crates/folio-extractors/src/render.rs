//! PDF page rasterization with poppler's `pdftoppm`.
//!
//! Scanned PDFs carry no text layer; their pages are rendered to PNG and
//! handed to Tesseract one at a time.

use std::path::PathBuf;

use tokio::process::Command;

use crate::error::{ExtractError, ExtractResult};

/// Renders every page of a PDF to PNG bytes.
#[derive(Debug, Clone)]
pub struct PageRenderer {
    program: String,
    dpi: u32,
}

impl PageRenderer {
    pub const DEFAULT_DPI: u32 = 200;

    pub fn new() -> Self {
        Self {
            program: "pdftoppm".to_string(),
            dpi: Self::DEFAULT_DPI,
        }
    }

    /// Use another `pdftoppm`-compatible binary.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    /// Render `pdf` and return one PNG per page, in page order.
    pub async fn render(&self, pdf: &[u8]) -> ExtractResult<Vec<Vec<u8>>> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("input.pdf");
        tokio::fs::write(&input, pdf).await?;

        let output = Command::new(&self.program)
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg("-png")
            .arg(&input)
            .arg(dir.path().join("page"))
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => ExtractError::RendererNotFound(self.program.clone()),
                _ => ExtractError::Io(e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ExtractError::Render(if stderr.is_empty() {
                format!("{} exited with {}", self.program, output.status)
            } else {
                stderr
            }));
        }

        // pdftoppm zero-pads page numbers, so name order is page order.
        let mut paths: Vec<PathBuf> = Vec::new();
        let mut entries = tokio::fs::read_dir(dir.path()).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_page = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("page") && n.ends_with(".png"));
            if is_page {
                paths.push(path);
            }
        }
        paths.sort();

        let mut pages = Vec::with_capacity(paths.len());
        for path in paths {
            pages.push(tokio::fs::read(path).await?);
        }
        tracing::debug!(pages = pages.len(), dpi = self.dpi, "Rendered PDF pages");
        Ok(pages)
    }
}

impl Default for PageRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Join per-page OCR text with `--- Page N ---` markers. Blank pages are
/// skipped; `pages` holds one-based page numbers.
pub(crate) fn join_pages(pages: &[(usize, String)]) -> String {
    pages
        .iter()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(number, text)| format!("--- Page {} ---\n{}", number, text.trim_end()))
        .collect::<Vec<_>>()
        .join("\n\n")
}
