//! Input file handles.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::error::{FolioError, FolioResult};

/// Where the bytes of a selected file live.
#[derive(Debug, Clone)]
pub enum FileSource {
    /// Content on the local filesystem.
    Path(PathBuf),
    /// Content already held in memory.
    Bytes(Arc<[u8]>),
}

/// A user-selected file.
///
/// Owned by the caller and shared into a batch as `Arc<FileHandle>`;
/// the pipeline only reads it.
#[derive(Debug, Clone, Serialize)]
pub struct FileHandle {
    /// Display name (usually the file name without directories).
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// MIME type passed through to the extraction capability.
    pub mime_type: String,
    /// Content location.
    #[serde(skip)]
    pub source: FileSource,
}

impl FileHandle {
    /// Create a handle for a file on disk, guessing its MIME type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> FolioResult<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(FolioError::validation_with_suggestion(
                format!("'{}' is not a regular file", path.display()),
                "Select individual files; directories cannot be converted",
            ));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            name,
            size: metadata.len(),
            mime_type: guess_mime_type(path),
            source: FileSource::Path(path.to_path_buf()),
        })
    }

    /// Create a handle for in-memory content.
    pub fn from_bytes(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            mime_type: mime_type.into(),
            source: FileSource::Bytes(bytes),
        }
    }

    /// Load the file content.
    pub async fn read_bytes(&self) -> std::io::Result<Vec<u8>> {
        match &self.source {
            FileSource::Path(path) => tokio::fs::read(path).await,
            FileSource::Bytes(bytes) => Ok(bytes.to_vec()),
        }
    }

    /// Size rounded to whole kilobytes, as shown next to selected files.
    pub fn size_kb(&self) -> u64 {
        (self.size + 512) / 1024
    }
}

/// Guess a MIME type from a path's extension.
pub fn guess_mime_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("application/octet-stream")
        .to_string()
}
