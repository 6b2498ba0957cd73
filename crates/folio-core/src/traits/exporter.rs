//! Export capability trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::ItemId;

/// Cleaned text of one succeeded item, ready to be written to a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub item_id: ItemId,
    /// Page title, the source file name.
    pub title: String,
    pub content: String,
}

/// Reference to the page an export created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportReceipt {
    pub page_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Errors returned by an export capability.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    /// Retrying later may succeed (rate limits, 5xx, network).
    #[error("Transient export error: {0}")]
    Transient(String),
    /// The request was rejected and will not succeed unchanged.
    #[error("Export rejected: {0}")]
    Permanent(String),
    /// The exporter is not set up (missing key, parent page).
    #[error("Export configuration error: {0}")]
    Config(String),
}

/// Writes extracted documents into an external workspace.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkspaceExporter: Send + Sync {
    /// Create one page for the document.
    async fn export(&self, document: &ExportDocument) -> Result<ExportReceipt, ExportError>;
}
