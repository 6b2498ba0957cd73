//! folio-notion - Notion export for folio.
//!
//! [`NotionExporter`] implements [`WorkspaceExporter`](folio_core::WorkspaceExporter):
//! each document becomes a child page of a configured parent page, titled
//! with the source file name and holding the cleaned text as paragraph
//! blocks.
//!
//! # Example
//!
//! ```ignore
//! use folio_core::{export_succeeded, FolioConfig};
//! use folio_notion::NotionExporter;
//!
//! let config = FolioConfig::from_env();
//! let exporter = NotionExporter::from_env(config.notion)?;
//! let report = export_succeeded(&session.summary(), &exporter).await?;
//! ```

pub mod blocks;
mod exporter;

pub use exporter::{NotionExporter, API_KEY_ENV};
