//! Traits for the external capabilities the pipeline calls into.

mod exporter;
mod extraction;

pub use exporter::{ExportDocument, ExportError, ExportReceipt, WorkspaceExporter};
pub use extraction::{ExtractionFailure, ExtractionService};

#[cfg(test)]
pub use exporter::MockWorkspaceExporter;
#[cfg(test)]
pub use extraction::MockExtractionService;
