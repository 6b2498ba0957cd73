//! folio - convert a batch of scanned documents and images to text.
//!
//! # Usage
//!
//! ```text
//! folio process scans/*.pdf notes.png
//! folio process --local --timeout 60 page1.png page2.png
//! folio process --export week1.pdf       # also create Notion pages
//! folio config                           # print the effective configuration
//! ```
//!
//! # Configuration
//!
//! Read from `--config`, or `~/.config/folio/config.toml` when present,
//! then overridden by environment variables (a `.env` file is loaded first):
//!
//! - `FOLIO_EXTRACTION_BACKEND` - `remote` (default) or `local`
//! - `FOLIO_EXTRACTION_ENDPOINT` - OCR service base URL
//! - `FOLIO_ITEM_TIMEOUT_SECS` - per-file timeout, `0` disables it
//! - `NOTION_API_KEY`, `NOTION_PARENT_PAGE_ID` - required for `--export`
//!
//! Ctrl-C abandons the running batch.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use folio_core::{
    export_succeeded, BatchOrchestrator, BatchSession, ErrorClassifier, ExtractionBackend,
    FileHandle, FolioConfig, OrchestratorConfig,
};
use folio_extractors::ExtractorFactory;
use folio_notion::NotionExporter;
use futures::StreamExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod report;

#[derive(Debug, Parser)]
#[command(name = "folio", version, about = "Batch document-to-text conversion")]
struct Cli {
    /// Configuration file (.toml, .json or .yaml)
    #[arg(short, long, global = true, env = "FOLIO_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert files to text, one at a time in the given order
    Process {
        /// Files to convert
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Extract in-process instead of calling the OCR service
        #[arg(long)]
        local: bool,

        /// Per-file timeout in seconds (0 disables it)
        #[arg(long)]
        timeout: Option<u64>,

        /// Export the converted documents to Notion
        #[arg(long)]
        export: bool,

        /// Print the summary as JSON on stdout
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration as JSON
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout carries the report.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let result = run(cli).await;
    if let Some(hint) = result.as_ref().err().and_then(report::error_hint) {
        eprintln!("{}", hint);
    }
    result
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Process {
            files,
            local,
            timeout,
            export,
            json,
        } => {
            let mut config = config;
            if local {
                config.extraction.backend = ExtractionBackend::Local;
            }
            if let Some(secs) = timeout {
                config.pipeline.item_timeout_secs = (secs > 0).then_some(secs);
            }
            process(config, files, export, json).await
        }
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<FolioConfig> {
    let config = match path {
        Some(path) => FolioConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?
            .with_env_overrides(),
        None => {
            let default_path = FolioConfig::default_path();
            if default_path.exists() {
                tracing::debug!(path = %default_path.display(), "Loading config");
                FolioConfig::from_file(&default_path)?.with_env_overrides()
            } else {
                FolioConfig::from_env()
            }
        }
    };
    config.validate()?;
    Ok(config)
}

async fn process(
    config: FolioConfig,
    paths: Vec<PathBuf>,
    export: bool,
    json: bool,
) -> Result<()> {
    // Fail before converting anything if export cannot work.
    let exporter = if export {
        Some(NotionExporter::from_env(config.notion.clone())?)
    } else {
        None
    };

    let mut files = Vec::with_capacity(paths.len());
    for path in &paths {
        let file = FileHandle::from_path(path)
            .await
            .with_context(|| format!("Cannot read {}", path.display()))?;
        files.push(Arc::new(file));
    }

    let service = ExtractorFactory::service(&config.extraction)?;
    tracing::info!(
        backend = ?config.extraction.backend,
        files = files.len(),
        "Starting batch"
    );
    let orchestrator = BatchOrchestrator::new(
        service,
        ErrorClassifier::with_config(&config.classifier),
        OrchestratorConfig::from(&config.pipeline),
    );
    let mut session = BatchSession::new(orchestrator);
    let mut run = session.start_batch(files)?;

    let interrupted = loop {
        tokio::select! {
            event = run.next() => match event {
                Some(progress) => {
                    if let Some(line) = report::progress_line(&progress) {
                        eprintln!("{}", line);
                    }
                }
                None => break false,
            },
            _ = tokio::signal::ctrl_c() => break true,
        }
    };

    let summary = session.summary();
    if interrupted {
        session.reset_batch();
        eprintln!("Interrupted; batch abandoned.");
        if !summary.is_empty() {
            eprint!("{}", report::summary_text(&summary));
        }
        std::process::exit(130);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", report::summary_text(&summary));
    }

    if let Some(exporter) = exporter {
        if summary.succeeded.is_empty() {
            eprintln!("Nothing to export.");
        } else {
            let report = export_succeeded(&summary, &exporter).await?;
            eprint!("{}", report::export_text(&report));
        }
    }

    if summary.failed.is_empty() {
        Ok(())
    } else {
        std::process::exit(1);
    }
}
