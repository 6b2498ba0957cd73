//! Configuration system for folio.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::classify::ClassifierConfig;
use crate::error::{FolioError, FolioResult};

/// Which extraction capability to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionBackend {
    /// The OCR HTTP service.
    #[default]
    Remote,
    /// In-process extraction.
    Local,
}

/// Extraction capability configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub backend: ExtractionBackend,
    /// Base URL of the OCR service (without `/api/process`).
    pub endpoint: String,
    /// HTTP request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            backend: ExtractionBackend::Remote,
            endpoint: "http://localhost:8000".to_string(),
            request_timeout_secs: 300,
        }
    }
}

/// Batch orchestration settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Per-item timeout in seconds. `None` waits indefinitely.
    pub item_timeout_secs: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            item_timeout_secs: Some(120),
        }
    }
}

impl PipelineConfig {
    pub fn item_timeout(&self) -> Option<Duration> {
        self.item_timeout_secs.map(Duration::from_secs)
    }
}

/// Retry policy for transient export failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Initial delay before first retry (milliseconds)
    pub initial_delay_ms: u64,
    /// Maximum delay between retries (milliseconds)
    pub max_delay_ms: u64,
    /// Multiplier for exponential backoff
    pub multiplier: f32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 500,
            max_delay_ms: 10_000,
            multiplier: 2.0_f32,
        }
    }
}

/// Notion export configuration. The API key is read from `NOTION_API_KEY`
/// and never stored in configuration files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotionConfig {
    pub base_url: String,
    pub api_version: String,
    /// Page under which exported notes are created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_page_id: Option<String>,
    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,
    pub retry: RetryPolicy,
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.notion.com/v1".to_string(),
            api_version: "2022-06-28".to_string(),
            parent_page_id: None,
            timeout_secs: 30,
            retry: RetryPolicy::default(),
        }
    }
}

/// Main folio configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FolioConfig {
    pub extraction: ExtractionConfig,
    pub pipeline: PipelineConfig,
    pub classifier: ClassifierConfig,
    pub notion: NotionConfig,
}

impl FolioConfig {
    /// Default config file location (`~/.config/folio/config.toml`).
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("folio"))
            .unwrap_or_else(|| PathBuf::from(".folio"))
            .join("config.toml")
    }

    /// Load configuration from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<Path>) -> FolioResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let ext = path.as_ref().extension().and_then(|e| e.to_str());

        match ext {
            Some("toml") => {
                toml::from_str(&content).map_err(|e| FolioError::Configuration(e.to_string()))
            }
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| FolioError::Configuration(e.to_string())),
            Some("yaml" | "yml") => serde_yaml::from_str(&content)
                .map_err(|e| FolioError::Configuration(e.to_string())),
            _ => Err(FolioError::Configuration(
                "Unsupported config file format. Use .toml, .json, or .yaml".to_string(),
            )),
        }
    }

    /// Load configuration from environment variables over the defaults.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply environment variable overrides.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(backend) = std::env::var("FOLIO_EXTRACTION_BACKEND") {
            self.extraction.backend = match backend.to_lowercase().as_str() {
                "local" => ExtractionBackend::Local,
                _ => ExtractionBackend::Remote,
            };
        }
        if let Ok(endpoint) = std::env::var("FOLIO_EXTRACTION_ENDPOINT") {
            self.extraction.endpoint = endpoint;
        }
        if let Ok(secs) = std::env::var("FOLIO_ITEM_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(0) => self.pipeline.item_timeout_secs = None,
                Ok(n) => self.pipeline.item_timeout_secs = Some(n),
                Err(_) => tracing::warn!(value = %secs, "Ignoring invalid FOLIO_ITEM_TIMEOUT_SECS"),
            }
        }
        if let Ok(page) = std::env::var("NOTION_PARENT_PAGE_ID") {
            self.notion.parent_page_id = Some(page);
        }
        if let Ok(url) = std::env::var("NOTION_BASE_URL") {
            self.notion.base_url = url;
        }

        self
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> FolioResult<()> {
        url_like(&self.extraction.endpoint, "extraction.endpoint")?;
        url_like(&self.notion.base_url, "notion.base_url")?;
        if self.pipeline.item_timeout_secs == Some(0) {
            return Err(FolioError::Configuration(
                "pipeline.item_timeout_secs must be positive; omit it to disable the timeout"
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// Build configuration using builder pattern.
    pub fn builder() -> FolioConfigBuilder {
        FolioConfigBuilder::default()
    }
}

fn url_like(value: &str, field: &str) -> FolioResult<()> {
    match url::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        _ => Err(FolioError::Configuration(format!(
            "{} must be an http(s) URL, got '{}'",
            field, value
        ))),
    }
}

/// Builder for FolioConfig.
#[derive(Default)]
pub struct FolioConfigBuilder {
    config: FolioConfig,
}

impl FolioConfigBuilder {
    /// Set the extraction backend.
    pub fn backend(mut self, backend: ExtractionBackend) -> Self {
        self.config.extraction.backend = backend;
        self
    }

    /// Set the OCR service endpoint.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.extraction.endpoint = endpoint.into();
        self
    }

    /// Set the per-item timeout.
    pub fn item_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.pipeline.item_timeout_secs = timeout.map(|t| t.as_secs().max(1));
        self
    }

    /// Set classifier rules.
    pub fn classifier(mut self, classifier: ClassifierConfig) -> Self {
        self.config.classifier = classifier;
        self
    }

    /// Set the Notion parent page.
    pub fn notion_parent(mut self, page_id: impl Into<String>) -> Self {
        self.config.notion.parent_page_id = Some(page_id.into());
        self
    }

    /// Build the configuration.
    pub fn build(self) -> FolioConfig {
        self.config
    }
}
