//! Notion workspace exporter.

use std::time::Duration;

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use folio_core::config::NotionConfig;
use folio_core::{ExportDocument, ExportError, ExportReceipt, WorkspaceExporter};
use reqwest::{Client, Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;

use crate::blocks::{self, MAX_BLOCK_CHARS, MAX_CHILDREN_PER_REQUEST};

/// Environment variable holding the integration token.
pub const API_KEY_ENV: &str = "NOTION_API_KEY";

#[derive(Debug, Deserialize)]
struct PageResponse {
    id: String,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Creates one Notion page per exported document under a parent page.
pub struct NotionExporter {
    client: Client,
    api_key: SecretString,
    parent_page_id: String,
    config: NotionConfig,
}

impl NotionExporter {
    /// Create an exporter. Fails if no parent page is configured.
    pub fn new(config: NotionConfig, api_key: SecretString) -> Result<Self, ExportError> {
        let parent_page_id = config
            .parent_page_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| {
                ExportError::Config(
                    "No Notion parent page configured (set NOTION_PARENT_PAGE_ID)".to_string(),
                )
            })?;
        if api_key.expose_secret().trim().is_empty() {
            return Err(ExportError::Config(format!("{} is empty", API_KEY_ENV)));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ExportError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            parent_page_id,
            config,
        })
    }

    /// Create an exporter with the API key from `NOTION_API_KEY`.
    pub fn from_env(config: NotionConfig) -> Result<Self, ExportError> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| ExportError::Config(format!("{} not set", API_KEY_ENV)))?;
        Self::new(config, SecretString::new(api_key))
    }

    pub fn parent_page_id(&self) -> &str {
        &self.parent_page_id
    }

    /// Send one request, retrying transient failures per the retry policy.
    async fn send(&self, method: Method, path: &str, body: &Value) -> Result<Value, ExportError> {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);

        let send_once = || async {
            let response = self
                .client
                .request(method.clone(), &url)
                .bearer_auth(self.api_key.expose_secret())
                .header("Notion-Version", &self.config.api_version)
                .json(body)
                .send()
                .await
                .map_err(|e| ExportError::Transient(format!("Network error: {}", e)))?;

            let status = response.status();
            if status.is_success() {
                return response
                    .json::<Value>()
                    .await
                    .map_err(|e| ExportError::Permanent(format!("Invalid Notion response: {}", e)));
            }

            let body = response.text().await.unwrap_or_default();
            Err(classify_status(status, &body))
        };

        let policy = &self.config.retry;
        send_once
            .retry(
                ExponentialBuilder::default()
                    .with_max_times(policy.max_retries as usize)
                    .with_min_delay(Duration::from_millis(policy.initial_delay_ms))
                    .with_max_delay(Duration::from_millis(policy.max_delay_ms))
                    .with_factor(policy.multiplier),
            )
            .when(|e| matches!(e, ExportError::Transient(_)))
            .notify(|err, dur| {
                tracing::warn!(
                    "Notion request to {} failed, retrying in {:?}: {}",
                    path,
                    dur,
                    err
                );
            })
            .await
    }
}

/// Map a non-2xx Notion response to an export error.
fn classify_status(status: StatusCode, body: &str) -> ExportError {
    let detail = match serde_json::from_str::<ErrorResponse>(body) {
        Ok(ErrorResponse {
            code: Some(code),
            message: Some(message),
        }) => format!("{} ({})", message, code),
        Ok(ErrorResponse {
            message: Some(message),
            ..
        }) => message,
        _ if !body.trim().is_empty() => body.trim().to_string(),
        _ => status.to_string(),
    };

    match status {
        StatusCode::TOO_MANY_REQUESTS => {
            ExportError::Transient(format!("Rate limited: {}", detail))
        }
        s if s.is_server_error() => {
            ExportError::Transient(format!("Server error {}: {}", s, detail))
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ExportError::Config(format!("Notion rejected the API key: {}", detail))
        }
        s => ExportError::Permanent(format!("Client error {}: {}", s, detail)),
    }
}

#[async_trait]
impl WorkspaceExporter for NotionExporter {
    async fn export(&self, document: &ExportDocument) -> Result<ExportReceipt, ExportError> {
        let children: Vec<Value> = blocks::chunk_text(&document.content, MAX_BLOCK_CHARS)
            .iter()
            .map(|chunk| blocks::paragraph(chunk))
            .collect();
        let mut batches = children.chunks(MAX_CHILDREN_PER_REQUEST);

        let first = batches.next().unwrap_or(&[]);
        let body = blocks::create_page(&self.parent_page_id, &document.title, first);
        let created = self.send(Method::POST, "pages", &body).await?;
        let page: PageResponse = serde_json::from_value(created)
            .map_err(|e| ExportError::Permanent(format!("Invalid Notion page response: {}", e)))?;

        for batch in batches {
            let path = format!("blocks/{}/children", page.id);
            self.send(Method::PATCH, &path, &blocks::append_children(batch))
                .await?;
        }

        tracing::debug!(
            title = %document.title,
            page_id = %page.id,
            blocks = children.len(),
            "Created Notion page"
        );
        Ok(ExportReceipt {
            page_id: page.id,
            url: page.url,
        })
    }
}
