//! Client for the OCR HTTP service.
//!
//! The service accepts one file per request as multipart form field `file`
//! on `POST /api/process` and answers with the extracted and cleaned text.
//! Errors come back as `{"detail": ...}` with a non-2xx status.

use std::time::Duration;

use async_trait::async_trait;
use folio_core::{ExtractionFailure, ExtractionOutput, ExtractionService, FileHandle};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::{ExtractError, ExtractResult};

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// Extraction service backed by the OCR HTTP API.
#[derive(Debug, Clone)]
pub struct HttpExtractionService {
    client: Client,
    process_url: Url,
}

impl HttpExtractionService {
    /// Create a client for the service at `endpoint` (base URL, without
    /// `/api/process`).
    pub fn new(endpoint: &str, timeout: Duration) -> ExtractResult<Self> {
        let process_url = Url::parse(&format!("{}/api/process", endpoint.trim_end_matches('/')))
            .map_err(|e| ExtractError::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;
        if !matches!(process_url.scheme(), "http" | "https") {
            return Err(ExtractError::InvalidEndpoint(endpoint.to_string()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ExtractError::InvalidEndpoint(e.to_string()))?;

        Ok(Self {
            client,
            process_url,
        })
    }

    pub fn process_url(&self) -> &Url {
        &self.process_url
    }
}

#[async_trait]
impl ExtractionService for HttpExtractionService {
    async fn submit(&self, file: &FileHandle) -> Result<ExtractionOutput, ExtractionFailure> {
        let bytes = file.read_bytes().await.map_err(ExtractError::from)?;

        let part = Part::bytes(bytes)
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)
            .map_err(|e| {
                ExtractionFailure::new(format!("Invalid content type '{}': {}", file.mime_type, e))
            })?;
        let form = Form::new().part("file", part);

        tracing::debug!(
            url = %self.process_url,
            file = %file.name,
            "Posting file to OCR service"
        );
        let response = self
            .client
            .post(self.process_url.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                ExtractionFailure::transport(format!("Could not reach OCR service: {}", e))
            })?;

        let status = response.status();
        if status.is_success() {
            return response.json::<ExtractionOutput>().await.map_err(|e| {
                ExtractionFailure::with_status(
                    format!("Invalid response from OCR service: {}", e),
                    status.as_u16(),
                )
            });
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(ErrorBody {
                detail: serde_json::Value::String(detail),
            }) => detail,
            Ok(ErrorBody { detail }) => detail.to_string(),
            Err(_) if !body.trim().is_empty() => body,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string(),
        };

        Err(ExtractionFailure::with_status(message, status.as_u16()))
    }
}
