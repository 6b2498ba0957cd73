//! Integration tests for the Notion exporter against a mock API.

use folio_core::config::{NotionConfig, RetryPolicy};
use folio_core::{ExportDocument, ExportError, ItemId, WorkspaceExporter};
use folio_notion::NotionExporter;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn exporter(server: &MockServer) -> NotionExporter {
    let config = NotionConfig {
        base_url: format!("{}/v1", server.uri()),
        parent_page_id: Some("parent-page".to_string()),
        retry: RetryPolicy {
            max_retries: 2,
            initial_delay_ms: 1,
            max_delay_ms: 5,
            multiplier: 2.0,
        },
        ..NotionConfig::default()
    };
    NotionExporter::new(config, SecretString::new("secret_token".to_string())).unwrap()
}

fn document(content: &str) -> ExportDocument {
    ExportDocument {
        item_id: ItemId(0),
        title: "week1.pdf".to_string(),
        content: content.to_string(),
    }
}

fn page_created() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "object": "page",
        "id": "page-123",
        "url": "https://www.notion.so/page-123"
    }))
}

#[tokio::test]
async fn test_creates_child_page() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/pages"))
        .and(header("authorization", "Bearer secret_token"))
        .and(header("notion-version", "2022-06-28"))
        .and(body_partial_json(json!({
            "parent": { "page_id": "parent-page" },
            "properties": { "title": { "title": [{ "text": { "content": "week1.pdf" } }] } }
        })))
        .respond_with(page_created())
        .expect(1)
        .mount(&server)
        .await;

    let receipt = exporter(&server)
        .export(&document("Intro.\n\nDetails."))
        .await
        .unwrap();

    assert_eq!(receipt.page_id, "page-123");
    assert_eq!(receipt.url.as_deref(), Some("https://www.notion.so/page-123"));
}

#[tokio::test]
async fn test_rate_limit_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/pages"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "object": "error", "status": 429, "code": "rate_limited", "message": "slow down"
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/pages"))
        .respond_with(page_created())
        .expect(1)
        .mount(&server)
        .await;

    let receipt = exporter(&server).export(&document("text")).await.unwrap();
    assert_eq!(receipt.page_id, "page-123");
}

#[tokio::test]
async fn test_validation_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/pages"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "object": "error", "status": 400, "code": "validation_error", "message": "body failed validation"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let error = exporter(&server).export(&document("text")).await.unwrap_err();
    match error {
        ExportError::Permanent(msg) => assert!(msg.contains("validation_error")),
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn test_server_errors_give_up_after_retries() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/pages"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let error = exporter(&server).export(&document("text")).await.unwrap_err();
    assert!(matches!(error, ExportError::Transient(_)));
}

#[tokio::test]
async fn test_long_documents_are_appended_in_batches() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/pages"))
        .respond_with(page_created())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path_regex(r"^/v1/blocks/page-123/children$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .expect(2)
        .mount(&server)
        .await;

    // 250 paragraphs: 100 on create, then 100 and 50 appended.
    let content = (0..250)
        .map(|i| format!("Paragraph {}.", i))
        .collect::<Vec<_>>()
        .join("\n\n");

    exporter(&server).export(&document(&content)).await.unwrap();
}
