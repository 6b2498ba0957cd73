//! Integration tests for the OCR HTTP client against a mock server.

use std::time::Duration;

use folio_core::{ErrorClass, ErrorClassifier, ExtractionService, FileHandle};
use folio_extractors::HttpExtractionService;
use serde_json::json;
use wiremock::matchers::{header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn pdf() -> FileHandle {
    FileHandle::from_bytes("lecture.pdf", "application/pdf", b"%PDF-1.4 test".to_vec())
}

fn service(server: &MockServer) -> HttpExtractionService {
    HttpExtractionService::new(&server.uri(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_success_response_is_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/process"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "PDF processed successfully",
            "filename": "lecture.pdf",
            "raw_text": "--- Page 1 ---\nHello  world",
            "cleaned_text": "--- Page 1 ---\nHello world",
            "raw_text_length": 27,
            "cleaned_text_length": 26,
            "has_text": true,
            "cleanup_stats": {
                "original_length": 27,
                "cleaned_length": 26,
                "characters_removed": 1,
                "original_lines": 2,
                "cleaned_lines": 2,
                "paragraphs_created": 1
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let output = service(&server).submit(&pdf()).await.unwrap();
    assert_eq!(output.filename, "lecture.pdf");
    assert_eq!(output.cleaned_text, "--- Page 1 ---\nHello world");
    assert_eq!(output.cleanup_stats.characters_removed, 1);
}

#[tokio::test]
async fn test_missing_tesseract_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/process"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "detail": "Tesseract OCR not installed. Please install Tesseract OCR and restart the server."
        })))
        .mount(&server)
        .await;

    let failure = service(&server).submit(&pdf()).await.unwrap_err();
    assert_eq!(failure.status, Some(503));
    assert!(!failure.retriable);

    let error = ErrorClassifier::new().classify(&failure);
    assert_eq!(error.class, ErrorClass::DependencyMissing);
}

#[tokio::test]
async fn test_processing_failure_is_unknown() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/process"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "detail": "Processing failed: broken xref"
        })))
        .mount(&server)
        .await;

    let failure = service(&server).submit(&pdf()).await.unwrap_err();
    assert_eq!(failure.message, "Processing failed: broken xref");
    assert_eq!(ErrorClassifier::new().classify(&failure).class, ErrorClass::Unknown);
}

#[tokio::test]
async fn test_validation_detail_array_is_stringified() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/process"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "detail": [{"loc": ["body", "file"], "msg": "field required"}]
        })))
        .mount(&server)
        .await;

    let failure = service(&server).submit(&pdf()).await.unwrap_err();
    assert_eq!(failure.status, Some(422));
    assert!(failure.message.contains("field required"));
}

#[tokio::test]
async fn test_plain_text_error_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let failure = service(&server).submit(&pdf()).await.unwrap_err();
    assert_eq!(failure.message, "Bad Gateway");
    assert_eq!(ErrorClassifier::new().classify(&failure).class, ErrorClass::Transient);
}

#[tokio::test]
async fn test_unreachable_service_is_transient() {
    // Nothing listens on the discard port.
    let service = HttpExtractionService::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();

    let failure = service.submit(&pdf()).await.unwrap_err();
    assert!(failure.retriable);
    assert_eq!(ErrorClassifier::new().classify(&failure).class, ErrorClass::Transient);
}
