//! Chat-completions client against a mock HTTP server

use crate::common::{RecordFactory, fast_retry};
use batch_classifier::config::ServiceConfig;
use batch_classifier::core::classifier::{
    ChatCompletionClient, ClassificationRequest, ClassificationService, RecordClassifier,
};
use batch_classifier::core::types::ItemPosition;
use batch_classifier::{ClassifierError, ItemOutcome, RecordType};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ChatCompletionClient {
    client_at(&server.uri())
}

fn client_at(uri: &str) -> ChatCompletionClient {
    let config = ServiceConfig {
        base_url: format!("{}/v1", uri),
        api_key: Some("sk-test".to_string()),
        model: "test-model".to_string(),
        timeout_secs: 5,
        ..Default::default()
    };
    ChatCompletionClient::new(config).expect("client should build")
}

/// Accepts connections, reads the request and hangs up without answering
async fn hang_up_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = [0u8; 8192];
            let _ = socket.read(&mut buf).await;
            drop(socket);
        }
    });
    format!("http://{}", addr)
}

fn request() -> ClassificationRequest {
    ClassificationRequest::for_record(&RecordFactory::create("A", RecordType::Primary), false)
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

#[tokio::test]
async fn test_success_returns_message_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({"model": "test-model", "stream": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("{\"analysis_reason\": \"ok\"}")))
        .expect(1)
        .mount(&server)
        .await;

    let content = client_for(&server).complete(&request()).await.unwrap();
    assert_eq!(content, "{\"analysis_reason\": \"ok\"}");
}

#[tokio::test]
async fn test_rate_limit_carries_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "7")
                .set_body_string("slow down"),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).complete(&request()).await.unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(err.retry_after(), Some(Duration::from_secs(7)));
    assert!(matches!(err, ClassifierError::RateLimit { .. }));
}

#[tokio::test]
async fn test_status_mapping() {
    let cases: [(u16, bool); 6] = [
        (500, true),
        (503, true),
        (408, true),
        (400, false),
        (401, false),
        (404, false),
    ];
    for (status, retryable) in cases {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(status).set_body_string("nope"))
            .mount(&server)
            .await;

        let err = client_for(&server).complete(&request()).await.unwrap_err();
        assert_eq!(err.is_retryable(), retryable, "status {}", status);
        assert!(err.to_string().contains(&status.to_string()));
    }
}

#[tokio::test]
async fn test_envelope_without_content_is_parsing_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let err = client_for(&server).complete(&request()).await.unwrap_err();
    assert!(matches!(err, ClassifierError::Parsing(_)));
}

#[tokio::test]
async fn test_classifier_retries_through_outage() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            "Sure:\n```json\n{\"analysis_reason\": \"deposited\", \"supporting_keywords\": [\"GEO\"]}\n```",
        )))
        .mount(&server)
        .await;

    let classifier = RecordClassifier::new(Arc::new(client_for(&server)), fast_retry(), false);
    let record = RecordFactory::create("A", RecordType::Primary);
    let position = ItemPosition {
        row_index: 0,
        batch_index: 0,
        item_index: 0,
    };

    match classifier.classify(&record, position).await {
        ItemOutcome::Completed(result) => {
            assert_eq!(result.attempts, 3);
            assert_eq!(result.supporting_keywords, vec!["GEO".to_string()]);
        }
        ItemOutcome::Failed(failed) => panic!("expected success, got {:?}", failed),
    }
}

#[tokio::test]
async fn test_connection_closed_mid_request_is_retried() {
    let client = client_at(&hang_up_server().await);

    let err = client.complete(&request()).await.unwrap_err();
    assert!(err.is_retryable(), "{} ({})", err, err.kind());

    let classifier = RecordClassifier::new(Arc::new(client), fast_retry(), false);
    let record = RecordFactory::create("A", RecordType::Primary);
    let position = ItemPosition {
        row_index: 0,
        batch_index: 0,
        item_index: 0,
    };

    match classifier.classify(&record, position).await {
        ItemOutcome::Failed(failed) => {
            assert_eq!(failed.attempts, 4);
            assert!(failed.retryable);
        }
        ItemOutcome::Completed(result) => panic!("expected failure, got {:?}", result),
    }
}
