//! OpenAI Adapter Integration Tests
//!
//! Uses wiremock to simulate the chat completions and image generation APIs.

use panelforge::adapters::{AdapterError, ImageBackend, ImagePayload, OpenAiAdapter, TextBackend};
use panelforge::config::OpenAiSettings;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn adapter(server: &MockServer, api_key: Option<&str>) -> OpenAiAdapter {
    let settings = OpenAiSettings {
        base_url: server.uri(),
        api_key: api_key.map(str::to_string),
        timeout_seconds: 5,
        ..OpenAiSettings::default()
    };
    OpenAiAdapter::from_settings(&settings).unwrap()
}

#[tokio::test]
async fn test_chat_completion_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4o",
            "messages": [{ "role": "user", "content": "Write something" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "Page 1 HUZZAA Page 2" } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let text = adapter(&server, Some("sk-test"))
        .complete("Write something")
        .await
        .unwrap();
    assert_eq!(text, "Page 1 HUZZAA Page 2");
}

#[tokio::test]
async fn test_chat_null_content_is_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": null } }]
        })))
        .mount(&server)
        .await;

    let err = adapter(&server, None).complete("x").await.unwrap_err();
    assert!(matches!(err, AdapterError::EmptyResponse));
}

#[tokio::test]
async fn test_error_status_carries_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    match adapter(&server, None).complete("x").await.unwrap_err() {
        AdapterError::Status { status, body } => {
            assert_eq!(status, 429);
            assert_eq!(body, "rate limited");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_image_url_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/images/generations"))
        .and(body_partial_json(json!({
            "model": "dall-e-3",
            "n": 1,
            "size": "1024x1024",
            "quality": "standard"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "created": 1,
            "data": [{ "url": "https://images.example/abc.png" }]
        })))
        .mount(&server)
        .await;

    let payload = adapter(&server, None).generate_image("a castle").await.unwrap();
    assert_eq!(payload, ImagePayload::Url("https://images.example/abc.png".into()));
}

#[tokio::test]
async fn test_image_base64_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/images/generations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "b64_json": "aGVsbG8=" }]
        })))
        .mount(&server)
        .await;

    let payload = adapter(&server, None).generate_image("a castle").await.unwrap();
    assert_eq!(payload, ImagePayload::Base64("aGVsbG8=".into()));
}

#[tokio::test]
async fn test_image_without_reference_is_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/images/generations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;

    let err = adapter(&server, None).generate_image("a castle").await.unwrap_err();
    assert!(matches!(err, AdapterError::EmptyResponse));
}

#[tokio::test]
async fn test_malformed_json_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/images/generations"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = adapter(&server, None).generate_image("a castle").await.unwrap_err();
    assert!(matches!(err, AdapterError::Parse(_)));
}
