//! Type-tagged envelope over a scripted provider

mod fixtures;

use fixtures::{chat_params, relay_with, MockProvider};
use llm_relay::envelope::TypedCodec;
use llm_relay::validation::UNSUPPORTED_MODEL_MESSAGE;
use llm_relay::EnvelopeCodec;
use serde_json::{json, Value};
use std::sync::Arc;

fn codec() -> (TypedCodec, Arc<MockProvider>) {
    let provider = Arc::new(MockProvider::new());
    (TypedCodec::new(relay_with(provider.clone())), provider)
}

async fn call(codec: &TypedCodec, line: &str) -> Value {
    serde_json::from_str(&codec.handle_line(line).await).unwrap()
}

#[tokio::test]
async fn test_ping_pong() {
    let (codec, _) = codec();

    let response = call(&codec, r#"{"type":"ping"}"#).await;

    assert_eq!(response["type"], "pong");
    let timestamp = response["data"]["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
}

#[tokio::test]
async fn test_models_response_is_stable() {
    let (codec, provider) = codec();

    let first = codec.handle_line(r#"{"type":"models"}"#).await;
    let second = codec.handle_line(r#"{"type":"models"}"#).await;

    assert_eq!(first, second);
    let response: Value = serde_json::from_str(&first).unwrap();
    assert_eq!(response["type"], "models_response");
    assert_eq!(response["data"]["models"].as_array().unwrap().len(), 7);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_unsupported_model_message() {
    let (codec, provider) = codec();

    let line = json!({ "type": "chat", "data": chat_params("davinci") }).to_string();
    let response = call(&codec, &line).await;

    assert_eq!(response, json!({ "type": "error", "error": UNSUPPORTED_MODEL_MESSAGE }));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_chat_response() {
    let (codec, _) = codec();

    let line = json!({ "type": "chat", "id": "req-9", "data": chat_params("gpt-4o-mini") }).to_string();
    let response = call(&codec, &line).await;

    assert_eq!(response["type"], "chat_response");
    assert_eq!(response["id"], "req-9");
    assert_eq!(response["data"]["choices"][0]["message"]["content"], "Hello there");
    assert_eq!(response["data"]["choices"][0]["finishReason"], "stop");
}

#[tokio::test]
async fn test_malformed_inputs() {
    let (codec, _) = codec();

    let response = call(&codec, "not json at all").await;
    assert_eq!(response, json!({ "type": "error", "error": "Invalid JSON format" }));

    let response = call(&codec, r#"{"id":7,"data":{}}"#).await;
    assert_eq!(response["type"], "error");
    assert_eq!(response["id"], 7);
    assert_eq!(response["error"], "Invalid message format: 'type' is required");

    let response = call(&codec, r#"{"type":"dance"}"#).await;
    assert_eq!(response["error"], "Unknown message type: dance");
}

#[tokio::test]
async fn test_upstream_failure_message() {
    let provider = Arc::new(MockProvider::failing("Incorrect API key provided", None));
    let codec = TypedCodec::new(relay_with(provider));

    let line = json!({ "type": "chat", "data": chat_params("gpt-4o") }).to_string();
    let response = call(&codec, &line).await;

    assert_eq!(response, json!({ "type": "error", "error": "Incorrect API key provided" }));
}
