//! Shared test fixtures
//!
//! A scripted provider that counts calls and never touches the network.

#![allow(dead_code)]

use async_trait::async_trait;
use futures::stream;
use llm_relay::llm::providers::{ChunkStream, LlmProvider};
use llm_relay::llm::{
    ChatCompletion, ChatCompletionChunk, ChatRequest, CompletionClient, LlmError, LlmResult,
};
use llm_relay::{ModelRegistry, Relay};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Upstream failure to replay: message and optional type tag
#[derive(Debug, Clone)]
pub struct Failure {
    pub message: String,
    pub error_type: Option<String>,
}

impl Failure {
    fn to_error(&self) -> LlmError {
        LlmError::api(self.message.clone(), self.error_type.as_deref())
    }
}

pub struct MockProvider {
    completion: ChatCompletion,
    chunks: Vec<ChatCompletionChunk>,
    failure: Option<Failure>,
    stream_failure: Option<Failure>,
    calls: AtomicUsize,
    last_request: Mutex<Option<ChatRequest>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            completion: sample_completion(),
            chunks: vec![chunk("Hel"), chunk("lo")],
            failure: None,
            stream_failure: None,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Every call fails before producing anything
    pub fn failing(message: &str, error_type: Option<&str>) -> Self {
        Self {
            failure: Some(Failure {
                message: message.to_string(),
                error_type: error_type.map(str::to_string),
            }),
            ..Self::new()
        }
    }

    /// Streams yield the scripted chunks, then fail
    pub fn failing_mid_stream(message: &str, error_type: Option<&str>) -> Self {
        Self {
            stream_failure: Some(Failure {
                message: message.to_string(),
                error_type: error_type.map(str::to_string),
            }),
            ..Self::new()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<ChatRequest> {
        self.last_request.lock().unwrap().clone()
    }

    fn record(&self, request: &ChatRequest) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn complete(&self, request: &ChatRequest) -> LlmResult<ChatCompletion> {
        self.record(request);
        match &self.failure {
            Some(failure) => Err(failure.to_error()),
            None => Ok(self.completion.clone()),
        }
    }

    async fn complete_stream(&self, request: &ChatRequest) -> LlmResult<ChunkStream> {
        self.record(request);
        if let Some(failure) = &self.failure {
            return Err(failure.to_error());
        }

        let mut items: Vec<LlmResult<ChatCompletionChunk>> =
            self.chunks.iter().cloned().map(Ok).collect();
        if let Some(failure) = &self.stream_failure {
            items.push(Err(failure.to_error()));
            // Never delivered: the relay stops at the first error
            items.push(Ok(chunk("after error")));
        }

        Ok(Box::pin(stream::iter(items)))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Relay over `provider`, with streaming advertised
pub fn relay_with(provider: Arc<MockProvider>) -> Relay {
    Relay::new(
        ModelRegistry::with_streaming(true),
        CompletionClient::new(provider),
    )
}

pub fn sample_completion() -> ChatCompletion {
    serde_json::from_value(json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1700000000,
        "model": "gpt-4o",
        "system_fingerprint": "fp_test",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": "Hello there" },
            "finish_reason": "stop",
            "logprobs": null
        }],
        "usage": { "prompt_tokens": 9, "completion_tokens": 3, "total_tokens": 12 }
    }))
    .unwrap()
}

pub fn chunk(content: &str) -> ChatCompletionChunk {
    serde_json::from_value(json!({
        "id": "chatcmpl-test",
        "object": "chat.completion.chunk",
        "created": 1700000000,
        "model": "gpt-4o",
        "choices": [{ "index": 0, "delta": { "content": content }, "finish_reason": null }]
    }))
    .unwrap()
}

/// Minimal valid chat parameters
pub fn chat_params(model: &str) -> serde_json::Value {
    json!({
        "model": model,
        "messages": [{ "role": "user", "content": "Hi" }]
    })
}
