//! Chat completion types shared by the validator, the provider adapter and the codecs.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Default sampling temperature when a request leaves it unset
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// One conversation turn. Content and any extra fields are forwarded verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub content: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: Value::String(content.into()),
            extra: Map::new(),
        }
    }
}

/// `stop` accepts a single sequence or a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StopSequence {
    Single(String),
    Multiple(Vec<String>),
}

/// Normalized chat request, produced by the validator
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub max_tokens: Option<u32>,
    pub stop: Option<StopSequence>,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: None,
            stop: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_stop(mut self, stop: StopSequence) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Parameter set sent to the provider: model, messages, temperature and
    /// the optional `max_tokens` / `stop`.
    pub fn upstream_params(&self) -> Value {
        let mut params = json!({
            "model": self.model,
            "messages": self.messages,
            "temperature": self.temperature,
        });
        if let Some(max_tokens) = self.max_tokens {
            params["max_tokens"] = json!(max_tokens);
        }
        if let Some(stop) = &self.stop {
            params["stop"] = json!(stop);
        }
        params
    }
}

/// Typed view of one upstream choice, used for reshaping only
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CompletionChoice {
    pub message: CompletionMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CompletionMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
}

/// Upstream completion body, held verbatim.
///
/// Serializing it reproduces exactly what the provider sent; accessors give
/// typed views where the relay needs them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatCompletion(Map<String, Value>);

impl ChatCompletion {
    pub fn body(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn model(&self) -> Option<&str> {
        self.0.get("model").and_then(Value::as_str)
    }

    /// Choices that carry a message; malformed entries are skipped
    pub fn choices(&self) -> Vec<CompletionChoice> {
        self.0
            .get("choices")
            .and_then(Value::as_array)
            .map(|choices| {
                choices
                    .iter()
                    .filter_map(|c| serde_json::from_value(c.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Token accounting, as reported
    pub fn usage(&self) -> Option<&Value> {
        self.0.get("usage").filter(|u| !u.is_null())
    }
}

/// One partial completion from a streamed response, held verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatCompletionChunk(Map<String, Value>);

impl ChatCompletionChunk {
    pub fn body(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Content delta of the first choice
    pub fn content(&self) -> Option<&str> {
        self.0
            .get("choices")?
            .get(0)?
            .get("delta")?
            .get("content")?
            .as_str()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMessage {
    pub role: String,
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseChoice {
    pub message: ResponseMessage,
    #[serde(rename = "finishReason")]
    pub finish_reason: Option<String>,
}

/// Reshaped completion returned by the `chat` method / message type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ResponseChoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Value>,
}

impl From<&ChatCompletion> for ChatResponse {
    fn from(completion: &ChatCompletion) -> Self {
        Self {
            choices: completion
                .choices()
                .into_iter()
                .map(|choice| ResponseChoice {
                    message: ResponseMessage {
                        role: choice.message.role,
                        content: choice.message.content,
                    },
                    finish_reason: choice.finish_reason,
                })
                .collect(),
            usage: completion.usage().cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_completion() -> ChatCompletion {
        serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 1700000000,
            "model": "gpt-4o",
            "system_fingerprint": "fp_abc",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": "Hello!", "refusal": null },
                "logprobs": null,
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 5, "completion_tokens": 2, "total_tokens": 7 }
        }))
        .unwrap()
    }

    #[test]
    fn test_upstream_params_omit_unset_fields() {
        let request = ChatRequest::new("gpt-4o", vec![ChatMessage::new("user", "hi")]);
        let params = request.upstream_params();
        assert_eq!(params["model"], "gpt-4o");
        assert_eq!(params["messages"][0]["content"], "hi");
        assert!(params.get("max_tokens").is_none());
        assert!(params.get("stop").is_none());
        assert_eq!(params["temperature"], json!(0.7));
    }

    #[test]
    fn test_upstream_params_with_options() {
        let request = ChatRequest::new("gpt-4o", vec![ChatMessage::new("user", "hi")])
            .with_temperature(0.0)
            .with_max_tokens(64)
            .with_stop(StopSequence::Multiple(vec!["\n".into(), "END".into()]));
        let params = request.upstream_params();
        assert_eq!(params["temperature"], 0.0);
        assert_eq!(params["max_tokens"], 64);
        assert_eq!(params["stop"], json!(["\n", "END"]));
    }

    #[test]
    fn test_message_extra_fields_pass_through() {
        let message: ChatMessage = serde_json::from_value(json!({
            "role": "user",
            "content": [{ "type": "text", "text": "hi" }],
            "name": "alice"
        }))
        .unwrap();
        let back = serde_json::to_value(&message).unwrap();
        assert_eq!(back["name"], "alice");
        assert_eq!(back["content"][0]["text"], "hi");
    }

    #[test]
    fn test_completion_serializes_verbatim() {
        let body = json!({
            "id": "chatcmpl-2",
            "model": "gpt-4o",
            "choices": [{
                "message": { "role": "assistant", "content": "ok", "annotations": [] }
            }],
            "new_upstream_field": "x"
        });
        let completion: ChatCompletion = serde_json::from_value(body.clone()).unwrap();
        assert_eq!(serde_json::to_value(&completion).unwrap(), body);
        assert_eq!(completion.model(), Some("gpt-4o"));
        assert!(completion.usage().is_none());
    }

    #[test]
    fn test_completion_must_be_an_object() {
        assert!(serde_json::from_value::<ChatCompletion>(json!([1])).is_err());
    }

    #[test]
    fn test_reshape_keeps_every_choice() {
        let completion: ChatCompletion = serde_json::from_value(json!({
            "choices": [
                { "message": { "role": "assistant", "content": "a" }, "finish_reason": "stop" },
                { "message": { "role": "assistant", "content": null }, "finish_reason": "length" }
            ]
        }))
        .unwrap();
        let response = ChatResponse::from(&completion);
        assert_eq!(response.choices.len(), 2);
        assert_eq!(response.choices[1].message.content, None);
        assert_eq!(response.choices[1].finish_reason.as_deref(), Some("length"));
        assert!(response.usage.is_none());
    }

    #[test]
    fn test_chat_response_reshape() {
        let response = ChatResponse::from(&sample_completion());
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({
                "choices": [{
                    "message": { "role": "assistant", "content": "Hello!" },
                    "finishReason": "stop"
                }],
                "usage": { "prompt_tokens": 5, "completion_tokens": 2, "total_tokens": 7 }
            })
        );
    }

    #[test]
    fn test_chunk_content() {
        let chunk: ChatCompletionChunk = serde_json::from_value(json!({
            "id": "c1",
            "object": "chat.completion.chunk",
            "created": 1,
            "model": "gpt-4o",
            "choices": [{ "index": 0, "delta": { "content": "Hel" }, "finish_reason": null }]
        }))
        .unwrap();
        assert_eq!(chunk.content(), Some("Hel"));
    }
}
