//! OpenAI chat completions provider.
//!
//! Requests and responses travel as raw JSON. The parameter set built by the
//! relay is posted as-is, so message roles and content shapes the relay does
//! not model itself (`developer`, content parts, tool calls) reach the API
//! unchanged. The response body is handed back without being re-read through
//! typed structs; fields added by the API later survive the trip.
//!
//! `async-openai` still supplies the endpoint configuration (base URL,
//! authentication and organization headers) and the shape of API errors.
//! Streams are read as server-sent events and end at the `[DONE]` marker.

use crate::llm::{
    config::LlmConfig,
    error::{LlmError, LlmResult},
    providers::{ChunkStream, LlmProvider},
    types::{ChatCompletion, ChatCompletionChunk, ChatRequest},
};
use async_openai::{
    config::{Config, OpenAIConfig},
    error::ApiError,
};
use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::StreamExt;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

/// Marker closing an upstream event stream
const DONE_MARKER: &str = "[DONE]";

/// Error body returned by the API on a non-success status
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ApiError,
}

impl From<ApiError> for LlmError {
    fn from(err: ApiError) -> Self {
        LlmError::Api {
            message: err.message,
            error_type: err.r#type,
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        LlmError::Network(err.to_string())
    }
}

pub struct OpenAIProvider {
    config: OpenAIConfig,
    http: Client,
}

impl OpenAIProvider {
    /// Create a provider from validated settings
    pub fn new(config: LlmConfig) -> LlmResult<Self> {
        config.validate()?;

        let api_key = config
            .get_api_key()
            .ok_or_else(|| LlmError::Config("API key is required".to_string()))?;

        let mut openai_config = OpenAIConfig::new().with_api_key(api_key);

        if let Some(api_base) = &config.api_base {
            openai_config = openai_config.with_api_base(api_base);
        }

        if let Some(org_id) = &config.organization_id {
            openai_config = openai_config.with_org_id(org_id);
        }

        let http = Client::builder()
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config: openai_config,
            http,
        })
    }

    /// Request body for one call; `stream` is only set when streaming
    fn build_body(request: &ChatRequest, stream: bool) -> Value {
        let mut body = request.upstream_params();
        if stream {
            body["stream"] = Value::Bool(true);
        }
        body
    }

    async fn post(&self, body: &Value) -> LlmResult<reqwest::Response> {
        let response = self
            .http
            .post(self.config.url(CHAT_COMPLETIONS_PATH))
            .headers(self.config.headers())
            .query(&self.config.query())
            .json(body)
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        warn!(%status, "OpenAI API returned an error");

        match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => Err(body.error.into()),
            Err(_) => Err(LlmError::Api {
                message: format!("OpenAI API error ({}): {}", status, text),
                error_type: None,
            }),
        }
    }
}

/// Decode one `data:` payload of the event stream.
///
/// `Ok(None)` marks the end of the stream. An error object sent mid-stream
/// is surfaced as an API failure.
fn decode_event(data: &str) -> LlmResult<Option<ChatCompletionChunk>> {
    if data.trim() == DONE_MARKER {
        return Ok(None);
    }

    let value: Value =
        serde_json::from_str(data).map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

    if let Some(error) = value.get("error").filter(|e| e.is_object()) {
        let api: ApiError = serde_json::from_value(error.clone())
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
        return Err(api.into());
    }

    serde_json::from_value(value)
        .map(Some)
        .map_err(|e| LlmError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl LlmProvider for OpenAIProvider {
    async fn complete(&self, request: &ChatRequest) -> LlmResult<ChatCompletion> {
        debug!(model = %request.model, "Calling OpenAI chat completions");

        let response = self.post(&Self::build_body(request, false)).await?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        serde_json::from_value(body).map_err(|e| LlmError::InvalidResponse(e.to_string()))
    }

    async fn complete_stream(&self, request: &ChatRequest) -> LlmResult<ChunkStream> {
        debug!(model = %request.model, "Calling OpenAI chat completions (stream)");

        let response = self.post(&Self::build_body(request, true)).await?;
        let mut events = response.bytes_stream().eventsource();

        let chunk_stream = async_stream::stream! {
            while let Some(event) = events.next().await {
                match event {
                    Ok(event) => match decode_event(&event.data) {
                        Ok(Some(chunk)) => yield Ok(chunk),
                        Ok(None) => break,
                        Err(e) => {
                            yield Err(e);
                            break;
                        }
                    },
                    Err(e) => {
                        yield Err(LlmError::Streaming(e.to_string()));
                        break;
                    }
                }
            }
        };

        Ok(Box::pin(chunk_stream))
    }

    fn name(&self) -> &str {
        "OpenAI"
    }
}
