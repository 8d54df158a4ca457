//! Type-tagged envelope: `{type, data}` in, `{type: "<name>_response", data}` or
//! `{type: "error", error}` out.

use super::{EnvelopeCodec, EnvelopeKind};
use crate::error::{Error, Result};
use crate::relay::Relay;
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::str::FromStr;
use tracing::{debug, error, warn};

pub const ERROR_TYPE: &str = "error";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypedRequest {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Value,
    /// Optional correlation id, echoed on the response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedResponse {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TypedResponse {
    pub fn success(kind: impl Into<String>, id: Option<Value>, data: Value) -> Self {
        Self {
            kind: kind.into(),
            id,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(id: Option<Value>, message: impl Into<String>) -> Self {
        Self {
            kind: ERROR_TYPE.to_string(),
            id,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Recognized message types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Ping,
    Chat,
    Models,
}

impl MessageType {
    pub fn response_type(self) -> &'static str {
        match self {
            MessageType::Ping => "pong",
            MessageType::Chat => "chat_response",
            MessageType::Models => "models_response",
        }
    }
}

impl FromStr for MessageType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ping" => Ok(MessageType::Ping),
            "chat" => Ok(MessageType::Chat),
            "models" => Ok(MessageType::Models),
            other => Err(Error::MethodNotFound(other.to_string())),
        }
    }
}

/// Error text carried in `{type: "error", error}`
fn error_message(err: &Error) -> String {
    match err {
        Error::Parse(_) => "Invalid JSON format".to_string(),
        Error::InvalidRequest(_) => "Invalid message format: 'type' is required".to_string(),
        Error::MethodNotFound(kind) => format!("Unknown message type: {}", kind),
        Error::Validation(e) => e.public_message(),
        other => other.to_string(),
    }
}

/// Type-tagged codec over a [`Relay`]
#[derive(Debug, Clone)]
pub struct TypedCodec {
    relay: Relay,
}

impl TypedCodec {
    pub fn new(relay: Relay) -> Self {
        Self { relay }
    }

    /// Decode one line and produce its response envelope
    pub async fn process(&self, line: &str) -> TypedResponse {
        let request: TypedRequest = match serde_json::from_str::<Value>(line.trim()) {
            Err(e) => {
                warn!("Failed to parse JSON: {}", e);
                return TypedResponse::failure(None, error_message(&Error::Parse(e.to_string())));
            }
            Ok(value) => {
                let id = value.get("id").cloned();
                match serde_json::from_value(value) {
                    Ok(request) => request,
                    Err(e) => {
                        warn!("Invalid message: {}", e);
                        let err = Error::InvalidRequest(e.to_string());
                        return TypedResponse::failure(id, error_message(&err));
                    }
                }
            }
        };

        debug!(kind = %request.kind, "Processing message");

        match self.dispatch(&request).await {
            Ok((message_type, data)) => {
                TypedResponse::success(message_type.response_type(), request.id, data)
            }
            Err(e) => {
                warn!(kind = %request.kind, "Error handling message: {}", e);
                TypedResponse::failure(request.id, error_message(&e))
            }
        }
    }

    async fn dispatch(&self, request: &TypedRequest) -> Result<(MessageType, Value)> {
        let message_type: MessageType = request.kind.parse()?;

        let data = match message_type {
            MessageType::Ping => json!({ "timestamp": Utc::now().to_rfc3339() }),
            MessageType::Chat => serde_json::to_value(self.relay.chat(&request.data).await?)?,
            MessageType::Models => json!({ "models": self.relay.list_models() }),
        };

        Ok((message_type, data))
    }
}

fn encode(response: &TypedResponse) -> String {
    serde_json::to_string(response).unwrap_or_else(|e| {
        error!("Failed to serialize response: {}", e);
        json!({ "type": ERROR_TYPE, "error": "Internal error" }).to_string()
    })
}

#[async_trait]
impl EnvelopeCodec for TypedCodec {
    async fn handle_line(&self, line: &str) -> String {
        encode(&self.process(line).await)
    }

    fn parse_failure(&self, detail: &str) -> String {
        encode(&TypedResponse::failure(
            None,
            error_message(&Error::Parse(detail.to_string())),
        ))
    }

    fn kind(&self) -> EnvelopeKind {
        EnvelopeKind::Typed
    }
}
