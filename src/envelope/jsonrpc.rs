//! JSON-RPC 2.0 envelope.
//!
//! ## Methods
//!
//! | method       | result                                        |
//! |--------------|-----------------------------------------------|
//! | `initialize` | protocol version, capabilities, server info   |
//! | `get_models` | `{models}` from the registry                  |
//! | `chat`       | reshaped completion `{choices, usage}`        |
//!
//! ## Error codes
//!
//! - `-32700` input is not JSON (or not UTF-8); the id is always `null`
//! - `-32600` missing `jsonrpc` or `method`
//! - `-32601` unknown method
//! - `-32603` everything raised while handling `chat`: missing or malformed
//!   parameters, unsupported models and provider failures. Provider failures
//!   carry the upstream type tag in `error.data.type` when there is one.

use super::{EnvelopeCodec, EnvelopeKind};
use crate::error::{Error, Result};
use crate::relay::Relay;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::str::FromStr;
use tracing::{debug, error, warn};

pub const JSONRPC_VERSION: &str = "2.0";

/// Protocol revision announced by `initialize`
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// JSON-RPC 2.0 Request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
}

/// JSON-RPC 2.0 Response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 Error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

impl From<&Error> for JsonRpcError {
    fn from(err: &Error) -> Self {
        let code = err.to_json_rpc_code();
        match err {
            Error::Parse(detail) => JsonRpcError {
                code,
                message: "Parse error".to_string(),
                data: Some(Value::String(detail.clone())),
            },
            Error::InvalidRequest(detail) => JsonRpcError {
                code,
                message: "Invalid Request".to_string(),
                data: Some(Value::String(detail.clone())),
            },
            _ => JsonRpcError {
                code,
                message: err.to_string(),
                data: err.upstream_type().map(|t| json!({ "type": t })),
            },
        }
    }
}

/// Recognized methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Initialize,
    Chat,
    GetModels,
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "initialize" => Ok(Method::Initialize),
            "chat" => Ok(Method::Chat),
            "get_models" => Ok(Method::GetModels),
            other => Err(Error::MethodNotFound(other.to_string())),
        }
    }
}

/// JSON-RPC codec over a [`Relay`]
#[derive(Debug, Clone)]
pub struct JsonRpcCodec {
    relay: Relay,
}

impl JsonRpcCodec {
    pub fn new(relay: Relay) -> Self {
        Self { relay }
    }

    /// Decode one line and produce its response envelope
    pub async fn process(&self, line: &str) -> JsonRpcResponse {
        let value: Value = match serde_json::from_str(line.trim()) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to parse JSON: {}", e);
                return JsonRpcResponse::failure(Value::Null, (&Error::Parse(e.to_string())).into());
            }
        };

        let id = value.get("id").cloned().unwrap_or(Value::Null);

        let request = match Self::decode_request(value) {
            Ok(request) => request,
            Err(e) => {
                warn!("Invalid JSON-RPC request: {}", e);
                return JsonRpcResponse::failure(id, (&e).into());
            }
        };

        debug!(method = %request.method, "Processing request");

        match self.dispatch(&request).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => {
                warn!(method = %request.method, "Error handling request: {}", e);
                JsonRpcResponse::failure(id, (&e).into())
            }
        }
    }

    fn decode_request(value: Value) -> Result<JsonRpcRequest> {
        if !value.is_object() {
            return Err(Error::InvalidRequest("request must be a JSON object".to_string()));
        }
        if value.get("jsonrpc").and_then(Value::as_str) != Some(JSONRPC_VERSION) {
            return Err(Error::InvalidRequest("jsonrpc must be \"2.0\"".to_string()));
        }
        if !value
            .get("method")
            .and_then(Value::as_str)
            .is_some_and(|m| !m.is_empty())
        {
            return Err(Error::InvalidRequest("method is required".to_string()));
        }

        serde_json::from_value(value).map_err(|e| Error::InvalidRequest(e.to_string()))
    }

    async fn dispatch(&self, request: &JsonRpcRequest) -> Result<Value> {
        let method: Method = request.method.parse()?;
        let params = request
            .params
            .clone()
            .unwrap_or_else(|| Value::Object(Map::new()));

        match method {
            Method::Initialize => Ok(self.initialize(&params)),
            Method::Chat => {
                let response = self.relay.chat(&params).await?;
                Ok(serde_json::to_value(response)?)
            }
            Method::GetModels => Ok(json!({ "models": self.relay.list_models() })),
        }
    }

    fn initialize(&self, params: &Value) -> Value {
        let requested = params.get("protocolVersion").and_then(Value::as_str);
        if requested != Some(PROTOCOL_VERSION) {
            warn!(
                "Protocol version mismatch. Expected {}, got {}",
                PROTOCOL_VERSION,
                requested.unwrap_or("none")
            );
        }

        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "models": self.relay.list_models(),
            "capabilities": { "chat": true },
            "serverInfo": self.relay.server_info(),
        })
    }
}

fn encode(response: &JsonRpcResponse) -> String {
    serde_json::to_string(response).unwrap_or_else(|e| {
        error!("Failed to serialize response: {}", e);
        json!({
            "jsonrpc": JSONRPC_VERSION,
            "id": null,
            "error": { "code": -32603, "message": "Internal error" }
        })
        .to_string()
    })
}

#[async_trait]
impl EnvelopeCodec for JsonRpcCodec {
    async fn handle_line(&self, line: &str) -> String {
        encode(&self.process(line).await)
    }

    fn parse_failure(&self, detail: &str) -> String {
        encode(&JsonRpcResponse::failure(
            Value::Null,
            (&Error::Parse(detail.to_string())).into(),
        ))
    }

    fn kind(&self) -> EnvelopeKind {
        EnvelopeKind::JsonRpc
    }
}
