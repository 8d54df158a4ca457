//! Error types for the relay.

use crate::llm::LlmError;
use crate::validation::ValidationError;
use thiserror::Error;

/// Result type alias for relay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types raised while decoding, dispatching or serving a request
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input line or body
    #[error("Parse error: {0}")]
    Parse(String),

    /// Missing or invalid envelope fields
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Unknown method or message type
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// Request fields failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Completion client failure
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Convert error to JSON-RPC error code
    pub fn to_json_rpc_code(&self) -> i32 {
        match self {
            Error::Parse(_) => -32700,
            Error::InvalidRequest(_) => -32600,
            Error::MethodNotFound(_) => -32601,
            // Failures raised inside a handler, including validation
            _ => -32603,
        }
    }

    /// Upstream error type tag, when the failure came from the provider
    pub fn upstream_type(&self) -> Option<&str> {
        match self {
            Error::Llm(err) => err.error_type(),
            _ => None,
        }
    }
}
