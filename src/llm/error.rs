//! Error types for the completion client adapter.

use thiserror::Error;

/// Completion client failures
#[derive(Error, Debug)]
pub enum LlmError {
    /// The provider rejected the call. The upstream message is kept as-is.
    #[error("{message}")]
    Api {
        message: String,
        error_type: Option<String>,
    },

    /// The provider answered with a body that could not be decoded
    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),

    #[error("Streaming error: {0}")]
    Streaming(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl LlmError {
    pub fn api(message: impl Into<String>, error_type: Option<&str>) -> Self {
        LlmError::Api {
            message: message.into(),
            error_type: error_type.map(str::to_string),
        }
    }

    /// Upstream error type tag, when the provider supplied one
    pub fn error_type(&self) -> Option<&str> {
        match self {
            LlmError::Api { error_type, .. } => error_type.as_deref(),
            _ => None,
        }
    }
}

/// Result type for completion client operations
pub type LlmResult<T> = Result<T, LlmError>;
