//! Request validation.
//!
//! Presence and type checks on the top-level chat fields plus model
//! membership. Message content is not inspected, and numeric ranges are left
//! to the provider: a temperature of 3.5 is forwarded and rejected upstream
//! with the provider's own error.

use crate::llm::types::{ChatMessage, ChatRequest, StopSequence, DEFAULT_TEMPERATURE};
use crate::registry::ModelRegistry;
use serde_json::Value;
use thiserror::Error;

/// Message shown to callers of the typed envelope and HTTP surfaces
pub const UNSUPPORTED_MODEL_MESSAGE: &str =
    "Unsupported model. Please choose from the supported models list.";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required parameters: model, messages")]
    MissingParameters,

    #[error("Invalid parameter '{field}': {reason}")]
    InvalidParameter { field: String, reason: String },

    #[error("Unsupported model: {0}")]
    UnsupportedModel(String),
}

impl ValidationError {
    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ValidationError::InvalidParameter {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Wording used by the typed envelope and HTTP surfaces
    pub fn public_message(&self) -> String {
        match self {
            ValidationError::UnsupportedModel(_) => UNSUPPORTED_MODEL_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

/// Check a decoded chat request and normalize it.
///
/// `model` and a non-empty `messages` array are required, and the model must
/// be registered. The registry check happens before anything reaches the
/// provider.
pub fn validate_chat_request(
    params: &Value,
    registry: &ModelRegistry,
) -> Result<ChatRequest, ValidationError> {
    let model = params
        .get("model")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty());
    let messages = params
        .get("messages")
        .and_then(Value::as_array)
        .filter(|m| !m.is_empty());

    let (model, messages) = match (model, messages) {
        (Some(model), Some(messages)) => (model, messages),
        _ => return Err(ValidationError::MissingParameters),
    };

    if !registry.contains(model) {
        return Err(ValidationError::UnsupportedModel(model.to_string()));
    }

    let messages = messages
        .iter()
        .enumerate()
        .map(|(i, message)| parse_message(i, message))
        .collect::<Result<Vec<_>, _>>()?;

    let mut request = ChatRequest::new(model, messages)
        .with_temperature(parse_temperature(params.get("temperature"))?);

    if let Some(max_tokens) = parse_max_tokens(params)? {
        request = request.with_max_tokens(max_tokens);
    }

    if let Some(stop) = parse_stop(params.get("stop"))? {
        request = request.with_stop(stop);
    }

    Ok(request)
}

fn parse_message(index: usize, message: &Value) -> Result<ChatMessage, ValidationError> {
    let field = format!("messages[{}]", index);

    if !message.get("role").is_some_and(Value::is_string) {
        return Err(ValidationError::invalid(&field, "expected an object with a string 'role'"));
    }

    serde_json::from_value(message.clone())
        .map_err(|e| ValidationError::invalid(&field, e.to_string()))
}

fn parse_temperature(value: Option<&Value>) -> Result<f64, ValidationError> {
    match value {
        None | Some(Value::Null) => Ok(DEFAULT_TEMPERATURE),
        // Range is the provider's call
        Some(v) => v
            .as_f64()
            .ok_or_else(|| ValidationError::invalid("temperature", "expected a number")),
    }
}

fn parse_max_tokens(params: &Value) -> Result<Option<u32>, ValidationError> {
    let value = params.get("max_tokens").or_else(|| params.get("maxTokens"));

    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_u64()
            .filter(|&n| n > 0)
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| ValidationError::invalid("max_tokens", "expected a positive integer")),
    }
}

fn parse_stop(value: Option<&Value>) -> Result<Option<StopSequence>, ValidationError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => serde_json::from_value(v.clone()).map(Some).map_err(|_| {
            ValidationError::invalid("stop", "expected a string or an array of strings")
        }),
    }
}
