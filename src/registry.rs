//! Static registry of the chat models this relay accepts.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Provider tag reported for every model
pub const PROVIDER: &str = "openai";

/// Identifiers accepted by the relay, in listing order
pub const SUPPORTED_MODELS: &[&str] = &[
    "gpt-4o",
    "gpt-4o-mini",
    "gpt-4.5-preview",
    "gpt-4-turbo",
    "o1-preview",
    "o1-mini",
    "o3-mini",
];

const REASONING_MARKER: &str = "o1";
const REASONING_INPUT_TOKEN_LIMIT: u32 = 32_000;
const DEFAULT_INPUT_TOKEN_LIMIT: u32 = 16_000;
const OUTPUT_TOKEN_LIMIT: u32 = 4_096;

/// Feature flags advertised for a model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCapabilities {
    pub chat: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streaming: Option<bool>,
}

/// Metadata for one supported model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    pub id: String,
    pub provider: String,
    pub name: String,
    pub description: String,
    pub capabilities: ModelCapabilities,
    pub input_token_limit: u32,
    pub output_token_limit: u32,
}

impl ModelDescriptor {
    fn for_id(id: &str, streaming: bool) -> Self {
        let input_token_limit = if id.contains(REASONING_MARKER) {
            REASONING_INPUT_TOKEN_LIMIT
        } else {
            DEFAULT_INPUT_TOKEN_LIMIT
        };

        Self {
            id: id.to_string(),
            provider: PROVIDER.to_string(),
            name: id.to_string(),
            description: format!("OpenAI {} model", id),
            capabilities: ModelCapabilities {
                chat: true,
                streaming: streaming.then_some(true),
            },
            input_token_limit,
            output_token_limit: OUTPUT_TOKEN_LIMIT,
        }
    }
}

/// Read-only allow-list of models, built once at startup
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: Vec<ModelDescriptor>,
    index: HashMap<String, usize>,
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelRegistry {
    /// Registry for transports without streaming support
    pub fn new() -> Self {
        Self::with_streaming(false)
    }

    /// Registry that advertises the `streaming` capability when `streaming` is set
    pub fn with_streaming(streaming: bool) -> Self {
        let models: Vec<ModelDescriptor> = SUPPORTED_MODELS
            .iter()
            .map(|id| ModelDescriptor::for_id(id, streaming))
            .collect();
        let index = models
            .iter()
            .enumerate()
            .map(|(i, m)| (m.id.clone(), i))
            .collect();

        Self { models, index }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&ModelDescriptor> {
        self.index.get(id).map(|&i| &self.models[i])
    }

    pub fn list(&self) -> &[ModelDescriptor] {
        &self.models
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.models.iter().map(|m| m.id.as_str())
    }

    /// Number of registered models; never zero
    pub(crate) fn len(&self) -> usize {
        self.models.len()
    }
}
