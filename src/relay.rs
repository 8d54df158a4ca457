//! Request dispatch shared by every transport.
//!
//! A [`Relay`] owns the two pieces of process state every request needs: the
//! model allow-list and the completion client. Transports decode their own
//! envelopes and then call into the relay, so validation and provider calls
//! behave the same over stdio and HTTP.
//!
//! ## Flow
//!
//! - **prepare**: presence and type checks, then the allow-list lookup. Nothing
//!   reaches the provider when this fails.
//! - **complete / stream**: forward the prepared parameters. Provider errors
//!   come back unchanged, with their message and type tag.
//! - **chat**: prepare and complete, then reshape into `{choices, usage}` for
//!   the envelope surfaces. HTTP returns the completion body untouched instead.
//!
//! ## Example
//!
//! ```rust,no_run
//! use llm_relay::llm::{CompletionClient, LlmConfig};
//! use llm_relay::{ModelRegistry, Relay};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = CompletionClient::from_config(&LlmConfig::openai("sk-..."))?;
//! let relay = Relay::new(ModelRegistry::new(), client);
//!
//! let response = relay
//!     .chat(&json!({
//!         "model": "gpt-4o",
//!         "messages": [{ "role": "user", "content": "Hello!" }]
//!     }))
//!     .await?;
//! println!("{:?}", response);
//! # Ok(())
//! # }
//! ```

use crate::error::Result;
use crate::llm::{ChatCompletion, ChatRequest, ChatResponse, CompletionClient, CompletionStream};
use crate::registry::{ModelDescriptor, ModelRegistry};
use crate::validation::validate_chat_request;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Name and version reported to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: "openai-mcp".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Process-scoped relay state: the model allow-list and the provider handle.
/// Cloning is cheap; every request handler gets its own clone.
#[derive(Debug, Clone)]
pub struct Relay {
    registry: Arc<ModelRegistry>,
    client: CompletionClient,
    server_info: Arc<ServerInfo>,
}

impl Relay {
    pub fn new(registry: ModelRegistry, client: CompletionClient) -> Self {
        Self {
            registry: Arc::new(registry),
            client,
            server_info: Arc::new(ServerInfo::default()),
        }
    }

    pub fn with_server_info(mut self, server_info: ServerInfo) -> Self {
        self.server_info = Arc::new(server_info);
        self
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }

    pub fn list_models(&self) -> &[ModelDescriptor] {
        self.registry.list()
    }

    /// Validate raw chat parameters without calling the provider
    pub fn prepare_chat(&self, params: &Value) -> Result<ChatRequest> {
        Ok(validate_chat_request(params, &self.registry)?)
    }

    /// Validate, complete and reshape
    pub async fn chat(&self, params: &Value) -> Result<ChatResponse> {
        let request = self.prepare_chat(params)?;
        let completion = self.complete(&request).await?;
        Ok(ChatResponse::from(&completion))
    }

    pub async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion> {
        Ok(self.client.complete(request).await?)
    }

    pub async fn stream(&self, request: &ChatRequest) -> Result<CompletionStream> {
        Ok(self.client.stream(request).await?)
    }
}
