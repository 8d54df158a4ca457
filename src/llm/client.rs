//! Completion client adapter.

use crate::llm::{
    config::LlmConfig,
    error::LlmResult,
    providers::{create_provider, LlmProvider},
    streaming::{with_terminal_marker, CompletionStream},
    types::{ChatCompletion, ChatRequest},
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Long-lived handle around a provider. Stateless between calls, so clones
/// are shared freely across concurrent requests.
#[derive(Clone)]
pub struct CompletionClient {
    provider: Arc<dyn LlmProvider>,
}

impl CompletionClient {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    /// Build the client from provider settings
    pub fn from_config(config: &LlmConfig) -> LlmResult<Self> {
        Ok(Self::new(create_provider(config)?))
    }

    /// Single completion. Provider failures are returned unmodified.
    pub async fn complete(&self, request: &ChatRequest) -> LlmResult<ChatCompletion> {
        debug!(
            provider = self.provider.name(),
            model = %request.model,
            messages = request.messages.len(),
            "Requesting completion"
        );

        self.provider.complete(request).await.inspect_err(|e| {
            warn!(provider = self.provider.name(), "Completion failed: {}", e);
        })
    }

    /// Streamed completion, terminated by [`StreamEvent::Done`](crate::llm::StreamEvent::Done)
    pub async fn stream(&self, request: &ChatRequest) -> LlmResult<CompletionStream> {
        debug!(
            provider = self.provider.name(),
            model = %request.model,
            "Requesting streamed completion"
        );

        let chunks = self.provider.complete_stream(request).await.inspect_err(|e| {
            warn!(provider = self.provider.name(), "Stream setup failed: {}", e);
        })?;

        Ok(with_terminal_marker(chunks))
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }
}

impl std::fmt::Debug for CompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionClient")
            .field("provider", &self.provider.name())
            .finish()
    }
}
