//! Chat completion providers.

pub mod openai;

use crate::llm::{
    config::LlmConfig,
    error::LlmResult,
    types::{ChatCompletion, ChatCompletionChunk, ChatRequest},
};
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;

/// Raw chunk stream produced by a provider
pub type ChunkStream = Pin<Box<dyn Stream<Item = LlmResult<ChatCompletionChunk>> + Send>>;

/// External chat-completion capability.
///
/// Authentication, transport and retries are the provider's concern. Each
/// call carries its own parameters, so one handle is shared by all requests.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Single, non-streamed completion
    async fn complete(&self, request: &ChatRequest) -> LlmResult<ChatCompletion>;

    /// Streamed completion
    async fn complete_stream(&self, request: &ChatRequest) -> LlmResult<ChunkStream>;

    /// Provider name, for logs
    fn name(&self) -> &str;
}

/// Build the provider described by `config`
pub fn create_provider(config: &LlmConfig) -> LlmResult<Arc<dyn LlmProvider>> {
    Ok(Arc::new(openai::OpenAIProvider::new(config.clone())?))
}
