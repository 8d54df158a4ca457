//! Completion client adapter
//!
//! Wraps the external chat-completion provider behind [`LlmProvider`] and
//! exposes single and streamed completions through [`CompletionClient`].

pub mod client;
pub mod config;
pub mod error;
pub mod providers;
pub mod streaming;
pub mod types;

pub use client::CompletionClient;
pub use config::LlmConfig;
pub use error::{LlmError, LlmResult};
pub use providers::{ChunkStream, LlmProvider};
pub use streaming::{CompletionStream, StreamEvent};
pub use types::{
    ChatCompletion, ChatCompletionChunk, ChatMessage, ChatRequest, ChatResponse, StopSequence,
};
