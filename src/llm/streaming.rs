//! Streamed completion handling.
//!
//! Provider chunk streams end in one of three ways: normally, with an error,
//! or by the provider dropping the connection. Consumers should not have to
//! tell these apart to know when to stop reading, so every relayed stream is
//! closed with a single [`StreamEvent::Done`]. An error ends the chunk
//! sequence early; nothing the provider sends after it is forwarded.

use crate::llm::{
    error::LlmResult,
    providers::ChunkStream,
    types::ChatCompletionChunk,
};
use futures::{Stream, StreamExt};
use std::pin::Pin;

/// Item of a relayed completion stream
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Partial completion from the provider
    Chunk(ChatCompletionChunk),
    /// Terminal marker, emitted exactly once as the last item
    Done,
}

/// Lazy, finite, non-restartable sequence of stream events
pub type CompletionStream = Pin<Box<dyn Stream<Item = LlmResult<StreamEvent>> + Send>>;

/// Wrap provider chunks so the sequence always ends with [`StreamEvent::Done`].
///
/// An upstream error is yielded as-is and ends the chunk sequence; the
/// terminal marker still follows it.
pub fn with_terminal_marker(mut chunks: ChunkStream) -> CompletionStream {
    let stream = async_stream::stream! {
        while let Some(result) = chunks.next().await {
            match result {
                Ok(chunk) => yield Ok(StreamEvent::Chunk(chunk)),
                Err(e) => {
                    yield Err(e);
                    break;
                }
            }
        }
        yield Ok(StreamEvent::Done);
    };

    Box::pin(stream)
}

/// Concatenate the content deltas of a stream, stopping at the terminal marker
pub async fn collect_content(mut stream: CompletionStream) -> LlmResult<String> {
    let mut content = String::new();

    while let Some(event) = stream.next().await {
        match event? {
            StreamEvent::Chunk(chunk) => {
                if let Some(delta) = chunk.content() {
                    content.push_str(delta);
                }
            }
            StreamEvent::Done => break,
        }
    }

    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::error::LlmError;
    use futures::stream;
    use serde_json::json;

    fn chunk(content: &str) -> ChatCompletionChunk {
        serde_json::from_value(json!({
            "id": "c1",
            "object": "chat.completion.chunk",
            "created": 1,
            "model": "gpt-4o",
            "choices": [{ "index": 0, "delta": { "content": content }, "finish_reason": null }]
        }))
        .unwrap()
    }

    fn boxed(items: Vec<LlmResult<ChatCompletionChunk>>) -> ChunkStream {
        Box::pin(stream::iter(items))
    }

    #[tokio::test]
    async fn test_done_follows_all_chunks() {
        let chunks = boxed(vec![Ok(chunk("Hello")), Ok(chunk(" World"))]);
        let events: Vec<_> = with_terminal_marker(chunks).collect().await;

        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], Ok(StreamEvent::Chunk(_))));
        assert!(matches!(events[1], Ok(StreamEvent::Chunk(_))));
        assert!(matches!(events[2], Ok(StreamEvent::Done)));
    }

    #[tokio::test]
    async fn test_done_after_empty_stream() {
        let chunks = boxed(Vec::new());
        let events: Vec<_> = with_terminal_marker(chunks).collect().await;
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], Ok(StreamEvent::Done)));
    }

    #[tokio::test]
    async fn test_error_ends_chunks_then_done() {
        let chunks = boxed(vec![
            Ok(chunk("partial")),
            Err(LlmError::Streaming("connection dropped".into())),
            Ok(chunk("never")),
        ]);
        let events: Vec<_> = with_terminal_marker(chunks).collect().await;

        assert_eq!(events.len(), 3);
        assert!(events[1].is_err());
        assert!(matches!(events[2], Ok(StreamEvent::Done)));
    }

    #[tokio::test]
    async fn test_collect_content() {
        let chunks = boxed(vec![Ok(chunk("Hello")), Ok(chunk(" World"))]);
        let content = collect_content(with_terminal_marker(chunks)).await.unwrap();
        assert_eq!(content, "Hello World");
    }
}
