//! Server-sent event framing for streamed completions.

use super::error::SERVER_ERROR_TYPE;
use crate::llm::{CompletionStream, LlmResult, StreamEvent};
use axum::{
    http::header,
    response::{
        sse::{Event, Sse},
        IntoResponse, Response,
    },
};
use futures::StreamExt;
use serde_json::json;
use std::convert::Infallible;
use tracing::{debug, error};

/// Data payload of the terminal frame
pub const DONE_SENTINEL: &str = "[DONE]";

/// Render a completion stream as `text/event-stream`.
///
/// Each chunk becomes one `data:` frame; the stream ends with `data: [DONE]`.
pub fn sse_response(stream: CompletionStream) -> Response {
    let events = stream.map(|item| Ok::<_, Infallible>(to_event(item)));

    (
        [
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
        ],
        Sse::new(events),
    )
        .into_response()
}

fn to_event(item: LlmResult<StreamEvent>) -> Event {
    match item {
        Ok(StreamEvent::Chunk(chunk)) => match serde_json::to_string(&chunk) {
            Ok(data) => Event::default().data(data),
            Err(e) => {
                error!("Failed to serialize chunk: {}", e);
                error_event(&e.to_string(), SERVER_ERROR_TYPE)
            }
        },
        Ok(StreamEvent::Done) => {
            debug!("Stream complete");
            Event::default().data(DONE_SENTINEL)
        }
        Err(e) => {
            error!("Stream failed: {}", e);
            error_event(&e.to_string(), e.error_type().unwrap_or(SERVER_ERROR_TYPE))
        }
    }
}

fn error_event(message: &str, error_type: &str) -> Event {
    Event::default().data(json!({ "error": message, "type": error_type }).to_string())
}
