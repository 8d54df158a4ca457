//! Envelope codecs for the line-oriented transports.
//!
//! Two encodings are supported, chosen once per deployment:
//! JSON-RPC 2.0 (`method`/`params`/`id`) and a type-tagged envelope
//! (`type`/`data`). Both read one JSON document per line and produce one
//! JSON document per line.

pub mod jsonrpc;
pub mod typed;

pub use jsonrpc::{JsonRpcCodec, JsonRpcError, JsonRpcRequest, JsonRpcResponse, Method};
pub use typed::{MessageType, TypedCodec, TypedRequest, TypedResponse};

use crate::relay::Relay;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Decode one input line, dispatch it, encode the reply.
///
/// Every line yields exactly one reply; failures are reported as error
/// envelopes rather than returned.
#[async_trait]
pub trait EnvelopeCodec: Send + Sync {
    async fn handle_line(&self, line: &str) -> String;

    /// Reply for input that never became a line of text, such as bytes that
    /// are not valid UTF-8. Uses the same parse-error envelope as malformed
    /// JSON.
    fn parse_failure(&self, detail: &str) -> String;

    fn kind(&self) -> EnvelopeKind;
}

/// Envelope encoding used by a deployment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeKind {
    #[default]
    #[value(name = "jsonrpc")]
    JsonRpc,
    #[value(name = "typed")]
    Typed,
}

impl EnvelopeKind {
    pub fn codec(self, relay: Relay) -> Arc<dyn EnvelopeCodec> {
        match self {
            EnvelopeKind::JsonRpc => Arc::new(JsonRpcCodec::new(relay)),
            EnvelopeKind::Typed => Arc::new(TypedCodec::new(relay)),
        }
    }
}

impl fmt::Display for EnvelopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvelopeKind::JsonRpc => write!(f, "jsonrpc"),
            EnvelopeKind::Typed => write!(f, "typed"),
        }
    }
}
