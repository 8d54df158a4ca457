//! # llm-relay
//!
//! A thin relay in front of a chat-completion provider. Requests arrive as
//! line-delimited JSON envelopes on stdio (JSON-RPC 2.0 or a type-tagged
//! form) or over HTTP, are validated against a fixed model allow-list and
//! forwarded to the provider. Streamed completions are relayed as
//! server-sent events.

pub mod cli;
pub mod config;
pub mod envelope;
pub mod error;
pub mod llm;
pub mod logging;
pub mod registry;
pub mod relay;
pub mod transport;
pub mod validation;

pub use config::{ConfigLoader, RelayConfig};
pub use envelope::{EnvelopeCodec, EnvelopeKind};
pub use error::{Error, Result};
pub use registry::ModelRegistry;
pub use relay::{Relay, ServerInfo};
