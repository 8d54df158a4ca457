//! Transports: line-delimited stdio and HTTP with SSE streaming.

pub mod error;
pub mod http;
pub mod sse;
pub mod stdio;

pub use error::HttpError;
pub use stdio::StdioTransport;

use crate::config::RelayConfig;
use crate::error::Result;
use crate::relay::Relay;

/// Run the transport selected by `config` until it stops
pub async fn run(config: &RelayConfig, relay: Relay) -> Result<()> {
    if config.server.stdio {
        let codec = config.server.envelope.codec(relay);
        StdioTransport::new(codec).run().await
    } else {
        http::serve(relay, &config.http).await
    }
}
