//! Layered configuration: defaults, TOML file, environment, command line.

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::{HttpConfig, LoggingConfig, OpenAiConfig, RelayConfig, ServerConfig};
