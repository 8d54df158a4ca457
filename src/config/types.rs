use crate::envelope::EnvelopeKind;
use crate::llm::LlmConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Server identity and mode selection
    pub server: ServerConfig,

    /// HTTP transport settings
    pub http: HttpConfig,

    /// Provider settings
    pub openai: OpenAiConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Name reported in `serverInfo`
    pub name: String,

    /// Serve line-delimited JSON on stdio instead of HTTP
    pub stdio: bool,

    /// Envelope encoding for the stdio transport
    pub envelope: EnvelopeKind,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "openai-mcp".to_string(),
            stdio: false,
            envelope: EnvelopeKind::JsonRpc,
        }
    }
}

/// HTTP transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind host
    pub host: String,

    /// Bind port
    pub port: u16,

    /// Enable permissive CORS
    pub cors_enabled: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors_enabled: true,
        }
    }
}

impl HttpConfig {
    pub fn bind_addr(&self) -> crate::error::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| crate::error::Error::Config(format!("Invalid bind address: {}", e)))
    }
}

/// Provider configuration
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// API key; never serialized
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Alternative API base URL
    pub api_base: Option<String>,

    /// Organization id
    pub organization_id: Option<String>,
}

impl OpenAiConfig {
    pub fn to_llm_config(&self) -> LlmConfig {
        let mut config = match self.api_key.as_deref().filter(|k| !k.is_empty()) {
            Some(key) => LlmConfig::openai(key),
            None => LlmConfig::default(),
        };
        if let Some(api_base) = &self.api_base {
            config = config.with_api_base(api_base);
        }
        if let Some(org) = &self.organization_id {
            config = config.with_organization(org);
        }
        config
    }
}

impl fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("organization_id", &self.organization_id)
            .finish()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level or filter directive, used when `RUST_LOG` is unset
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    pub json: bool,

    /// Also write logs to this file
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}
