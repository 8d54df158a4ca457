//! Command-line arguments.

use crate::config::ConfigLoader;
use crate::envelope::EnvelopeKind;
use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(name = "llm-relay", version, about = "Chat completion relay over stdio and HTTP")]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, env = "RELAY_CONFIG")]
    pub config: Option<String>,

    /// Serve line-delimited JSON on stdin/stdout instead of HTTP
    #[arg(long)]
    pub stdio: bool,

    /// HTTP bind host
    #[arg(long)]
    pub host: Option<String>,

    /// HTTP bind port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Envelope encoding for stdio
    #[arg(long, value_enum)]
    pub envelope: Option<EnvelopeKind>,

    /// Log level or filter directive
    #[arg(long)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

impl Cli {
    /// Configuration keys set by flags that were given
    pub fn overrides(&self) -> Vec<(&'static str, String)> {
        let mut overrides = Vec::new();

        if self.stdio {
            overrides.push(("server.stdio", "true".to_string()));
        }
        if let Some(envelope) = self.envelope {
            overrides.push(("server.envelope", envelope.to_string()));
        }
        if let Some(host) = &self.host {
            overrides.push(("http.host", host.clone()));
        }
        if let Some(port) = self.port {
            overrides.push(("http.port", port.to_string()));
        }
        if let Some(level) = &self.log_level {
            overrides.push(("logging.level", level.clone()));
        }
        if self.log_json {
            overrides.push(("logging.json", "true".to_string()));
        }

        overrides
    }

    /// Loader with every source applied, flags last
    pub fn loader(&self) -> ConfigLoader {
        self.overrides().into_iter().fold(
            ConfigLoader::new()
                .load_from_file(self.config.as_deref())
                .load_from_env(),
            |loader, (key, value)| loader.set(key, value),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_no_overrides() {
        let cli = Cli::parse_from(["llm-relay"]);
        assert!(cli.overrides().is_empty());
    }

    #[test]
    fn test_flags_become_overrides() {
        let cli = Cli::parse_from([
            "llm-relay",
            "--stdio",
            "--envelope",
            "typed",
            "--port",
            "9000",
            "--log-json",
        ]);
        let overrides = cli.overrides();
        assert!(overrides.contains(&("server.stdio", "true".to_string())));
        assert!(overrides.contains(&("server.envelope", "typed".to_string())));
        assert!(overrides.contains(&("http.port", "9000".to_string())));
        assert!(overrides.contains(&("logging.json", "true".to_string())));
    }

    #[test]
    fn test_invalid_envelope_rejected() {
        assert!(Cli::try_parse_from(["llm-relay", "--envelope", "xml"]).is_err());
    }
}
