use super::types::RelayConfig;
use anyhow::{Context, Result};
use config::{Config, Environment, File, Map};

/// Conventional variables and the configuration keys they set
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("OPENAI_API_KEY", "openai.api_key"),
    ("OPENAI_BASE_URL", "openai.api_base"),
    ("OPENAI_ORG_ID", "openai.organization_id"),
    ("PORT", "http.port"),
    ("USE_STDIO", "server.stdio"),
    ("RELAY_ENVELOPE", "server.envelope"),
    ("LOG_LEVEL", "logging.level"),
];

/// Configuration loader with builder pattern.
///
/// Later sources win: defaults, file, `RELAY_*` environment, conventional
/// variables, explicit overrides.
pub struct ConfigLoader {
    config_file: Option<String>,
    env_vars: Option<Map<String, String>>,
    overrides: Vec<(String, String)>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            config_file: None,
            env_vars: None,
            overrides: Vec::new(),
        }
    }

    /// Load configuration from file
    pub fn load_from_file(mut self, path: Option<&str>) -> Self {
        self.config_file = path.map(String::from);
        self
    }

    /// Load configuration from the process environment
    pub fn load_from_env(self) -> Self {
        let vars = std::env::vars().collect();
        self.load_from_env_vars(vars)
    }

    /// Load configuration from the given environment snapshot
    pub fn load_from_env_vars(mut self, vars: Map<String, String>) -> Self {
        self.env_vars = Some(vars);
        self
    }

    /// Set a key explicitly, e.g. from a command-line flag
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.push((key.into(), value.into()));
        self
    }

    /// Build the final configuration
    pub fn build(self) -> Result<RelayConfig> {
        let mut builder = Config::builder().add_source(Config::try_from(&RelayConfig::default())?);

        if let Some(config_path) = &self.config_file {
            builder = builder.add_source(File::with_name(config_path).required(true));
        } else {
            builder = builder
                .add_source(File::with_name("llm-relay").required(false))
                .add_source(File::with_name("config/llm-relay").required(false));
        }

        if let Some(vars) = &self.env_vars {
            builder = builder.add_source(
                Environment::with_prefix("RELAY")
                    .prefix_separator("_")
                    .separator("__")
                    .source(Some(vars.clone())),
            );

            for (var, key) in ENV_OVERRIDES {
                let value = vars.get(*var).filter(|v| !v.is_empty()).cloned();
                builder = builder
                    .set_override_option(*key, value)
                    .with_context(|| format!("Failed to apply {}", var))?;
            }
        }

        for (key, value) in self.overrides {
            builder = builder
                .set_override(key.as_str(), value)
                .with_context(|| format!("Failed to apply override for {}", key))?;
        }

        let config: RelayConfig = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
