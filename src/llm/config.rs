//! Provider client settings.

use crate::llm::error::{LlmError, LlmResult};
use secrecy::{ExposeSecret, SecretString};

/// Settings for the provider client
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    /// API key (kept secret)
    pub api_key: Option<SecretString>,
    /// Alternative API base URL
    pub api_base: Option<String>,
    /// Organization id sent with every call
    pub organization_id: Option<String>,
}

impl LlmConfig {
    /// OpenAI settings with the given key
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(SecretString::new(api_key.into().into_boxed_str())),
            ..Default::default()
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    pub fn with_organization(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }

    /// Expose the API key
    pub fn get_api_key(&self) -> Option<&str> {
        self.api_key.as_ref().map(|k| k.expose_secret())
    }

    /// Validate the settings
    pub fn validate(&self) -> LlmResult<()> {
        match self.get_api_key() {
            Some(key) if !key.trim().is_empty() => {}
            _ => {
                return Err(LlmError::Config(
                    "API key is required for the OpenAI provider".to_string(),
                ))
            }
        }

        if let Some(base) = &self.api_base {
            if !(base.starts_with("http://") || base.starts_with("https://")) {
                return Err(LlmError::Config(format!(
                    "API base must be an http(s) URL, got: {}",
                    base
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_config() {
        let config = LlmConfig::openai("sk-test");
        assert_eq!(config.get_api_key(), Some("sk-test"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_key_is_invalid() {
        assert!(LlmConfig::default().validate().is_err());
        assert!(LlmConfig::openai("  ").validate().is_err());
    }

    #[test]
    fn test_api_base_must_be_url() {
        let config = LlmConfig::openai("sk-test").with_api_base("localhost:8080");
        assert!(config.validate().is_err());

        let config = LlmConfig::openai("sk-test").with_api_base("http://localhost:8080/v1");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_debug_does_not_leak_key() {
        let config = LlmConfig::openai("sk-very-secret");
        assert!(!format!("{:?}", config).contains("sk-very-secret"));
    }
}
