//! Concrete LLM provider implementations
//!
//! Each provider speaks one hosted HTTP API; [`ProviderConfig`] holds the
//! connection settings they share.

#[cfg(feature = "gemini")]
pub mod gemini;
#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "gemini")]
pub use gemini::GeminiProvider;
#[cfg(feature = "openai")]
pub use openai::OpenAIProvider;

use crate::{LLMError, Result};
use reqwest::Client;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Endpoint, credentials and timeout for an HTTP provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub api_key: String,
    /// Base URL without a trailing slash
    pub api_base: String,
    pub timeout: Duration,
}

impl ProviderConfig {
    pub fn new(api_key: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: trim_base(api_base.into()),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Read `{PREFIX}_API_KEY` (required) and `{PREFIX}_API_BASE` (optional)
    pub fn from_env(prefix: &str, default_base: &str) -> Result<Self> {
        Self::from_lookup(prefix, default_base, |key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(prefix: &str, default_base: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let key_var = format!("{prefix}_API_KEY");
        let api_key = lookup(&key_var).ok_or_else(|| {
            LLMError::ConfigurationError(format!("{key_var} environment variable not set"))
        })?;
        let api_base =
            lookup(&format!("{prefix}_API_BASE")).unwrap_or_else(|| default_base.to_string());

        Ok(Self::new(api_key, api_base))
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = trim_base(api_base.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `{api_base}/{path}`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }

    /// HTTP client honouring the timeout; fails on a blank key
    pub(crate) fn client(&self) -> Result<Client> {
        if self.api_key.trim().is_empty() {
            return Err(LLMError::ConfigurationError(
                "API key must not be empty".to_string(),
            ));
        }
        Ok(Client::builder().timeout(self.timeout).build()?)
    }
}

fn trim_base(base: String) -> String {
    match base.strip_suffix('/') {
        Some(trimmed) => trimmed.to_string(),
        None => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_from_lookup() {
        let config = ProviderConfig::from_lookup(
            "GEMINI",
            "https://example.test/v1",
            lookup(&[("GEMINI_API_KEY", "abc")]),
        )
        .unwrap();
        assert_eq!(config.api_key, "abc");
        assert_eq!(config.api_base, "https://example.test/v1");
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);

        let config = ProviderConfig::from_lookup(
            "OPENAI",
            "https://example.test/v1",
            lookup(&[
                ("OPENAI_API_KEY", "sk"),
                ("OPENAI_API_BASE", "http://localhost:1234/v1/"),
            ]),
        )
        .unwrap();
        assert_eq!(config.api_base, "http://localhost:1234/v1");
    }

    #[test]
    fn test_missing_key() {
        let err = ProviderConfig::from_lookup("GEMINI", "x", lookup(&[])).unwrap_err();
        assert!(matches!(err, LLMError::ConfigurationError(msg) if msg.contains("GEMINI_API_KEY")));
    }

    #[test]
    fn test_endpoint_and_builders() {
        let config = ProviderConfig::new("k", "http://host/v1/")
            .with_timeout(Duration::from_secs(30));
        assert_eq!(config.endpoint("/chat/completions"), "http://host/v1/chat/completions");
        assert_eq!(config.timeout, Duration::from_secs(30));

        let moved = config.with_api_base("http://other");
        assert_eq!(moved.endpoint("models"), "http://other/models");
    }

    #[test]
    fn test_blank_key_rejected() {
        assert!(ProviderConfig::new("  ", "http://host").client().is_err());
        assert!(ProviderConfig::new("k", "http://host").client().is_ok());
    }
}
