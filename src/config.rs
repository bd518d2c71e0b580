use std::env;

use crate::error::{PipeError, Result};

/// Default API base. Overridable for gateways and self-hosted proxies.
pub const DEFAULT_BASE_URL: &str = "https://api.mistral.ai/v1";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 180;

/// Attempt bound for non-streaming completions (rate-limit retries only).
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Attempt bound for streaming completions.
pub const DEFAULT_MAX_STREAM_RETRIES: u32 = 5;

/// Connection settings for the Mistral API.
///
/// Built once at startup (from the environment or the builder methods) and
/// passed into each client; nothing mutates it afterwards. The API key is
/// validated lazily: construction always succeeds, and the first operation
/// that would touch the network fails with a configuration error when the
/// key is absent.
#[derive(Debug, Clone)]
pub struct MistralConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub max_stream_retries: u32,
}

impl Default for MistralConfig {
    fn default() -> Self {
        MistralConfig {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            max_stream_retries: DEFAULT_MAX_STREAM_RETRIES,
        }
    }
}

impl MistralConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `MISTRAL_API_KEY` and (optionally) `MISTRAL_API_BASE_URL`.
    pub fn from_env() -> Self {
        let api_key = env::var("MISTRAL_API_KEY").ok().filter(|k| !k.is_empty());
        let base_url =
            env::var("MISTRAL_API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        MistralConfig {
            api_key,
            base_url,
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_max_stream_retries(mut self, max_stream_retries: u32) -> Self {
        self.max_stream_retries = max_stream_retries;
        self
    }

    /// The base URL without a trailing slash, ready for endpoint joining.
    pub fn endpoint_base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Returns the API key, or the configuration error every
    /// network-touching operation must fail with when the key is missing.
    pub fn api_key(&self) -> Result<&str> {
        match self.api_key.as_deref() {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(PipeError::Config(
                "MISTRAL_API_KEY is not set; refusing to call the API".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_a_config_error() {
        let config = MistralConfig::new();
        assert!(matches!(config.api_key(), Err(PipeError::Config(_))));
    }

    #[test]
    fn empty_key_is_a_config_error() {
        let config = MistralConfig::new().with_api_key("");
        assert!(matches!(config.api_key(), Err(PipeError::Config(_))));
    }

    #[test]
    fn builder_overrides_defaults() {
        let config = MistralConfig::new()
            .with_api_key("sk-test")
            .with_base_url("http://localhost:8000/v1/")
            .with_timeout_secs(30);

        assert_eq!(config.api_key().unwrap(), "sk-test");
        assert_eq!(config.endpoint_base(), "http://localhost:8000/v1");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.max_retries, DEFAULT_MAX_RETRIES);
        assert_eq!(config.max_stream_retries, DEFAULT_MAX_STREAM_RETRIES);
    }
}
