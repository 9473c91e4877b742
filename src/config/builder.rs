//! Client configuration and builder.
//!
//! The builder validates at [`build()`](ClientConfigBuilder::build) time:
//! a usable API key is required, and defaults for model and base URL are
//! resolved from the environment (`ANTHROPIC_MODEL`, `ANTHROPIC_BASE_URL`)
//! before falling back to the compiled-in constants.

use super::{DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, ENV_BASE_URL, ENV_MODEL};
use crate::error::{Error, Result};

/// Configuration for a [`crate::ChatClient`].
///
/// Use [`ClientConfig::builder()`] to create one.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
}

impl ClientConfig {
    /// Create a new builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// The API key sent with each request.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// The model requested for completions.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The API base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Default `max_tokens` for requests that do not specify one.
    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
    max_tokens: Option<u32>,
}

impl ClientConfigBuilder {
    /// Set the API key. Required.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the model, overriding the environment and the default.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the API base URL, overriding the environment and the default.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the default generation budget in tokens.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ApiKey`] when no non-empty API key was provided and
    /// [`Error::InvalidRequest`] for a zero `max_tokens`.
    pub fn build(self) -> Result<ClientConfig> {
        let api_key = match self.api_key {
            Some(key) if !key.is_empty() => key,
            _ => return Err(Error::ApiKey),
        };

        let model = self
            .model
            .or_else(|| non_empty_env(ENV_MODEL))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let base_url = self
            .base_url
            .or_else(|| non_empty_env(ENV_BASE_URL))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let max_tokens = self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS);
        if max_tokens == 0 {
            return Err(Error::invalid_request("max_tokens must be positive"));
        }

        Ok(ClientConfig {
            api_key,
            model,
            base_url,
            max_tokens,
        })
    }
}

fn non_empty_env(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn types_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ClientConfig>();
        assert_send_sync::<ClientConfigBuilder>();
    }

    #[test]
    fn builder_with_api_key_uses_defaults() {
        let config = ClientConfig::builder().api_key("test-key").build().unwrap();
        assert_eq!(config.api_key(), "test-key");
        assert_eq!(config.max_tokens(), DEFAULT_MAX_TOKENS);
        // Model/base URL may come from the environment in dev shells, but
        // they are never empty.
        assert!(!config.model().is_empty());
        assert!(!config.base_url().is_empty());
    }

    #[test]
    fn missing_api_key_is_an_api_key_error() {
        let err = ClientConfig::builder().build().unwrap_err();
        assert!(matches!(err, Error::ApiKey));
        assert!(err.is_auth_error());
    }

    #[test]
    fn empty_api_key_is_rejected() {
        let err = ClientConfig::builder().api_key("").build().unwrap_err();
        assert!(matches!(err, Error::ApiKey));
    }

    #[test]
    fn explicit_options_win() {
        let config = ClientConfig::builder()
            .api_key("k")
            .model("claude-test-model")
            .base_url("http://localhost:8080")
            .max_tokens(128)
            .build()
            .unwrap();
        assert_eq!(config.model(), "claude-test-model");
        assert_eq!(config.base_url(), "http://localhost:8080");
        assert_eq!(config.max_tokens(), 128);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let config = ClientConfig::builder()
            .api_key("k")
            .base_url("http://localhost:8080/")
            .build()
            .unwrap();
        assert_eq!(config.base_url(), "http://localhost:8080");
    }

    #[test]
    fn zero_max_tokens_is_rejected() {
        let err = ClientConfig::builder()
            .api_key("k")
            .max_tokens(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRequest { .. }));
    }
}
