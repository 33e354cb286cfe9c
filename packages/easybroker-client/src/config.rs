//! Client configuration: API credential and base URL.

use crate::error::{EasyBrokerError, Result};

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "EASYBROKER_API_KEY";
/// Environment variable overriding the base URL.
pub const BASE_URL_ENV: &str = "EASYBROKER_BASE_URL";
/// Default base URL (EasyBroker staging API).
pub const DEFAULT_BASE_URL: &str = "https://api.stagingeb.com";

/// Resolved client configuration, immutable once the client is built.
///
/// Explicit values always take precedence over the environment.
#[derive(Debug, Clone)]
pub struct Config {
    api_key: String,
    base_url: String,
}

impl Config {
    /// Resolve configuration from explicit values, falling back to
    /// `EASYBROKER_API_KEY` / `EASYBROKER_BASE_URL`.
    pub fn new(api_key: Option<String>, base_url: Option<String>) -> Result<Self> {
        let api_key = api_key
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| EasyBrokerError::Config("API key is required".into()))?;

        let base_url = base_url
            .or_else(|| std::env::var(BASE_URL_ENV).ok())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self { api_key, base_url })
    }

    /// Resolve configuration entirely from the environment.
    pub fn from_env() -> Result<Self> {
        Self::new(None, None)
    }

    /// Replace the base URL (builder-style, before the client is used).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_values_are_used() {
        let config = Config::new(Some("key-123".into()), Some("https://example.com".into())).unwrap();
        assert_eq!(config.api_key(), "key-123");
        assert_eq!(config.base_url(), "https://example.com");
    }

    #[test]
    fn base_url_defaults_to_staging() {
        std::env::remove_var(BASE_URL_ENV);
        let config = Config::new(Some("key-123".into()), None).unwrap();
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn empty_api_key_is_rejected() {
        let err = Config::new(Some(String::new()), None).unwrap_err();
        assert!(matches!(err, EasyBrokerError::Config(_)));
    }

    #[test]
    fn with_base_url_overrides() {
        let config = Config::new(Some("key-123".into()), None)
            .unwrap()
            .with_base_url("http://127.0.0.1:9999");
        assert_eq!(config.base_url(), "http://127.0.0.1:9999");
    }
}
