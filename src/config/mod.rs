//! Configuration for the LinkedIn tools.
//!
//! Built once at startup, then shared read-only. Changing it requires a restart.

mod error;

pub use error::ConfigError;

use crate::resilience::RetryConfig;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use url::Url;

/// Default LinkedIn REST base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.linkedin.com/rest";

/// Default `LinkedIn-Version` header value.
pub const DEFAULT_API_VERSION: &str = "202501";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Primary access token variable.
pub const ENV_ACCESS_TOKEN: &str = "LINKEDIN_ACCESS_TOKEN";
/// Community Management access token variable.
pub const ENV_COMMUNITY_ACCESS_TOKEN: &str = "LINKEDIN_COMMUNITY_ACCESS_TOKEN";
/// API version variable.
pub const ENV_API_VERSION: &str = "LINKEDIN_API_VERSION";
/// Base URL variable.
pub const ENV_BASE_URL: &str = "LINKEDIN_BASE_URL";
/// Timeout variable, in seconds.
pub const ENV_TIMEOUT: &str = "LINKEDIN_TIMEOUT";
/// Debug flag variable.
pub const ENV_DEBUG: &str = "DEBUG";

/// LinkedIn tools configuration.
#[derive(Debug, Clone)]
pub struct LinkedInConfig {
    access_token: SecretString,
    community_access_token: Option<SecretString>,
    api_version: String,
    base_url: String,
    timeout: Duration,
    debug: bool,
    retry: RetryConfig,
}

impl LinkedInConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> LinkedInConfigBuilder {
        LinkedInConfigBuilder::new()
    }

    /// Loads configuration from environment variables.
    ///
    /// Reads `LINKEDIN_ACCESS_TOKEN` (required), `LINKEDIN_COMMUNITY_ACCESS_TOKEN`,
    /// `LINKEDIN_API_VERSION`, `LINKEDIN_BASE_URL`, `LINKEDIN_TIMEOUT` and `DEBUG`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let mut builder = Self::builder();

        if let Some(token) = var(ENV_ACCESS_TOKEN) {
            builder = builder.access_token(token);
        }
        if let Some(token) = var(ENV_COMMUNITY_ACCESS_TOKEN) {
            builder = builder.community_access_token(token);
        }
        if let Some(version) = var(ENV_API_VERSION) {
            builder = builder.api_version(version.trim());
        }
        if let Some(url) = var(ENV_BASE_URL) {
            builder = builder.base_url(url.trim());
        }
        if let Some(timeout) = var(ENV_TIMEOUT) {
            let secs = timeout.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                name: ENV_TIMEOUT,
                message: format!("'{}' is not a number of seconds", timeout),
            })?;
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(flag) = var(ENV_DEBUG) {
            builder = builder.debug(matches!(
                flag.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            ));
        }

        builder.build()
    }

    /// Primary (advertising) access token.
    pub fn access_token(&self) -> &SecretString {
        &self.access_token
    }

    /// Secondary (Community Management) access token, if configured.
    pub fn community_access_token(&self) -> Option<&SecretString> {
        self.community_access_token.as_ref()
    }

    /// `LinkedIn-Version` header value.
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// REST base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether debug logging is enabled.
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Retry policy.
    pub fn retry(&self) -> &RetryConfig {
        &self.retry
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_access_token(ENV_ACCESS_TOKEN, self.access_token.expose_secret())?;
        if let Some(token) = &self.community_access_token {
            validate_access_token(ENV_COMMUNITY_ACCESS_TOKEN, token.expose_secret())?;
        }
        validate_api_version(&self.api_version)?;

        match Url::parse(&self.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(_) => {
                return Err(ConfigError::InvalidValue {
                    name: ENV_BASE_URL,
                    message: "must be an http:// or https:// URL".to_string(),
                })
            }
            Err(e) => {
                return Err(ConfigError::InvalidValue {
                    name: ENV_BASE_URL,
                    message: e.to_string(),
                })
            }
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: ENV_TIMEOUT,
                message: "must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}

/// Checks that a token is longer than 20 characters of `[A-Za-z0-9_-]`.
pub fn validate_access_token(name: &'static str, token: &str) -> Result<(), ConfigError> {
    let well_formed = token.len() > 20
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if well_formed {
        Ok(())
    } else {
        Err(ConfigError::InvalidCredential { name })
    }
}

/// Checks that a version is a plausible `YYYYMM` string.
pub fn validate_api_version(version: &str) -> Result<(), ConfigError> {
    let month = version.get(4..6).and_then(|m| m.parse::<u32>().ok());
    let digits = version.len() == 6 && version.chars().all(|c| c.is_ascii_digit());

    match month {
        Some(1..=12) if digits => Ok(()),
        _ => Err(ConfigError::InvalidApiVersion(version.to_string())),
    }
}

/// Builder for [`LinkedInConfig`].
#[derive(Debug, Default)]
pub struct LinkedInConfigBuilder {
    access_token: Option<SecretString>,
    community_access_token: Option<SecretString>,
    api_version: Option<String>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    debug: bool,
    retry: Option<RetryConfig>,
}

impl LinkedInConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the primary access token.
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(SecretString::new(token.into()));
        self
    }

    /// Sets the Community Management access token.
    pub fn community_access_token(mut self, token: impl Into<String>) -> Self {
        self.community_access_token = Some(SecretString::new(token.into()));
        self
    }

    /// Sets the API version.
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Sets the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Enables debug logging.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Sets the retry policy.
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> Result<LinkedInConfig, ConfigError> {
        let config = LinkedInConfig {
            access_token: self.access_token.ok_or(ConfigError::MissingCredential {
                name: ENV_ACCESS_TOKEN,
            })?,
            community_access_token: self.community_access_token,
            api_version: self.api_version.unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            base_url: self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            debug: self.debug,
            retry: self.retry.unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const TOKEN: &str = "AQV_abcdefghijklmnopqrstuvwxyz-0123456789";

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_applied() {
        let config = LinkedInConfig::builder().access_token(TOKEN).build().unwrap();
        assert_eq!(config.api_version(), DEFAULT_API_VERSION);
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.retry().max_retries, 3);
        assert!(config.community_access_token().is_none());
        assert!(!config.debug());
    }

    #[test]
    fn missing_token_rejected() {
        let err = LinkedInConfig::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err, ConfigError::MissingCredential { name: ENV_ACCESS_TOKEN });
    }

    #[test]
    fn short_or_malformed_tokens_rejected() {
        assert!(validate_access_token("t", "short").is_err());
        assert!(validate_access_token("t", "abcdefghijklmnopqrstuvwxyz!").is_err());
        assert!(validate_access_token("t", TOKEN).is_ok());
    }

    #[test]
    fn reads_environment() {
        let config = LinkedInConfig::from_lookup(lookup(&[
            (ENV_ACCESS_TOKEN, TOKEN),
            (ENV_COMMUNITY_ACCESS_TOKEN, TOKEN),
            (ENV_API_VERSION, "202406"),
            (ENV_DEBUG, "true"),
            (ENV_TIMEOUT, "5"),
        ]))
        .unwrap();

        assert_eq!(config.api_version(), "202406");
        assert!(config.community_access_token().is_some());
        assert!(config.debug());
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn bad_version_rejected() {
        let err = LinkedInConfig::from_lookup(lookup(&[
            (ENV_ACCESS_TOKEN, TOKEN),
            (ENV_API_VERSION, "2024-06"),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::InvalidApiVersion("2024-06".to_string()));
        assert!(validate_api_version("202413").is_err());
    }

    #[test]
    fn bad_base_url_rejected() {
        let err = LinkedInConfig::builder()
            .access_token(TOKEN)
            .base_url("ftp://example.com")
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: ENV_BASE_URL, .. }));
        assert!(LinkedInConfig::builder().access_token(TOKEN).base_url("not a url").build().is_err());
    }

    #[test]
    fn bad_community_token_rejected() {
        let err = LinkedInConfig::from_lookup(lookup(&[
            (ENV_ACCESS_TOKEN, TOKEN),
            (ENV_COMMUNITY_ACCESS_TOKEN, "nope"),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidCredential { name: ENV_COMMUNITY_ACCESS_TOKEN }
        );
    }
}
