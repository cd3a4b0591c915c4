//! Client configuration.
//!
//! All connection behaviour is controlled through [`ClientConfig`], built
//! via its [`ClientConfigBuilder`]. The config is supplied once at client
//! construction and immutable thereafter — sharing it across tasks is a
//! cheap clone, and two runs can be diffed to understand why they behaved
//! differently.

use std::time::Duration;

use crate::error::OcrError;
use crate::types::DEFAULT_POLL_INTERVAL;

/// Default API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.leapocr.com";

/// User agent attached to every request unless overridden.
///
/// Derived from the crate version at compile time, not from process state.
pub const DEFAULT_USER_AGENT: &str = concat!("leapocr-rust/", env!("CARGO_PKG_VERSION"));

/// Configuration for an [`crate::OcrClient`].
///
/// Built via [`ClientConfig::builder()`].
///
/// # Example
/// ```rust
/// use leapocr::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::builder("sk-test-key")
///     .request_timeout(Duration::from_secs(60))
///     .max_concurrent(5)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Bearer credential attached to every API call.
    pub api_key: String,

    /// Base endpoint, without a trailing slash. Default: `https://api.leapocr.com`.
    pub base_url: String,

    /// Per-request HTTP timeout. Default: 30 s.
    ///
    /// This bounds a single round trip, not a whole job — job-level waiting
    /// is governed by [`crate::ProcessOptions::timeout`].
    pub request_timeout: Duration,

    /// Default interval between status polls. Default: 2 s.
    pub poll_interval: Duration,

    /// Default per-job completion timeout when the caller supplies none.
    /// `None` waits indefinitely.
    pub job_timeout: Option<Duration>,

    /// Default concurrency cap for batch processing. Default: 3.
    pub max_concurrent: usize,

    /// User agent string. Default: [`DEFAULT_USER_AGENT`].
    pub user_agent: String,
}

impl ClientConfig {
    /// Create a new builder seeded with the given API key.
    pub fn builder(api_key: impl Into<String>) -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: ClientConfig {
                api_key: api_key.into(),
                base_url: DEFAULT_BASE_URL.to_string(),
                request_timeout: Duration::from_secs(30),
                poll_interval: DEFAULT_POLL_INTERVAL,
                job_timeout: None,
                max_concurrent: 3,
                user_agent: DEFAULT_USER_AGENT.to_string(),
            },
        }
    }

    /// Shorthand for a config with an API key and all defaults.
    pub fn new(api_key: impl Into<String>) -> Result<Self, OcrError> {
        Self::builder(api_key).build()
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    pub fn job_timeout(mut self, timeout: Duration) -> Self {
        self.config.job_timeout = Some(timeout);
        self
    }

    pub fn max_concurrent(mut self, n: usize) -> Self {
        self.config.max_concurrent = n.max(1);
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(mut self) -> Result<ClientConfig, OcrError> {
        if self.config.api_key.trim().is_empty() {
            return Err(OcrError::Configuration {
                message: "API key is required".into(),
            });
        }
        while self.config.base_url.ends_with('/') {
            self.config.base_url.pop();
        }
        if self.config.base_url.is_empty() {
            return Err(OcrError::Configuration {
                message: "base URL must not be empty".into(),
            });
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ClientConfig::new("key").unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.max_concurrent, 3);
        assert!(config.job_timeout.is_none());
        assert!(config.user_agent.starts_with("leapocr-rust/"));
    }

    #[test]
    fn empty_api_key_rejected() {
        let err = ClientConfig::new("").unwrap_err();
        assert!(matches!(err, OcrError::Configuration { .. }));
        assert!(!err.is_retryable());

        let err = ClientConfig::new("   ").unwrap_err();
        assert!(matches!(err, OcrError::Configuration { .. }));
    }

    #[test]
    fn trailing_slashes_trimmed() {
        let config = ClientConfig::builder("key")
            .base_url("https://ocr.example.com//")
            .build()
            .unwrap();
        assert_eq!(config.base_url, "https://ocr.example.com");
    }

    #[test]
    fn concurrency_floor_is_one() {
        let config = ClientConfig::builder("key").max_concurrent(0).build().unwrap();
        assert_eq!(config.max_concurrent, 1);
    }
}
