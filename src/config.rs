//! Connection configuration
//!
//! Everything a connection needs to reach PagerDuty: the API token, an
//! optional base URL override, HTTP transport settings and the retry policy
//! applied around rate-limited calls. Configs load from JSON or YAML files.

use crate::error::{Error, Result};
use crate::http::ACCOUNT_REQUESTS_PER_MINUTE;
use crate::types::{BackoffType, OptionStringExt};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default PagerDuty REST API endpoint
pub const DEFAULT_API_URL: &str = "https://api.pagerduty.com";

/// Environment variable consulted when no token is configured
pub const TOKEN_ENV_VAR: &str = "PAGERDUTY_TOKEN";

// ============================================================================
// Connection Config
// ============================================================================

/// Configuration for one logical connection
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// API token; falls back to `PAGERDUTY_TOKEN` when unset
    #[serde(default)]
    pub token: Option<String>,

    /// Override for the API base URL
    #[serde(default)]
    pub api_url_override: Option<String>,

    /// HTTP transport settings
    #[serde(default)]
    pub http: HttpSettings,

    /// Retry settings for rate-limited calls
    #[serde(default)]
    pub retry: RetrySettings,
}

impl ConnectionConfig {
    /// Create an empty config (token from the environment, default URL)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the token
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the API base URL override
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url_override = Some(url.into());
        self
    }

    /// Set retry settings
    #[must_use]
    pub fn with_retry(mut self, retry: RetrySettings) -> Self {
        self.retry = retry;
        self
    }

    /// Set HTTP settings
    #[must_use]
    pub fn with_http(mut self, http: HttpSettings) -> Self {
        self.http = http;
        self
    }

    /// Load a config from a JSON or YAML file (by extension)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        let config: Self = if is_json {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };

        config.validate()?;
        Ok(config)
    }

    /// The configured token, ignoring empty strings
    pub fn configured_token(&self) -> Option<String> {
        self.token.clone().none_if_empty()
    }

    /// The base URL requests go to
    pub fn api_url(&self) -> &str {
        self.api_url_override
            .as_deref()
            .filter(|u| !u.is_empty())
            .unwrap_or(DEFAULT_API_URL)
    }

    /// Validate the config
    pub fn validate(&self) -> Result<()> {
        if let Some(url) = self.api_url_override.as_deref().filter(|u| !u.is_empty()) {
            let parsed = url::Url::parse(url)?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(Error::invalid_value(
                    "api_url_override",
                    format!("unsupported scheme '{}'", parsed.scheme()),
                ));
            }
        }

        if self.retry.max_attempts == 0 {
            return Err(Error::invalid_value(
                "retry.max_attempts",
                "must be at least 1",
            ));
        }

        if self.http.requests_per_second == 0 || self.http.burst_size == 0 {
            return Err(Error::invalid_value(
                "http.requests_per_second",
                "rate limit quota must be non-zero",
            ));
        }

        Ok(())
    }
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("api_url_override", &self.api_url_override)
            .field("http", &self.http)
            .field("retry", &self.retry)
            .finish()
    }
}

// ============================================================================
// HTTP Settings
// ============================================================================

/// HTTP transport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Client-side request quota
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,

    /// Token bucket size
    #[serde(default = "default_burst_size")]
    pub burst_size: u32,

    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_requests_per_second() -> u32 {
    ACCOUNT_REQUESTS_PER_MINUTE / 60
}

fn default_burst_size() -> u32 {
    default_requests_per_second()
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            requests_per_second: default_requests_per_second(),
            burst_size: default_burst_size(),
            user_agent: None,
        }
    }
}

impl HttpSettings {
    /// Request timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ============================================================================
// Retry Settings
// ============================================================================

/// Retry settings for rate-limited calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Total attempts per call, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// First backoff delay in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Backoff ceiling in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Backoff curve
    #[serde(default)]
    pub backoff_type: BackoffType,
}

fn default_max_attempts() -> u32 {
    10
}

fn default_initial_backoff_ms() -> u64 {
    100
}

fn default_max_backoff_ms() -> u64 {
    30_000
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            backoff_type: BackoffType::default(),
        }
    }
}
