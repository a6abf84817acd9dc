//! HTTP client for the PagerDuty REST API
//!
//! Provides a small HTTP client that handles:
//! - Versioned `Accept` and JSON `Content-Type` headers
//! - Token authentication
//! - Rate limiting to stay inside the account quota
//! - Decoding of the upstream error envelope into `Error::Api`

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use crate::auth::Credential;
use crate::config::{ConnectionConfig, DEFAULT_API_URL};
use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, ACCEPT, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Accept header selecting REST API v2
pub const ACCEPT_V2: &str = "application/vnd.pagerduty+json;version=2";

/// Percent-encode a value as exactly one URL path segment
///
/// `/`, `?`, `#` and `%` are escaped so an id can never reach another
/// endpoint. `.` and `..` are rejected because URL parsing resolves them
/// even when escaped.
pub fn path_segment(value: &str) -> Result<String> {
    if matches!(value, "." | "..") {
        return Err(Error::invalid_value(
            "path segment",
            format!("'{value}' is not a valid identifier"),
        ));
    }

    let mut url = Url::parse("http://segment.invalid/")?;
    url.path_segments_mut()
        .map_err(|()| Error::Other("segment base URL cannot hold a path".to_string()))?
        .clear()
        .push(value);
    Ok(url.path().trim_start_matches('/').to_string())
}

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL for all requests
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Rate limiter configuration
    pub rate_limit: Option<RateLimiterConfig>,
    /// Default headers for all requests
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(30),
            rate_limit: Some(RateLimiterConfig::default()),
            default_headers: HashMap::new(),
            user_agent: format!("pagerduty-tables/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }

    /// Derive transport settings from a connection config
    pub fn from_connection(config: &ConnectionConfig) -> Self {
        let mut builder = Self::builder()
            .base_url(config.api_url())
            .timeout(config.http.timeout())
            .rate_limit(RateLimiterConfig::from_settings(&config.http));

        if let Some(agent) = &config.http.user_agent {
            builder = builder.user_agent(agent);
        }

        builder.build()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set rate limiter
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Disable rate limiting
    pub fn no_rate_limit(mut self) -> Self {
        self.config.rate_limit = None;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// Configuration for a single request
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Query parameters; keys may repeat (`statuses[]=a&statuses[]=b`)
    pub query: Vec<(String, String)>,
    /// Request headers
    pub headers: HashMap<String, String>,
}

impl RequestConfig {
    /// Create a new request config
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Add several query parameters
    #[must_use]
    pub fn extend_query(mut self, params: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(params);
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}

/// HTTP client bound to one API endpoint and credential
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    credential: Option<Credential>,
    rate_limiter: Option<RateLimiter>,
}

impl HttpClient {
    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            config,
            credential: None,
            rate_limiter,
        })
    }

    /// Create a client that authenticates every request
    pub fn with_credential(config: HttpClientConfig, credential: Credential) -> Result<Self> {
        let mut client = Self::with_config(config)?;
        client.credential = Some(credential);
        Ok(client)
    }

    /// Base URL requests are resolved against
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Make a GET request
    pub async fn get(&self, path: &str, config: RequestConfig) -> Result<Response> {
        self.request(Method::GET, path, config).await
    }

    /// Make a request, mapping non-2xx statuses to `Error::Api`
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        config: RequestConfig,
    ) -> Result<Response> {
        let full_url = self.build_url(path);

        if let Some(ref limiter) = self.rate_limiter {
            limiter.wait().await;
        }

        let mut req = self
            .client
            .request(method.clone(), &full_url)
            .header(ACCEPT, ACCEPT_V2)
            .header(CONTENT_TYPE, "application/json");

        for (key, value) in &self.config.default_headers {
            req = req.header(key.as_str(), value.as_str());
        }

        for (key, value) in &config.headers {
            req = req.header(key.as_str(), value.as_str());
        }

        if !config.query.is_empty() {
            req = req.query(&config.query);
        }

        if let Some(ref credential) = self.credential {
            req = credential.apply(req);
        }

        let response = req.send().await?;
        let status = response.status();

        if status.is_success() {
            debug!("Request succeeded: {} {}", method, full_url);
            return Ok(response);
        }

        let err = error_from_response(response).await;
        warn!(status = status.as_u16(), url = %full_url, "PagerDuty request failed: {err}");
        Err(err)
    }

    /// Make a GET request and parse the JSON response
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        config: RequestConfig,
    ) -> Result<T> {
        let response = self.get(path, config).await?;
        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| Error::decode(format!("GET {path}: {e}")))
    }

    /// Check if rate limiting is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }

    /// Build full URL from path
    fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        let base = self.config.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("has_credential", &self.credential.is_some())
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// Upstream error envelope: `{"error": {"message", "code", "errors"}}`
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    errors: Vec<String>,
}

/// Turn a failed response into a structured API error
async fn error_from_response(response: Response) -> Error {
    let status = response.status();
    let retry_after_seconds = extract_retry_after(response.headers());
    let body = response.text().await.unwrap_or_default();

    let (message, code, errors) = match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) => (
            envelope.error.message.unwrap_or_else(|| default_message(status)),
            envelope.error.code,
            envelope.error.errors,
        ),
        Err(_) if body.trim().is_empty() => (default_message(status), None, Vec::new()),
        Err(_) => (body, None, Vec::new()),
    };

    Error::Api {
        status: status.as_u16(),
        message,
        code,
        errors,
        retry_after_seconds,
    }
}

fn default_message(status: reqwest::StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("error returned from endpoint")
        .to_string()
}

/// Extract retry-after header value
fn extract_retry_after(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
}
