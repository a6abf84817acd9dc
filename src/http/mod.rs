//! HTTP client module
//!
//! Thin transport for the PagerDuty REST API.
//!
//! # Features
//!
//! - **Versioned headers**: every call sends the v2 `Accept` header and JSON content type
//! - **Authentication**: `Token token=` credential applied to each request
//! - **Rate Limiting**: governor token bucket sized to a share of the account quota
//! - **Error decoding**: non-2xx bodies become structured `Error::Api` values
//!
//! Retries are not performed here; see [`crate::retry`].

mod client;
mod rate_limit;

pub use client::{
    path_segment, HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig, ACCEPT_V2,
};
pub use rate_limit::{RateLimiter, RateLimiterConfig, ACCOUNT_REQUESTS_PER_MINUTE};
