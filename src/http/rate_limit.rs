//! Client-side share of the PagerDuty request quota
//!
//! PagerDuty meters REST calls per account rather than per token, so every
//! connection into one account draws from the same 960 requests per minute.
//! Each client holds a governor token bucket sized to its share of that
//! budget.

use crate::config::HttpSettings;
use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Governor};
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::warn;

/// REST requests PagerDuty accepts per account per minute
pub const ACCOUNT_REQUESTS_PER_MINUTE: u32 = 960;

/// Token bucket sizing for one client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimiterConfig {
    /// Steady-state requests per second
    pub requests_per_second: u32,
    /// Burst size (max tokens in bucket)
    pub burst_size: u32,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self::account_share(1)
    }
}

impl RateLimiterConfig {
    /// Create a new rate limiter config
    pub fn new(requests_per_second: u32, burst_size: u32) -> Self {
        Self {
            requests_per_second,
            burst_size,
        }
    }

    /// Even split of the account quota between `connections` clients
    ///
    /// Never drops below one request per second.
    pub fn account_share(connections: u32) -> Self {
        let per_second = (ACCOUNT_REQUESTS_PER_MINUTE / 60 / connections.max(1)).max(1);
        Self::new(per_second, per_second)
    }

    /// Quota from the connection's `http` settings
    pub fn from_settings(settings: &HttpSettings) -> Self {
        Self::new(settings.requests_per_second, settings.burst_size)
    }

    /// Sustained requests per minute this bucket lets through
    pub fn requests_per_minute(&self) -> u32 {
        self.requests_per_second.saturating_mul(60)
    }

    /// Whether this client alone can outrun the account quota
    pub fn exceeds_account_quota(&self) -> bool {
        self.requests_per_minute() > ACCOUNT_REQUESTS_PER_MINUTE
    }
}

/// Token bucket rate limiter
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Arc<Governor<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given config
    ///
    /// A zero rate or burst is raised to one.
    pub fn new(config: &RateLimiterConfig) -> Self {
        if config.exceeds_account_quota() {
            warn!(
                requests_per_minute = config.requests_per_minute(),
                account_limit = ACCOUNT_REQUESTS_PER_MINUTE,
                "client quota is above the account limit, expect HTTP 429"
            );
        }

        let quota = Quota::per_second(
            NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN),
        )
        .allow_burst(NonZeroU32::new(config.burst_size).unwrap_or(NonZeroU32::MIN));

        Self {
            limiter: Arc::new(Governor::direct(quota)),
        }
    }

    /// Wait until a request can be made
    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }

    /// Try to acquire a permit, returning immediately
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter").finish()
    }
}
