//! Retry combinator
//!
//! `with_retry` runs one fallible async operation under a [`RetryPolicy`],
//! asking a classifier whether each failure is worth another attempt. Only
//! `ErrorClass::Retryable` failures are retried; everything else returns at
//! once. Every attempt and every backoff sleep races the cancellation token.

use crate::config::RetrySettings;
use crate::error::{Error, ErrorClass, Result};
use crate::types::BackoffType;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Retry policy for rate-limited calls
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Initial delay for backoff
    pub initial_backoff: Duration,
    /// Maximum delay for backoff
    pub max_backoff: Duration,
    /// Type of backoff strategy
    pub backoff_type: BackoffType,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetrySettings::default())
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            initial_backoff: Duration::from_millis(settings.initial_backoff_ms),
            max_backoff: Duration::from_millis(settings.max_backoff_ms),
            backoff_type: settings.backoff_type,
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Set the attempt budget
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Set backoff configuration
    #[must_use]
    pub fn with_backoff(
        mut self,
        backoff_type: BackoffType,
        initial: Duration,
        max: Duration,
    ) -> Self {
        self.backoff_type = backoff_type;
        self.initial_backoff = initial;
        self.max_backoff = max;
        self
    }

    /// Calculate backoff delay after the given zero-based failed attempt
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let delay = match self.backoff_type {
            BackoffType::Constant => self.initial_backoff,
            BackoffType::Linear => self.initial_backoff.saturating_mul(attempt + 1),
            BackoffType::Exponential => {
                let factor = 2u32.saturating_pow(attempt);
                self.initial_backoff.saturating_mul(factor)
            }
        };

        std::cmp::min(delay, self.max_backoff)
    }

    /// Delay before the next attempt, honouring an upstream `Retry-After`
    fn delay_for(&self, attempt: u32, error: &Error) -> Duration {
        let computed = self.calculate_backoff(attempt);
        match error.retry_after() {
            Some(secs) => computed.max(Duration::from_secs(secs)).min(self.max_backoff),
            None => computed,
        }
    }
}

/// Run `op` until it succeeds, fails non-retryably, or the policy gives up
pub async fn with_retry<T, F, Fut, C>(
    operation: &str,
    mut op: F,
    policy: &RetryPolicy,
    classify: C,
    cancel: &CancellationToken,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    C: Fn(&Error) -> ErrorClass,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(Error::Cancelled),
            outcome = op() => outcome,
        };

        let err = match outcome {
            Ok(value) => {
                if attempt > 0 {
                    debug!("{operation} succeeded after {} attempts", attempt + 1);
                }
                return Ok(value);
            }
            Err(err) => err,
        };

        if classify(&err) != ErrorClass::Retryable {
            return Err(err);
        }

        attempt += 1;
        if attempt >= max_attempts {
            warn!("{operation} still rate limited after {attempt} attempts, giving up");
            return Err(Error::RetriesExhausted {
                operation: operation.to_string(),
                attempts: attempt,
                source: Box::new(err),
            });
        }

        let delay = policy.delay_for(attempt - 1, &err);
        warn!(
            "{operation} rate limited, attempt {}/{}, retrying in {:?}",
            attempt, max_attempts, delay
        );

        tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(Error::Cancelled),
            () = tokio::time::sleep(delay) => {}
        }
    }
}
