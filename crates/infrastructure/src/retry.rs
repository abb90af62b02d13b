//! Bounded retry with a fixed pause between attempts
//!
//! Used when opening the database at startup: a storage volume or a
//! database file that is briefly unavailable should not abort the process.
//! Errors that retrying cannot fix (a broken migration) end the loop early.
//!
//! # Example
//!
//! ```rust,ignore
//! use infrastructure::retry::{RetryPolicy, retry};
//!
//! let policy = RetryPolicy::new(5, Duration::from_secs(20));
//! let pool = retry(&policy, || async { open_pool().await }).await?;
//! ```

use std::{future::Future, time::Duration};

use rand::Rng;
use tracing::{debug, warn};

use crate::config::ConnectRetryConfig;

/// How many times to try and how long to wait in between
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first; zero behaves like one
    pub max_attempts: u32,
    /// Pause after a failed attempt
    pub backoff: Duration,
    /// Random spread applied to the pause (0.0 to 1.0)
    pub jitter_factor: f64,
}

impl RetryPolicy {
    /// Fixed pause, no jitter
    #[must_use]
    pub const fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
            jitter_factor: 0.0,
        }
    }

    /// Spread pauses by up to `factor` of the backoff in either direction
    #[must_use]
    pub fn with_jitter(mut self, factor: f64) -> Self {
        self.jitter_factor = factor.clamp(0.0, 1.0);
        self
    }

    /// Pause to take after a failed attempt
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn pause(&self) -> Duration {
        if self.jitter_factor <= 0.0 || self.backoff.is_zero() {
            return self.backoff;
        }

        let base = self.backoff.as_millis() as f64;
        let spread = base * self.jitter_factor;
        let jittered = base + rand::rng().random_range(-spread..=spread);
        Duration::from_millis(jittered.max(0.0) as u64)
    }
}

impl From<&ConnectRetryConfig> for RetryPolicy {
    fn from(config: &ConnectRetryConfig) -> Self {
        Self::new(config.max_attempts, config.backoff()).with_jitter(0.1)
    }
}

/// Trait for errors that can be checked for retryability
pub trait Retryable {
    /// Returns true if another attempt may succeed
    fn is_retryable(&self) -> bool;
}

impl Retryable for application::ApplicationError {
    fn is_retryable(&self) -> bool {
        Self::is_retryable(self)
    }
}

/// Final result together with the number of attempts it took
#[derive(Debug)]
pub struct RetryResult<T, E> {
    /// The result of the last attempt
    pub result: Result<T, E>,
    /// Number of attempts made (1 = no retries)
    pub attempts: u32,
}

impl<T, E> RetryResult<T, E> {
    /// Check if the operation succeeded
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// Convert to standard Result, discarding metadata
    pub fn into_result(self) -> Result<T, E> {
        self.result
    }
}

/// Run `operation` until it succeeds, fails permanently, or attempts run out
pub async fn with_retry<F, Fut, T, E>(policy: &RetryPolicy, mut operation: F) -> RetryResult<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + std::fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempts = 0u32;

    loop {
        attempts += 1;

        let err = match operation().await {
            Ok(value) => {
                if attempts > 1 {
                    debug!(attempts, "Operation succeeded after retries");
                }
                return RetryResult {
                    result: Ok(value),
                    attempts,
                };
            },
            Err(err) => err,
        };

        if !err.is_retryable() {
            warn!(attempts, error = %err, "Operation failed with non-retryable error");
            return RetryResult {
                result: Err(err),
                attempts,
            };
        }

        if attempts >= max_attempts {
            warn!(attempts, error = %err, "Operation failed, giving up");
            return RetryResult {
                result: Err(err),
                attempts,
            };
        }

        let pause = policy.pause();
        warn!(
            attempt = attempts,
            max_attempts,
            pause_ms = u64::try_from(pause.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "Operation failed, retrying"
        );
        tokio::time::sleep(pause).await;
    }
}

/// Execute with retry, returning only the Result
pub async fn retry<F, Fut, T, E>(policy: &RetryPolicy, operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + std::fmt::Display,
{
    with_retry(policy, operation).await.into_result()
}
