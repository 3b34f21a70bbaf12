//! Retry with exponential backoff.
//!
//! The engine wraps metadata resolution in [`RetryPolicy::run`]: up to
//! `max_retries` additional attempts after the first, sleeping
//! `base_delay * multiplier^attempt` (capped at `max_delay`) between them.
//! Only the final attempt's error is surfaced.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use drive_downloader::download::RetryPolicy;
//!
//! let policy = RetryPolicy::new(3, Duration::from_secs(1));
//! assert_eq!(policy.delay_for(0), Duration::from_secs(1));
//! assert_eq!(policy.delay_for(2), Duration::from_secs(4));
//! ```

use std::fmt;
use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, info, warn};

use super::DownloadError;

/// Default number of additional attempts after the first.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default delay before the first retry.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Default maximum delay cap (32 seconds).
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(32);

/// Default backoff multiplier (doubles each attempt).
const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;

/// Errors that know whether repeating the operation may help.
pub trait IsRetryable {
    /// Returns true when another attempt may succeed.
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for DownloadError {
    fn is_retryable(&self) -> bool {
        DownloadError::is_retryable(self)
    }
}

/// Exponential backoff configuration.
///
/// # Delay Calculation
///
/// ```text
/// delay(attempt) = min(base_delay * multiplier^attempt, max_delay) + jitter
/// ```
///
/// `attempt` is 0-indexed, so with defaults the delays are 1s, 2s, 4s.
/// Jitter is off unless [`RetryPolicy::with_jitter`] is used.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
    max_delay: Duration,
    backoff_multiplier: f64,
    max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES, DEFAULT_BASE_DELAY)
    }
}

impl RetryPolicy {
    /// Creates a policy with `max_retries` additional attempts and the given
    /// base delay.
    #[must_use]
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay: DEFAULT_MAX_DELAY,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            max_jitter: Duration::ZERO,
        }
    }

    /// Caps every delay at `max_delay`.
    #[must_use]
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Adds up to `max_jitter` of random delay to every sleep.
    #[must_use]
    pub fn with_jitter(mut self, max_jitter: Duration) -> Self {
        self.max_jitter = max_jitter;
        self
    }

    /// Additional attempts allowed after the first.
    #[must_use]
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Delay slept after the failure of 0-indexed `attempt`.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base_ms = self.base_delay.as_millis() as f64;
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let delay_ms = base_ms * self.backoff_multiplier.powi(exponent);
        let capped_ms = delay_ms.min(self.max_delay.as_millis() as f64);

        Duration::from_millis(capped_ms as u64) + self.jitter()
    }

    fn jitter(&self) -> Duration {
        if self.max_jitter.is_zero() {
            return Duration::ZERO;
        }
        let max_ms = u64::try_from(self.max_jitter.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(rand::thread_rng().gen_range(0..=max_ms))
    }

    /// Runs `operation` until it succeeds, fails with a non-retryable error,
    /// or the retry budget is spent.
    ///
    /// # Errors
    ///
    /// Returns the error of the last attempt.
    pub async fn run<F, Fut, T, E>(&self, op_name: &str, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: IsRetryable + fmt::Display,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        info!(op = op_name, attempts = attempt + 1, "succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let delay = self.delay_for(attempt);
                    attempt += 1;
                    warn!(
                        op = op_name,
                        error = %e,
                        attempt,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis(),
                        "attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    debug!(
                        op = op_name,
                        error = %e,
                        attempts = attempt + 1,
                        retryable = e.is_retryable(),
                        "giving up"
                    );
                    return Err(e);
                }
            }
        }
    }
}
