//! Retry with exponential backoff
//!
//! Used for directions requests only: autocomplete results go stale too fast
//! to be worth retrying. A retry loop running inside a task dies with the
//! task, so superseding a request also abandons its retries.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::NavigationError;

/// Configuration for retry behavior with exponential backoff
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Initial delay before first retry in milliseconds (default: 250ms)
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,

    /// Maximum delay between retries in milliseconds (default: 4000ms)
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// Maximum number of retry attempts (default: 2)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Whether to add jitter (default: true)
    #[serde(default = "default_true")]
    pub jitter_enabled: bool,

    /// Maximum jitter factor (0.0 to 1.0, default: 0.1 = 10%)
    #[serde(default = "default_jitter_factor")]
    pub jitter_factor: f64,
}

const fn default_initial_delay() -> u64 {
    250
}

const fn default_max_delay() -> u64 {
    4_000
}

const fn default_multiplier() -> f64 {
    2.0
}

const fn default_max_retries() -> u32 {
    2
}

const fn default_true() -> bool {
    true
}

const fn default_jitter_factor() -> f64 {
    0.1
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay(),
            max_delay_ms: default_max_delay(),
            multiplier: default_multiplier(),
            max_retries: default_max_retries(),
            jitter_enabled: default_true(),
            jitter_factor: default_jitter_factor(),
        }
    }
}

impl RetryConfig {
    /// Create a new retry configuration with custom parameters
    #[must_use]
    pub const fn new(
        initial_delay_ms: u64,
        max_delay_ms: u64,
        multiplier: f64,
        max_retries: u32,
    ) -> Self {
        Self {
            initial_delay_ms,
            max_delay_ms,
            multiplier,
            max_retries,
            jitter_enabled: true,
            jitter_factor: 0.1,
        }
    }

    /// A policy that never retries
    #[must_use]
    pub const fn disabled() -> Self {
        Self::new(0, 0, 1.0, 0)
    }

    /// Disable jitter
    #[must_use]
    pub const fn without_jitter(mut self) -> Self {
        self.jitter_enabled = false;
        self
    }

    /// Calculate the delay for a given attempt number (0-indexed)
    ///
    /// delay = initial_delay * multiplier^attempt, capped at max_delay, with
    /// optional jitter.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_wrap,
        clippy::cast_sign_loss,
        clippy::cast_possible_truncation
    )]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base_delay = (self.initial_delay_ms as f64) * self.multiplier.powi(attempt as i32);
        let capped_delay = base_delay.min(self.max_delay_ms as f64);

        let final_delay = if self.jitter_enabled && capped_delay > 0.0 {
            let jitter_range = capped_delay * self.jitter_factor;
            let jitter = rand::rng().random_range(-jitter_range..=jitter_range);
            (capped_delay + jitter).max(0.0)
        } else {
            capped_delay
        };

        Duration::from_millis(final_delay as u64)
    }

    /// Delay before the next attempt, honoring a server-provided hint
    ///
    /// The hint can only lengthen the wait, and is itself capped at
    /// `max_delay_ms`.
    #[must_use]
    pub fn delay_with_hint(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let backoff = self.delay_for_attempt(attempt);
        retry_after.map_or(backoff, |hint| {
            backoff.max(hint.min(Duration::from_millis(self.max_delay_ms)))
        })
    }
}

/// Trait for errors that can be checked for retryability
pub trait Retryable {
    /// Returns true if this error is retryable
    fn is_retryable(&self) -> bool;

    /// Server-requested wait before retrying, if any
    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

impl Retryable for NavigationError {
    fn is_retryable(&self) -> bool {
        Self::is_retryable(self)
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited {
                retry_after_secs: Some(secs),
            } => Some(Duration::from_secs(*secs)),
            _ => None,
        }
    }
}

/// Retry result containing either success or the last error
#[derive(Debug)]
pub struct RetryResult<T, E> {
    /// The result of the operation
    pub result: Result<T, E>,
    /// Number of attempts made (1 = no retries, 2 = one retry, etc.)
    pub attempts: u32,
    /// Total time spent including retries
    pub total_duration: Duration,
}

impl<T, E> RetryResult<T, E> {
    /// Convert to standard Result, discarding metadata
    pub fn into_result(self) -> Result<T, E> {
        self.result
    }
}

/// Execute an async operation with retry logic
///
/// Retries only while the error is retryable and attempts remain; the last
/// error is returned unchanged.
#[allow(clippy::cast_possible_truncation)]
pub async fn with_retry<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> RetryResult<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + std::fmt::Display,
{
    let start = Instant::now();
    let mut attempts = 0u32;

    loop {
        attempts += 1;

        match operation().await {
            Ok(value) => {
                if attempts > 1 {
                    debug!(
                        attempts = attempts,
                        duration_ms = start.elapsed().as_millis() as u64,
                        "Operation succeeded after retries"
                    );
                }
                return RetryResult {
                    result: Ok(value),
                    attempts,
                    total_duration: start.elapsed(),
                };
            },
            Err(err) => {
                let retry_attempt = attempts - 1;

                if !err.is_retryable() {
                    debug!(
                        attempts = attempts,
                        error = %err,
                        "Operation failed with non-retryable error"
                    );
                    return RetryResult {
                        result: Err(err),
                        attempts,
                        total_duration: start.elapsed(),
                    };
                }

                if retry_attempt >= config.max_retries {
                    warn!(
                        attempts = attempts,
                        max_retries = config.max_retries,
                        error = %err,
                        "Operation failed after max retries"
                    );
                    return RetryResult {
                        result: Err(err),
                        attempts,
                        total_duration: start.elapsed(),
                    };
                }

                let delay = config.delay_with_hint(retry_attempt, err.retry_after());
                warn!(
                    attempt = attempts,
                    max_retries = config.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Operation failed, retrying"
                );

                tokio::time::sleep(delay).await;
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn config_default_values() {
        let config = RetryConfig::default();
        assert_eq!(config.initial_delay_ms, 250);
        assert_eq!(config.max_delay_ms, 4_000);
        assert!((config.multiplier - 2.0).abs() < f64::EPSILON);
        assert_eq!(config.max_retries, 2);
        assert!(config.jitter_enabled);
    }

    #[test]
    fn delay_calculation_without_jitter() {
        let config = RetryConfig::new(100, 10_000, 2.0, 3).without_jitter();

        assert_eq!(config.delay_for_attempt(0).as_millis(), 100);
        assert_eq!(config.delay_for_attempt(1).as_millis(), 200);
        assert_eq!(config.delay_for_attempt(2).as_millis(), 400);
    }

    #[test]
    fn delay_capped_at_max() {
        let config = RetryConfig::new(1000, 2000, 2.0, 5).without_jitter();

        assert_eq!(config.delay_for_attempt(1).as_millis(), 2000);
        assert_eq!(config.delay_for_attempt(10).as_millis(), 2000);
    }

    #[test]
    fn delay_with_jitter_stays_in_range() {
        let config = RetryConfig::new(1000, 10_000, 2.0, 3);
        for _ in 0..100 {
            let ms = config.delay_for_attempt(0).as_millis();
            assert!((900..=1100).contains(&ms), "got {ms}");
        }
    }

    #[test]
    fn retry_after_hint_lengthens_but_is_capped() {
        let config = RetryConfig::new(100, 2000, 2.0, 3).without_jitter();

        assert_eq!(config.delay_with_hint(0, None).as_millis(), 100);
        assert_eq!(
            config
                .delay_with_hint(0, Some(Duration::from_secs(1)))
                .as_millis(),
            1000
        );
        assert_eq!(
            config
                .delay_with_hint(0, Some(Duration::from_secs(60)))
                .as_millis(),
            2000
        );
    }

    #[test]
    fn navigation_error_retry_after() {
        let err = NavigationError::RateLimited {
            retry_after_secs: Some(3),
        };
        assert_eq!(Retryable::retry_after(&err), Some(Duration::from_secs(3)));
        assert_eq!(
            Retryable::retry_after(&NavigationError::network("reset")),
            None
        );
    }

    #[tokio::test(start_paused = true)]
    async fn retries_network_errors_then_succeeds() {
        let config = RetryConfig::new(10, 100, 2.0, 3).without_jitter();
        let calls = Arc::new(AtomicU32::new(0));

        let counter = Arc::clone(&calls);
        let result = with_retry(&config, || {
            let counter = Arc::clone(&counter);
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(NavigationError::timeout("deadline"))
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.attempts, 3);
        // Backoff of 10 ms then 20 ms
        assert!(result.total_duration >= Duration::from_millis(30));
        assert_eq!(result.into_result(), Ok(42));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_retries_with_last_error() {
        let config = RetryConfig::new(10, 100, 2.0, 2).without_jitter();
        let calls = Arc::new(AtomicU32::new(0));

        let counter = Arc::clone(&calls);
        let result: RetryResult<(), _> = with_retry(&config, || {
            let counter = Arc::clone(&counter);
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                Err(NavigationError::network(format!("attempt {n}")))
            }
        })
        .await;

        assert_eq!(result.attempts, 3);
        assert_eq!(
            result.into_result(),
            Err(NavigationError::network("attempt 2"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn non_retryable_error_returns_immediately() {
        let config = RetryConfig::new(10, 100, 2.0, 5);
        let calls = Arc::new(AtomicU32::new(0));

        let counter = Arc::clone(&calls);
        let result: Result<(), _> = with_retry(&config, || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(NavigationError::NoRouteFound)
            }
        })
        .await
        .into_result();

        assert_eq!(result, Err(NavigationError::NoRouteFound));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_policy_makes_one_attempt() {
        let calls = Arc::new(AtomicU32::new(0));

        let counter = Arc::clone(&calls);
        let result: Result<(), _> = with_retry(&RetryConfig::disabled(), || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(NavigationError::network("down"))
            }
        })
        .await
        .into_result();

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
