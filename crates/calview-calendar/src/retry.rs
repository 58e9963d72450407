//! Retry utilities for event fetches with linear backoff.
//!
//! Retry `n` (1-based) waits `n * base_delay` before resubmitting, so the
//! schedule for the defaults is 1s, 2s. Retried failures:
//! - any non-success HTTP status
//! - transport errors (connect, reset, timeout)
//!
//! Not retried:
//! - bodies that fail to parse
//! - malformed URLs

use std::future::Future;
use std::time::Duration;

use calview_core::RetrySettings;

use crate::error::CalendarError;

/// Default retry configuration
pub const DEFAULT_MAX_RETRIES: u32 = 2;
pub const DEFAULT_BASE_DELAY_MS: u64 = 1000;

/// Retry configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Additional attempts after the first one
    pub max_retries: u32,
    /// Delay unit; retry `n` waits `n * base_delay`
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
        }
    }
}

impl From<RetrySettings> for RetryConfig {
    fn from(settings: RetrySettings) -> Self {
        Self::new(settings.max_retries, settings.base_delay_ms)
    }
}

impl RetryConfig {
    /// Create a new retry config with custom settings
    pub fn new(max_retries: u32, base_delay_ms: u64) -> Self {
        Self {
            max_retries,
            base_delay: Duration::from_millis(base_delay_ms),
        }
    }

    /// Total number of attempts including the first one
    pub fn total_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before retry number `retry` (1-based)
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        self.base_delay.saturating_mul(retry)
    }

    /// Every inter-attempt delay, in order
    pub fn schedule(&self) -> Vec<Duration> {
        (1..=self.max_retries)
            .map(|retry| self.delay_for_retry(retry))
            .collect()
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// the attempt budget is spent.
///
/// `operation` receives the 1-based attempt number. `request` only appears in
/// log entries.
///
/// # Errors
/// The first non-retryable error unchanged, or
/// [`CalendarError::RetriesExhausted`] wrapping the last retryable one.
pub async fn with_retry<T, F, Fut>(
    config: &RetryConfig,
    request: &str,
    mut operation: F,
) -> Result<T, CalendarError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, CalendarError>>,
{
    let total = config.total_attempts();
    let mut attempt = 1;

    loop {
        match operation(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(request, attempt, "Request succeeded after {} retries", attempt - 1);
                }
                return Ok(value);
            }
            Err(e) if !e.is_retryable() => {
                tracing::debug!(request, attempt, error = %e, "Non-retryable error");
                return Err(e);
            }
            Err(e) if attempt >= total => {
                tracing::error!(request, attempts = attempt, error = %e, "All retry attempts exhausted");
                return Err(CalendarError::RetriesExhausted {
                    attempts: attempt,
                    last: Box::new(e),
                });
            }
            Err(e) => {
                let delay = config.delay_for_retry(attempt);
                tracing::warn!(
                    request,
                    attempt,
                    max_attempts = total,
                    error = %e,
                    "Retryable error, waiting {:?}",
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
