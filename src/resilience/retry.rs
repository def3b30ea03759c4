//! Retry with exponential backoff, keyed on the error taxonomy.

use crate::errors::{classify, LinkedInError, LinkedInResult, RawFailure};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default delay before the first retry.
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Configuration for retry behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of retries (total attempts = `max_retries + 1`).
    pub max_retries: u32,
    /// Delay before the first retry when the server gives no hint.
    /// Doubles on every further retry.
    pub initial_backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
        }
    }
}

impl RetryConfig {
    /// Configuration that never retries.
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }
}

/// State of one scheduled retry. Lives only inside [`RetryExecutor::execute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryAttempt {
    /// Zero-based number of the attempt that just failed.
    pub attempt_number: u32,
    /// Total attempts allowed for the call.
    pub max_attempts: u32,
    /// Delay before the next attempt.
    pub delay: Duration,
}

impl RetryAttempt {
    /// Computes the retry scheduled after `attempt_number` failed with `error`.
    pub fn after_failure(config: &RetryConfig, attempt_number: u32, error: &LinkedInError) -> Self {
        Self {
            attempt_number,
            max_attempts: config.max_retries.saturating_add(1),
            delay: Self::delay_for(config, attempt_number, error),
        }
    }

    /// Delay before retrying.
    ///
    /// A server supplied `retry-after` wins outright; otherwise
    /// `initial_backoff * 2^attempt_number`.
    pub fn delay_for(config: &RetryConfig, attempt_number: u32, error: &LinkedInError) -> Duration {
        if let Some(seconds) = error.retry_after_seconds() {
            return Duration::from_millis(seconds.saturating_mul(1000));
        }

        let factor = 2u32.saturating_pow(attempt_number);
        config.initial_backoff.saturating_mul(factor)
    }

    /// Delay in whole milliseconds.
    pub fn delay_ms(&self) -> u64 {
        u64::try_from(self.delay.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Executes remote calls, retrying rate-limited failures.
#[derive(Debug, Clone, Default)]
pub struct RetryExecutor {
    config: RetryConfig,
}

impl RetryExecutor {
    /// Creates a new retry executor.
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Gets the retry configuration.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Executes an operation with retry logic.
    ///
    /// `operation` performs exactly one remote call per invocation. Failures are
    /// classified; only [`LinkedInError::RateLimit`] is retried, and only while
    /// the retry budget lasts. Attempts never overlap.
    pub async fn execute<F, Fut, T>(&self, operation_name: &str, mut operation: F) -> LinkedInResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RawFailure>>,
    {
        let mut attempt_number: u32 = 0;

        loop {
            let error = match operation().await {
                Ok(value) => return Ok(value),
                Err(failure) => classify(failure),
            };

            if !error.is_retryable() || attempt_number >= self.config.max_retries {
                if error.is_retryable() {
                    tracing::warn!(
                        operation = operation_name,
                        attempts = attempt_number + 1,
                        "Retry budget exhausted"
                    );
                }
                return Err(error);
            }

            let retry = RetryAttempt::after_failure(&self.config, attempt_number, &error);
            tracing::warn!(
                operation = operation_name,
                attempt = retry.attempt_number + 1,
                max_attempts = retry.max_attempts,
                delay_ms = retry.delay_ms(),
                server_hint = error.retry_after_seconds().is_some(),
                "Rate limited, retrying"
            );

            sleep(retry.delay).await;
            attempt_number += 1;
        }
    }
}
