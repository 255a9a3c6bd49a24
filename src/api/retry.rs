// src/api/retry.rs
//! Retry with exponential backoff for transient API failures.

use crate::constants::{RETRY_INITIAL_DELAY, RETRY_MAX_DELAY};
use crate::error::AppError;
use std::future::Future;
use std::time::Duration;

/// How often and how patiently a request is retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            initial_delay: RETRY_INITIAL_DELAY,
            max_delay: RETRY_MAX_DELAY,
        }
    }

    /// Delay before retry number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        if let Some(hint) = retry_after {
            return hint.min(self.max_delay);
        }
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_delay.saturating_mul(factor).min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_MAX_RETRIES)
    }
}

/// A failed attempt, with the server's `Retry-After` hint when it sent one.
#[derive(Debug)]
pub struct AttemptError {
    pub error: AppError,
    pub retry_after: Option<Duration>,
    /// Starts as [`AppError::is_retryable`]; cleared by [`AttemptError::final_attempt`].
    pub retryable: bool,
}

impl AttemptError {
    pub fn new(error: AppError, retry_after: Option<Duration>) -> Self {
        let retryable = error.is_retryable();
        Self {
            error,
            retry_after,
            retryable,
        }
    }

    /// Stops the retry loop at this failure whatever the error kind.
    pub fn final_attempt(mut self) -> Self {
        self.retryable = false;
        self
    }
}

impl From<AppError> for AttemptError {
    fn from(error: AppError) -> Self {
        Self::new(error, None)
    }
}

impl From<reqwest::Error> for AttemptError {
    fn from(error: reqwest::Error) -> Self {
        AppError::from(error).into()
    }
}

/// Runs `operation` until it succeeds, fails permanently, or the retry budget
/// is spent. Only attempts marked retryable are repeated.
pub async fn retry_with_backoff<F, T, Fut>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AttemptError>>,
{
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(failure) => {
                if attempt >= policy.max_retries || !failure.retryable {
                    return Err(failure.error);
                }
                attempt += 1;
                let delay = policy.delay_for(attempt, failure.retry_after);
                log::warn!(
                    "Transient Notion failure ({}), retry {}/{} after {:?}",
                    failure.error,
                    attempt,
                    policy.max_retries,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
