//! Bounded retries with exponential backoff for market-data calls

use crate::config::StockConfig;
use crate::error::{Result, StockError};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Retry policy for transient failures
///
/// Only errors for which [`StockError::is_transient`] holds are retried; a
/// `DataUnavailable` answer is returned immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,

    /// Delay before the first retry
    pub initial_backoff: Duration,

    /// Upper bound for any single delay
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&StockConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &StockConfig) -> Self {
        Self {
            max_attempts: config.max_retries.saturating_add(1),
            initial_backoff: config.retry_backoff_base,
            max_backoff: config.retry_backoff(4),
        }
    }

    #[cfg(test)]
    pub(crate) fn fast() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(5),
        }
    }

    /// Delay before retry number `retry` (1-based)
    fn backoff_duration(&self, retry: u32) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }
        let factor = 2_u32.saturating_pow(retry - 1);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Run `operation` until it succeeds, fails permanently, or runs out of attempts
    pub async fn execute<F, Fut, T>(&self, operation_name: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!("Attempt {}/{} for {}", attempt, attempts, operation_name);

            match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!("{} succeeded after {} retries", operation_name, attempt - 1);
                    }
                    return Ok(value);
                }
                Err(e) if e.is_transient() && attempt < attempts => {
                    let backoff = self.backoff_duration(attempt);
                    warn!(
                        "{} failed (attempt {}/{}): {}. Retrying in {:?}",
                        operation_name, attempt, attempts, e, backoff
                    );
                    sleep(backoff).await;
                }
                Err(e) => {
                    if e.is_transient() {
                        warn!("{} failed after {} attempts: {}", operation_name, attempts, e);
                    }
                    return Err(into_final_error(e));
                }
            }
        }
    }
}

/// Raw HTTP errors surface as `NetworkFailure` once retries are exhausted
fn into_final_error(error: StockError) -> StockError {
    match error {
        StockError::Http(e) if e.is_timeout() || e.is_connect() || e.is_request() => {
            StockError::NetworkFailure(e.to_string())
        }
        other => other,
    }
}
