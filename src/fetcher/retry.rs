use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::app::Result;

/// Bounded exponential backoff around a fallible async operation.
///
/// Failed attempt `k` (1-indexed) is followed by a delay of
/// `backoff_factor^k` seconds: 2s, 4s, 8s, 16s, 32s with the defaults.
/// Every error kind is retried the same way.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Attempts before giving up (default: 5)
    pub max_attempts: u32,

    /// Base of the exponential delay in seconds (default: 2.0)
    pub backoff_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff_factor: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Delay scheduled after failed attempt `attempt` (1-indexed).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let secs = self.backoff_factor.powi(exponent).max(0.0);
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
    }

    /// Run `operation` until it succeeds or the attempt budget is spent,
    /// returning the last error in the latter case.
    ///
    /// Every failed attempt, the last one included, is followed by its
    /// backoff delay. The delay is a tokio sleep, so dropping the returned
    /// future cancels it.
    pub async fn execute<T, F, Fut>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        attempt,
                        max_attempts,
                        retryable = e.is_retryable(),
                        "Attempt failed, backing off {:?}: {}",
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;

                    if attempt >= max_attempts {
                        return Err(e);
                    }
                }
            }
        }
    }
}
