//! Retry mechanism with exponential backoff

use super::types::{RetryConfig, RetryOutcome};
use crate::utils::error::ClassifierError;
use std::time::Duration;
use tracing::{debug, warn};

/// Retry mechanism with exponential backoff
///
/// Only errors for which [`ClassifierError::is_retryable`] holds are retried;
/// anything else ends the loop on the spot. The policy holds no mutable state,
/// so one instance can be shared by every worker of a batch.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    /// Create a new retry policy
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Get current configuration
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Delay to wait after the given (1-based) failed attempt, before jitter
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32) as i32;
        let millis =
            self.config.base_delay.as_millis() as f64 * self.config.backoff_multiplier.powi(exponent);
        let capped = millis.min(self.config.max_delay.as_millis() as f64);
        Duration::from_millis(capped.max(0.0) as u64)
    }

    fn next_delay(&self, attempt: u32, error: &ClassifierError) -> Duration {
        let mut delay = self.backoff_delay(attempt);

        // Sleep with optional jitter
        if self.config.jitter {
            let jitter_factor = 0.1;
            let jitter =
                delay.as_millis() as f64 * jitter_factor * (rand::random::<f64>() - 0.5);
            delay = Duration::from_millis((delay.as_millis() as f64 + jitter).max(0.0) as u64);
        }

        match error.retry_after() {
            Some(hint) => delay.max(hint.min(self.config.max_delay)),
            None => delay,
        }
    }

    /// Execute a function with retry logic
    ///
    /// The closure receives the 1-based attempt number.
    pub async fn call<F, Fut, R>(&self, mut f: F) -> RetryOutcome<R, ClassifierError>
    where
        F: FnMut(u32) -> Fut,
        Fut: std::future::Future<Output = std::result::Result<R, ClassifierError>>,
    {
        let mut attempt = 0;

        loop {
            attempt += 1;

            match f(attempt).await {
                Ok(result) => {
                    if attempt > 1 {
                        debug!("Retry succeeded on attempt {}", attempt);
                    }
                    return RetryOutcome {
                        result: Ok(result),
                        attempts: attempt,
                    };
                }
                Err(error) if !error.is_retryable() => {
                    debug!(attempt, kind = error.kind(), "Terminal error, not retrying: {}", error);
                    return RetryOutcome {
                        result: Err(error),
                        attempts: attempt,
                    };
                }
                Err(error) => {
                    if attempt >= self.config.max_attempts {
                        warn!("Retry failed after {} attempts: {}", attempt, error);
                        return RetryOutcome {
                            result: Err(error),
                            attempts: attempt,
                        };
                    }

                    let delay = self.next_delay(attempt, &error);
                    debug!(
                        attempt,
                        kind = error.kind(),
                        "Attempt {} failed: {}, retrying in {:?}",
                        attempt,
                        error,
                        delay
                    );

                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}
