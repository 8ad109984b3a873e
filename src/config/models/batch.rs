//! Batch execution configuration

use super::*;
use crate::utils::error::RetryConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Batching, concurrency and retry settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Records per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Maximum concurrent service calls within a batch
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Maximum attempts per record, including the first
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Backoff delay after the first failure, in milliseconds
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Upper bound for a single backoff delay, in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Randomize delays slightly
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            concurrency: default_concurrency(),
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            jitter: true,
        }
    }
}

impl BatchConfig {
    /// Retry settings derived from this section
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::default()
            .with_max_attempts(self.max_retries)
            .with_delays(
                Duration::from_millis(self.base_delay_ms),
                Duration::from_millis(self.max_delay_ms),
            )
            .with_jitter(self.jitter)
    }
}

fn default_base_delay_ms() -> u64 {
    1_000
}

fn default_max_delay_ms() -> u64 {
    60_000
}
