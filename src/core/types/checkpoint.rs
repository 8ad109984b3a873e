//! Resume checkpoint

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Durable record of resume progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Last batch whose batch artifact is durable
    pub last_completed_batch: usize,
    /// Successful items across batches `0..=last_completed_batch`
    pub total_completed: usize,
    #[serde(default)]
    pub total_failed: usize,
    /// Batch size the run was started with
    #[serde(default)]
    pub batch_size: Option<usize>,
    pub timestamp: DateTime<Utc>,
}

impl Checkpoint {
    /// Batch index a resumed run starts from
    pub fn next_batch(&self) -> usize {
        self.last_completed_batch + 1
    }
}
