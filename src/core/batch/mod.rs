//! Batch splitting and per-batch concurrent execution

pub mod splitter;
pub mod worker_pool;

pub use splitter::{Batch, batch_at, batch_count};
pub use worker_pool::{BatchStats, ItemSink, WorkerPool};
