//! Bounded-concurrency execution of one batch
//!
//! Items run concurrently up to the configured limit. Completed outcomes are
//! handed to a single collector, which forwards each one to the item sink as
//! soon as it arrives and reorders everything by item index at the end.
//! Sink writes are polled alongside the in-flight requests, so a slow write
//! never stalls them.

use super::splitter::Batch;
use crate::core::types::{BatchOutcome, ItemOutcome, ItemPosition, Record};
use crate::utils::error::Result;
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{FuturesUnordered, StreamExt};
use std::future::Future;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Receives each item outcome as soon as it resolves
#[async_trait]
pub trait ItemSink: Send + Sync {
    async fn record_item(&self, outcome: &ItemOutcome) -> Result<()>;
}

/// Summary of one batch execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchStats {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl From<&BatchOutcome> for BatchStats {
    fn from(outcome: &BatchOutcome) -> Self {
        Self {
            total: outcome.len(),
            succeeded: outcome.results.len(),
            failed: outcome.failed_items.len(),
        }
    }
}

/// Runs the items of a batch with at most `concurrency` in flight
#[derive(Debug, Clone)]
pub struct WorkerPool {
    concurrency: usize,
}

impl WorkerPool {
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Classify every item of `batch` and return outcomes in input order
    ///
    /// An item failure never aborts the batch. An error from the sink does:
    /// it is returned immediately and in-flight items are dropped.
    pub async fn run_batch<'a, F, Fut, S>(
        &self,
        batch: &Batch<'a>,
        operation: F,
        sink: &S,
    ) -> Result<BatchOutcome>
    where
        F: Fn(&'a Record, ItemPosition) -> Fut,
        Fut: Future<Output = ItemOutcome>,
        S: ItemSink + ?Sized,
    {
        let start = Instant::now();
        debug!(
            batch = batch.index,
            items = batch.len(),
            concurrency = self.concurrency,
            "Dispatching batch items"
        );

        let mut pending = batch.items();
        let mut running = FuturesUnordered::new();
        for (position, record) in pending.by_ref().take(self.concurrency) {
            running.push(operation(record, position));
        }

        let mut recording: FuturesUnordered<BoxFuture<'_, Result<ItemOutcome>>> = FuturesUnordered::new();
        let mut outcomes = Vec::with_capacity(batch.len());
        loop {
            tokio::select! {
                Some(recorded) = recording.next() => outcomes.push(recorded?),
                Some(outcome) = running.next() => {
                    if let Some((position, record)) = pending.next() {
                        running.push(operation(record, position));
                    }
                    log_outcome(&outcome);
                    recording.push(async move { sink.record_item(&outcome).await.map(|()| outcome) }.boxed());
                }
                else => break,
            }
        }

        outcomes.sort_by_key(|o| o.position().item_index);
        let outcome = BatchOutcome::from_ordered(outcomes);
        let stats = BatchStats::from(&outcome);
        info!(
            batch = batch.index,
            succeeded = stats.succeeded,
            failed = stats.failed,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Batch drained"
        );
        Ok(outcome)
    }
}

fn log_outcome(outcome: &ItemOutcome) {
    let position = outcome.position();
    match outcome {
        ItemOutcome::Completed(result) => debug!(
            batch = position.batch_index,
            item = position.item_index,
            attempts = result.attempts,
            "Item completed"
        ),
        ItemOutcome::Failed(failed) => warn!(
            batch = position.batch_index,
            item = position.item_index,
            attempts = failed.attempts,
            error = %failed.error,
            "Item failed"
        ),
    }
}
