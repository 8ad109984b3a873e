//! Run driver
//!
//! `Idle -> LoadingCheckpoint -> ProcessingBatch(i) -> .. -> Aggregating -> Done`,
//! or `Failed` from any step. Batches run strictly one after another; batch
//! `i + 1` starts only once batch `i` is drained, saved and checkpointed.

use crate::config::Config;
use crate::core::aggregator::{AggregationOptions, Aggregator};
use crate::core::batch::{WorkerPool, batch_at, batch_count};
use crate::core::classifier::RecordClassifier;
use crate::core::types::{BatchArtifact, Checkpoint, FinalReport, Record};
use crate::storage::{PersistenceManager, RunTotals};
use crate::utils::error::{ClassifierError, Result};
use chrono::Utc;
use std::fmt;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Where a run begins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartPoint {
    /// Discard any checkpoint and start at the configured batch
    Fresh,
    /// Continue after the checkpoint, or at the configured batch without one
    Resume,
    /// Start at this batch regardless of the checkpoint
    ResumeFrom(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    LoadingCheckpoint,
    ProcessingBatch(usize),
    Aggregating,
    Done,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Idle => f.write_str("idle"),
            RunState::LoadingCheckpoint => f.write_str("loading checkpoint"),
            RunState::ProcessingBatch(i) => write!(f, "processing batch {}", i),
            RunState::Aggregating => f.write_str("aggregating"),
            RunState::Done => f.write_str("done"),
            RunState::Failed => f.write_str("failed"),
        }
    }
}

/// Immutable settings of one run
#[derive(Debug, Clone)]
pub struct RunContext {
    pub batch_size: usize,
    pub concurrency: usize,
    /// Batch used when no checkpoint decides otherwise
    pub start_batch: usize,
    pub report_path: PathBuf,
    pub mislabel_analysis: bool,
    pub top_keywords: usize,
}

impl RunContext {
    pub fn from_config(config: &Config) -> Self {
        Self {
            batch_size: config.batch.batch_size,
            concurrency: config.batch.concurrency,
            start_batch: config.start_batch,
            report_path: config.output.report_path.clone(),
            mislabel_analysis: config.analysis.mislabel_analysis,
            top_keywords: config.analysis.top_keywords,
        }
    }

    fn aggregation_options(&self) -> AggregationOptions {
        AggregationOptions {
            mislabel_analysis: self.mislabel_analysis,
            top_keywords: self.top_keywords,
            batch_size: self.batch_size,
        }
    }
}

/// Drives a classification run over a record sequence
#[derive(Debug)]
pub struct Orchestrator {
    context: RunContext,
    classifier: RecordClassifier,
    store: PersistenceManager,
    pool: WorkerPool,
    state: RunState,
    last_completed_batch: Option<usize>,
    totals: RunTotals,
}

impl Orchestrator {
    pub fn new(context: RunContext, classifier: RecordClassifier, store: PersistenceManager) -> Self {
        let pool = WorkerPool::new(context.concurrency);
        Self {
            context,
            classifier,
            store,
            pool,
            state: RunState::Idle,
            last_completed_batch: None,
            totals: RunTotals::default(),
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Last batch whose results are durable
    pub fn last_completed_batch(&self) -> Option<usize> {
        self.last_completed_batch
    }

    pub fn totals(&self) -> RunTotals {
        self.totals
    }

    pub fn store(&self) -> &PersistenceManager {
        &self.store
    }

    /// Process `records` from `start` to the end and write the final report
    ///
    /// A fatal error leaves the checkpoint at the last durable batch and is
    /// returned as [`ClassifierError::Halted`].
    pub async fn run(&mut self, records: &[Record], start: StartPoint) -> Result<FinalReport> {
        match self.drive(records, start).await {
            Ok(report) => {
                self.state = RunState::Done;
                Ok(report)
            }
            Err(e) => {
                error!(state = %self.state, "Run failed: {}", e);
                self.state = RunState::Failed;
                Err(ClassifierError::halted(self.last_completed_batch, e))
            }
        }
    }

    async fn drive(&mut self, records: &[Record], start: StartPoint) -> Result<FinalReport> {
        self.state = RunState::LoadingCheckpoint;
        let first_batch = self.resolve_start(start).await?;

        let batch_size = self.context.batch_size;
        let total_batches = batch_count(records.len(), batch_size);
        info!(
            records = records.len(),
            batch_size,
            total_batches,
            first_batch,
            "Starting classification run"
        );

        let mut index = first_batch;
        loop {
            let batch = batch_at(records, batch_size, index);
            if batch.is_empty() {
                break;
            }
            self.state = RunState::ProcessingBatch(index);
            info!(
                "Processing batch {}/{} (rows {}-{})",
                index + 1,
                total_batches,
                batch.start_row,
                batch.start_row + batch.len()
            );

            let started_at = Utc::now();
            let classifier = &self.classifier;
            let outcome = self
                .pool
                .run_batch(
                    &batch,
                    move |record, position| classifier.classify(record, position),
                    &self.store,
                )
                .await?;

            let artifact = BatchArtifact {
                batch_index: index,
                batch_size,
                item_count: batch.len(),
                results: outcome.results,
                failed_items: outcome.failed_items,
                started_at,
                completed_at: Utc::now(),
            };
            self.store.record_batch(&artifact).await?;

            let totals = RunTotals {
                completed: self.totals.completed + artifact.results.len(),
                failed: self.totals.failed + artifact.failed_items.len(),
            };
            self.store.advance_checkpoint(index, totals, batch_size).await?;
            self.totals = totals;
            self.last_completed_batch = Some(index);

            index += 1;
        }

        self.state = RunState::Aggregating;
        let (artifacts, missing) = self.store.load_batches(total_batches).await?;
        if !missing.is_empty() {
            warn!(?missing, "Some batches have no results file; report covers the rest");
        }
        let report = Aggregator::new(self.context.aggregation_options()).aggregate(&artifacts, &missing);
        self.store.write_report(&self.context.report_path, &report).await?;

        info!(
            "Analysis complete: {} processed, {} failed",
            report.metadata.total_processed, report.metadata.total_failed
        );
        Ok(report)
    }

    /// First batch to process; also primes progress totals
    async fn resolve_start(&mut self, start: StartPoint) -> Result<usize> {
        if start == StartPoint::Fresh {
            self.store.reset_checkpoint().await?;
            self.last_completed_batch = None;
            return self.start_over_at(self.context.start_batch).await;
        }

        let checkpoint = self.store.load_checkpoint().await?;
        if let Some(checkpoint) = &checkpoint {
            self.check_batch_size(checkpoint)?;
        }

        match (start, checkpoint) {
            (StartPoint::Resume, Some(checkpoint)) => {
                info!(
                    last_completed_batch = checkpoint.last_completed_batch,
                    total_completed = checkpoint.total_completed,
                    "Resuming from checkpoint"
                );
                self.last_completed_batch = Some(checkpoint.last_completed_batch);
                self.totals = RunTotals {
                    completed: checkpoint.total_completed,
                    failed: checkpoint.total_failed,
                };
                Ok(checkpoint.next_batch())
            }
            (StartPoint::Resume, None) => {
                info!("No checkpoint found, starting at batch {}", self.context.start_batch);
                self.start_over_at(self.context.start_batch).await
            }
            (StartPoint::ResumeFrom(index), Some(checkpoint)) if index <= checkpoint.last_completed_batch => {
                warn!(
                    checkpoint = checkpoint.last_completed_batch,
                    start = index,
                    "Start batch is behind the checkpoint; checkpoint reset"
                );
                self.store.reset_checkpoint().await?;
                self.start_over_at(index).await
            }
            (StartPoint::ResumeFrom(index), checkpoint) => {
                self.last_completed_batch = checkpoint.map(|c| c.last_completed_batch);
                self.start_over_at(index).await
            }
            (StartPoint::Fresh, _) => Ok(self.context.start_batch),
        }
    }

    /// Seed totals from the batch files below `index`
    async fn start_over_at(&mut self, index: usize) -> Result<usize> {
        let (artifacts, _) = self.store.load_batches(index).await?;
        self.totals = artifacts.iter().fold(RunTotals::default(), |acc, a| RunTotals {
            completed: acc.completed + a.results.len(),
            failed: acc.failed + a.failed_items.len(),
        });
        if !artifacts.is_empty() {
            info!(
                batches = artifacts.len(),
                completed = self.totals.completed,
                "Loaded existing results below batch {}",
                index
            );
        }
        Ok(index)
    }

    fn check_batch_size(&self, checkpoint: &Checkpoint) -> Result<()> {
        match checkpoint.batch_size {
            Some(size) if size != self.context.batch_size => Err(ClassifierError::checkpoint(format!(
                "checkpoint was written with batch size {} but this run uses {}; batch membership would change",
                size, self.context.batch_size
            ))),
            _ => Ok(()),
        }
    }
}
