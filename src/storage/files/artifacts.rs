//! Run artifacts in the output directory
//!
//! - `batch_{b}_item_{i}.json`: one item outcome, written when the item resolves
//! - `batch_{b}_results.json`: one drained batch
//! - `checkpoint.json`: resume progress, advanced only after its batch file is durable

use super::atomic::{read_json, remove_if_exists, write_json_atomic};
use crate::core::batch::ItemSink;
use crate::core::types::{BatchArtifact, Checkpoint, FinalReport, ItemOutcome};
use crate::utils::error::{ClassifierError, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

const CHECKPOINT_FILE: &str = "checkpoint.json";

/// Progress totals carried by a checkpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTotals {
    pub completed: usize,
    pub failed: usize,
}

/// Owns every artifact a run writes to its output directory
#[derive(Debug, Clone)]
pub struct PersistenceManager {
    output_dir: PathBuf,
}

impl PersistenceManager {
    /// Open `output_dir`, creating it when missing
    pub async fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir).await.map_err(|e| {
            ClassifierError::storage(format!(
                "Failed to create output directory {}: {}",
                output_dir.display(),
                e
            ))
        })?;
        info!("Artifacts stored in: {}", output_dir.display());
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn item_path(&self, batch_index: usize, item_index: usize) -> PathBuf {
        self.output_dir
            .join(format!("batch_{}_item_{}.json", batch_index, item_index))
    }

    pub fn batch_path(&self, batch_index: usize) -> PathBuf {
        self.output_dir.join(format!("batch_{}_results.json", batch_index))
    }

    pub fn checkpoint_path(&self) -> PathBuf {
        self.output_dir.join(CHECKPOINT_FILE)
    }

    /// Persist one resolved item
    pub async fn record_item(&self, outcome: &ItemOutcome) -> Result<()> {
        let position = outcome.position();
        let path = self.item_path(position.batch_index, position.item_index);
        write_json_atomic(&path, outcome).await?;
        debug!(
            batch = position.batch_index,
            item = position.item_index,
            "Item artifact written"
        );
        Ok(())
    }

    /// Persist a drained batch
    pub async fn record_batch(&self, artifact: &BatchArtifact) -> Result<()> {
        if !artifact.is_complete() {
            return Err(ClassifierError::storage(format!(
                "batch {} holds {} outcomes for {} items",
                artifact.batch_index,
                artifact.results.len() + artifact.failed_items.len(),
                artifact.item_count
            )));
        }
        let path = self.batch_path(artifact.batch_index);
        write_json_atomic(&path, artifact).await?;
        info!(
            batch = artifact.batch_index,
            results = artifact.results.len(),
            failed = artifact.failed_items.len(),
            "Batch results saved to {}",
            path.display()
        );
        Ok(())
    }

    /// Move the checkpoint to `batch_index`
    ///
    /// Refused when the batch artifact is missing or when the checkpoint
    /// would not move forward.
    pub async fn advance_checkpoint(
        &self,
        batch_index: usize,
        totals: RunTotals,
        batch_size: usize,
    ) -> Result<Checkpoint> {
        let batch_path = self.batch_path(batch_index);
        let batch_is_durable = fs::try_exists(&batch_path).await.map_err(|e| {
            ClassifierError::storage(format!("Failed to stat {}: {}", batch_path.display(), e))
        })?;
        if !batch_is_durable {
            return Err(ClassifierError::checkpoint(format!(
                "batch {} has no results file",
                batch_index
            )));
        }

        if let Some(current) = self.load_checkpoint().await? {
            if batch_index <= current.last_completed_batch {
                return Err(ClassifierError::checkpoint(format!(
                    "checkpoint cannot move from batch {} back to {}",
                    current.last_completed_batch, batch_index
                )));
            }
        }

        let checkpoint = Checkpoint {
            last_completed_batch: batch_index,
            total_completed: totals.completed,
            total_failed: totals.failed,
            batch_size: Some(batch_size),
            timestamp: Utc::now(),
        };
        write_json_atomic(&self.checkpoint_path(), &checkpoint).await?;
        debug!(
            batch = batch_index,
            total_completed = totals.completed,
            "Checkpoint advanced"
        );
        Ok(checkpoint)
    }

    pub async fn load_checkpoint(&self) -> Result<Option<Checkpoint>> {
        read_json(&self.checkpoint_path()).await
    }

    /// Forget resume progress
    pub async fn reset_checkpoint(&self) -> Result<()> {
        if remove_if_exists(&self.checkpoint_path()).await? {
            info!("Previous checkpoint removed");
        }
        Ok(())
    }

    pub async fn load_batch(&self, batch_index: usize) -> Result<Option<BatchArtifact>> {
        read_json(&self.batch_path(batch_index)).await
    }

    /// Indices of every batch results file present, ascending
    pub async fn list_batches(&self) -> Result<Vec<usize>> {
        let mut entries = fs::read_dir(&self.output_dir).await.map_err(|e| {
            ClassifierError::storage(format!("Failed to read output directory: {}", e))
        })?;

        let mut indices = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ClassifierError::storage(format!("Failed to read entry: {}", e)))?
        {
            let file_name = entry.file_name().to_string_lossy().to_string();
            if let Some(index) = parse_batch_file_name(&file_name) {
                indices.push(index);
            }
        }
        indices.sort_unstable();
        Ok(indices)
    }

    /// Load the artifacts of batches `0..total_batches`
    ///
    /// Returns the artifacts found, in index order, and the indices missing.
    pub async fn load_batches(&self, total_batches: usize) -> Result<(Vec<BatchArtifact>, Vec<usize>)> {
        let mut artifacts = Vec::new();
        let mut missing = Vec::new();
        for index in 0..total_batches {
            match self.load_batch(index).await? {
                Some(artifact) => artifacts.push(artifact),
                None => missing.push(index),
            }
        }
        Ok((artifacts, missing))
    }

    /// Write the final report
    pub async fn write_report(&self, path: &Path, report: &FinalReport) -> Result<()> {
        write_json_atomic(path, report).await?;
        info!("Final report written to {}", path.display());
        Ok(())
    }
}

fn parse_batch_file_name(name: &str) -> Option<usize> {
    name.strip_prefix("batch_")?
        .strip_suffix("_results.json")?
        .parse()
        .ok()
}

#[async_trait]
impl ItemSink for PersistenceManager {
    async fn record_item(&self, outcome: &ItemOutcome) -> Result<()> {
        PersistenceManager::record_item(self, outcome).await
    }
}
