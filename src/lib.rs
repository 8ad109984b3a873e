//! # batch-classifier
//!
//! Resumable, concurrent classification of tabular dataset records through an
//! external text-classification service.
//!
//! ## Features
//!
//! - **Batching**: fixed-size batches with deterministic membership
//! - **Bounded concurrency**: a worker pool per batch with retry and backoff
//! - **Durability**: per-item, per-batch and checkpoint artifacts written atomically
//! - **Resume**: continue after the last durable batch, or from an explicit batch
//! - **Reporting**: distribution, keywords, context patterns and accuracy
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use batch_classifier::core::classifier::{ChatCompletionClient, RecordClassifier};
//! use batch_classifier::core::{Dataset, Orchestrator, RunContext, StartPoint};
//! use batch_classifier::storage::PersistenceManager;
//! use batch_classifier::utils::error::RetryPolicy;
//! use batch_classifier::Config;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::from_file("config/classifier.yaml").await?;
//!     config.apply_env();
//!
//!     let dataset = Dataset::load("articles.parquet").await?;
//!     let client = ChatCompletionClient::new(config.service.clone())?;
//!     let classifier = RecordClassifier::new(
//!         Arc::new(client),
//!         RetryPolicy::new(config.batch.retry_config()),
//!         config.analysis.mislabel_analysis,
//!     );
//!     let store = PersistenceManager::new(&config.output.output_dir).await?;
//!
//!     let mut orchestrator = Orchestrator::new(RunContext::from_config(&config), classifier, store);
//!     let report = orchestrator.run(dataset.records(), StartPoint::Resume).await?;
//!     println!("{} records classified", report.metadata.total_processed);
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod core;
pub mod storage;
pub mod utils;

// Re-export main types
pub use config::Config;
pub use utils::error::{ClassifierError, Result};

pub use core::types::{
    BatchArtifact, Checkpoint, FailedItem, FinalReport, ItemOutcome, ItemResult, Record,
    RecordType,
};
pub use core::{Dataset, Orchestrator, RunContext, RunState, StartPoint};

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Description of the crate
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Build information
#[derive(Debug, Clone)]
pub struct BuildInfo {
    /// Version number
    pub version: &'static str,
    /// Build timestamp, seconds since the epoch
    pub build_time: &'static str,
    /// Git commit hash
    pub git_hash: &'static str,
    /// Rust version
    pub rust_version: &'static str,
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self {
            version: VERSION,
            build_time: option_env!("BUILD_TIME").unwrap_or("unknown"),
            git_hash: option_env!("GIT_HASH").unwrap_or("unknown"),
            rust_version: option_env!("RUST_VERSION").unwrap_or("unknown"),
        }
    }
}

impl std::fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} ({}, built {}, {})",
            NAME, self.version, self.git_hash, self.build_time, self.rust_version
        )
    }
}

/// Build information of this binary
pub fn build_info() -> BuildInfo {
    BuildInfo::default()
}
