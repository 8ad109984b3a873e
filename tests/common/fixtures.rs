//! Test fixtures and data factories
//!
//! Factories build real records and real orchestrators over temporary
//! directories; only the classification service is scripted.

use super::services::ScriptedService;
use batch_classifier::core::classifier::RecordClassifier;
use batch_classifier::core::{Orchestrator, RunContext};
use batch_classifier::storage::PersistenceManager;
use batch_classifier::utils::error::{RetryConfig, RetryPolicy};
use batch_classifier::{Record, RecordType};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Factory for creating test records
pub struct RecordFactory;

impl RecordFactory {
    /// Record with a generated text
    pub fn create(article_id: &str, record_type: RecordType) -> Record {
        Record::new(
            "GSE100",
            article_id,
            format!("Data for {} were deposited in GEO under GSE100.", article_id),
            record_type,
        )
    }

    /// The five-record scenario `[A, B, C, D, E]`: three Primary, one
    /// Secondary and one None
    pub fn scenario() -> Vec<Record> {
        vec![
            Self::create("A", RecordType::Primary),
            Self::create("B", RecordType::None),
            Self::create("C", RecordType::Primary),
            Self::create("D", RecordType::Secondary),
            Self::create("E", RecordType::Primary),
        ]
    }

    /// `n` Primary records with ids `R0..Rn`
    pub fn many(n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| Self::create(&format!("R{}", i), RecordType::Primary))
            .collect()
    }
}

/// Four attempts with millisecond delays
pub fn fast_retry() -> RetryPolicy {
    RetryPolicy::new(
        RetryConfig::default()
            .with_max_attempts(4)
            .with_delays(Duration::from_millis(1), Duration::from_millis(5))
            .with_jitter(false),
    )
}

/// Orchestrator writing to `dir/out` and `dir/report.json`
pub async fn orchestrator_in(
    dir: &Path,
    batch_size: usize,
    service: Arc<ScriptedService>,
) -> Orchestrator {
    let context = RunContext {
        batch_size,
        concurrency: 3,
        start_batch: 0,
        report_path: dir.join("report.json"),
        mislabel_analysis: true,
        top_keywords: 10,
    };
    let classifier = RecordClassifier::new(service, fast_retry(), true);
    let store = PersistenceManager::new(dir.join("out"))
        .await
        .expect("output directory");
    Orchestrator::new(context, classifier, store)
}
