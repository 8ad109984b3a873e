//! Classification of a few records against a real service

use crate::common::RecordFactory;
use crate::skip_without_env;
use batch_classifier::core::classifier::{ChatCompletionClient, RecordClassifier};
use batch_classifier::core::{Orchestrator, RunContext};
use batch_classifier::storage::PersistenceManager;
use batch_classifier::utils::error::RetryPolicy;
use batch_classifier::{Config, StartPoint};
use std::sync::Arc;
use tempfile::TempDir;

#[tokio::test]
#[ignore]
async fn test_small_dataset_end_to_end() {
    skip_without_env!("CLASSIFIER_API_KEY");

    let dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.apply_env();
    config.batch.batch_size = 2;
    config.batch.concurrency = 2;
    config.output.output_dir = dir.path().join("out");
    config.output.report_path = dir.path().join("report.json");
    config.validate().unwrap();

    let client = ChatCompletionClient::new(config.service.clone()).unwrap();
    let classifier = RecordClassifier::new(
        Arc::new(client),
        RetryPolicy::new(config.batch.retry_config()),
        config.analysis.mislabel_analysis,
    );
    let store = PersistenceManager::new(&config.output.output_dir).await.unwrap();
    let mut orchestrator = Orchestrator::new(RunContext::from_config(&config), classifier, store);

    let records = RecordFactory::scenario();
    let report = orchestrator.run(&records, StartPoint::Fresh).await.unwrap();

    assert_eq!(
        report.metadata.total_processed + report.metadata.total_failed,
        records.len()
    );
    assert!(dir.path().join("report.json").exists());
}
