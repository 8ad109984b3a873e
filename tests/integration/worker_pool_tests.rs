//! Worker pool driving the real record classifier

use crate::common::{RecordFactory, Reply, ScriptedService, fast_retry};
use async_trait::async_trait;
use batch_classifier::core::batch::{BatchStats, ItemSink, WorkerPool, batch_at};
use batch_classifier::core::classifier::RecordClassifier;
use batch_classifier::utils::error::Result;
use batch_classifier::{ClassifierError, ItemOutcome};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct ArrivalSink {
    arrivals: Mutex<Vec<String>>,
}

#[async_trait]
impl ItemSink for ArrivalSink {
    async fn record_item(&self, outcome: &ItemOutcome) -> Result<()> {
        let id = match outcome {
            ItemOutcome::Completed(result) => result.article_id.clone(),
            ItemOutcome::Failed(failed) => failed.record.article_id.clone(),
        };
        self.arrivals.lock().unwrap().push(id);
        Ok(())
    }
}

struct BrokenSink;

#[async_trait]
impl ItemSink for BrokenSink {
    async fn record_item(&self, _outcome: &ItemOutcome) -> Result<()> {
        Err(ClassifierError::storage("disk full"))
    }
}

fn delayed(ms: u64) -> Reply {
    Reply::Delayed(
        Duration::from_millis(ms),
        Box::new(Reply::payload(&["delayed"], "delayed")),
    )
}

#[tokio::test]
async fn test_outcomes_keep_input_order_when_completion_is_reversed() {
    let service = Arc::new(
        ScriptedService::new()
            .script("R0", vec![delayed(100)])
            .script("R1", vec![delayed(75)])
            .script("R2", vec![delayed(50)])
            .script("R3", vec![delayed(25)])
            .script("R4", vec![delayed(1)]),
    );
    let classifier = &RecordClassifier::new(service, fast_retry(), false);
    let records = RecordFactory::many(5);
    let batch = batch_at(&records, 5, 0);
    let sink = ArrivalSink::default();

    let outcome = WorkerPool::new(5)
        .run_batch(
            &batch,
            move |record, position| classifier.classify(record, position),
            &sink,
        )
        .await
        .unwrap();

    assert_eq!(*sink.arrivals.lock().unwrap(), vec!["R4", "R3", "R2", "R1", "R0"]);
    let ids: Vec<&str> = outcome
        .results
        .iter()
        .map(|r| r.article_id.as_str())
        .collect();
    assert_eq!(ids, vec!["R0", "R1", "R2", "R3", "R4"]);
}

#[tokio::test]
async fn test_mixed_outcomes_are_partitioned() {
    let service = Arc::new(
        ScriptedService::new()
            .script("R1", vec![Reply::BadRequest])
            .script("R3", vec![Reply::Unavailable]),
    );
    let classifier = &RecordClassifier::new(service.clone(), fast_retry(), false);
    let records = RecordFactory::many(4);
    let batch = batch_at(&records, 4, 0);

    let outcome = WorkerPool::new(2)
        .run_batch(
            &batch,
            move |record, position| classifier.classify(record, position),
            &ArrivalSink::default(),
        )
        .await
        .unwrap();

    assert_eq!(
        BatchStats::from(&outcome),
        BatchStats {
            total: 4,
            succeeded: 2,
            failed: 2
        }
    );
    assert_eq!(outcome.failed_items[0].record.article_id, "R1");
    assert_eq!(outcome.failed_items[0].attempts, 1);
    assert_eq!(outcome.failed_items[1].record.article_id, "R3");
    assert_eq!(outcome.failed_items[1].attempts, 4);
    assert!(outcome.failed_items[1].retryable);
    assert_eq!(service.calls_for("R3"), 4);
}

#[tokio::test]
async fn test_sink_failure_is_fatal() {
    let service = Arc::new(ScriptedService::new());
    let classifier = &RecordClassifier::new(service, fast_retry(), false);
    let records = RecordFactory::many(2);
    let batch = batch_at(&records, 2, 0);

    let err = WorkerPool::new(2)
        .run_batch(
            &batch,
            move |record, position| classifier.classify(record, position),
            &BrokenSink,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ClassifierError::Storage(_)));
}
