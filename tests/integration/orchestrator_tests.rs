//! Orchestrator runs over a scripted service and a temporary output directory

use crate::common::assertions::{ReportAssertions, assert_checkpoint_at};
use crate::common::{RecordFactory, Reply, ScriptedService, orchestrator_in};
use crate::{assert_approx_eq, assert_file_exists};
use batch_classifier::storage::{PersistenceManager, RunTotals};
use batch_classifier::{ClassifierError, FinalReport, RunState, StartPoint};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// B is rejected, D needs two retries
fn scenario_service() -> ScriptedService {
    ScriptedService::new()
        .script("A", vec![Reply::payload(&["deposited", "GEO"], "deposited in")])
        .script("B", vec![Reply::BadRequest])
        .script(
            "D",
            vec![
                Reply::Unavailable,
                Reply::Unavailable,
                Reply::payload(&["downloaded"], "retrieved from"),
            ],
        )
}

async fn scenario_run(dir: &TempDir) -> (FinalReport, Arc<ScriptedService>) {
    let service = Arc::new(scenario_service());
    let mut orchestrator = orchestrator_in(dir.path(), 2, service.clone()).await;
    let report = orchestrator
        .run(&RecordFactory::scenario(), StartPoint::Fresh)
        .await
        .unwrap();
    assert_eq!(orchestrator.state(), RunState::Done);
    (report, service)
}

#[tokio::test]
async fn test_scenario_run() {
    let dir = TempDir::new().unwrap();
    let (report, service) = scenario_run(&dir).await;
    let out = dir.path().join("out");

    for batch in 0..3 {
        assert_file_exists!(out.join(format!("batch_{}_results.json", batch)));
    }
    assert!(!out.join("batch_3_results.json").exists());
    assert_file_exists!(out.join("batch_1_item_1.json"));
    assert_file_exists!(dir.path().join("report.json"));

    report.assert_results(&["A", "C", "D", "E"]);
    report.assert_failed(&["B"]);
    assert_eq!(report.summary.classification_distribution["Primary"], 3);
    assert_eq!(report.summary.classification_distribution["Secondary"], 1);
    assert_eq!(report.summary.classification_distribution.len(), 2);
    assert_approx_eq!(report.metadata.success_rate().unwrap(), 80.0);

    let store = PersistenceManager::new(&out).await.unwrap();
    let checkpoint = store.load_checkpoint().await.unwrap().unwrap();
    assert_eq!(checkpoint.last_completed_batch, 2);
    assert_eq!(checkpoint.total_completed, 4);
    assert_eq!(checkpoint.total_failed, 1);

    assert_eq!(service.calls_for("B"), 1);
    assert_eq!(service.calls_for("D"), 3);
    let d = &report.detailed_results[2];
    assert_eq!(d.article_id, "D");
    assert_eq!(d.attempts, 3);
    assert_eq!(report.failed_items[0].error_kind, "bad_request");
}

#[tokio::test]
async fn test_resume_matches_uninterrupted_run() {
    let full_dir = TempDir::new().unwrap();
    let (full, _) = scenario_run(&full_dir).await;

    // Simulate a crash right after batch 0 became durable
    let dir = TempDir::new().unwrap();
    scenario_run(&dir).await;
    let store = PersistenceManager::new(dir.path().join("out")).await.unwrap();
    for batch in [1, 2] {
        std::fs::remove_file(store.batch_path(batch)).unwrap();
    }
    store.reset_checkpoint().await.unwrap();
    store
        .advance_checkpoint(
            0,
            RunTotals {
                completed: 1,
                failed: 1,
            },
            2,
        )
        .await
        .unwrap();

    let service = Arc::new(scenario_service());
    let mut orchestrator = orchestrator_in(dir.path(), 2, service.clone()).await;
    let resumed = orchestrator
        .run(&RecordFactory::scenario(), StartPoint::Resume)
        .await
        .unwrap();

    assert_eq!(service.calls_for("A"), 0);
    assert_eq!(service.calls_for("B"), 0);
    assert_eq!(resumed.summary, full.summary);
    assert_eq!(resumed.failed_items, full.failed_items);
    assert_eq!(
        resumed
            .detailed_results
            .iter()
            .map(|r| (&r.article_id, r.position))
            .collect::<Vec<_>>(),
        full.detailed_results
            .iter()
            .map(|r| (&r.article_id, r.position))
            .collect::<Vec<_>>()
    );
    assert_eq!(orchestrator.totals(), RunTotals { completed: 4, failed: 1 });
}

#[tokio::test]
async fn test_fatal_persistence_error_halts_run() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");
    std::fs::create_dir_all(out.join("batch_1_results.json")).unwrap();

    let service = Arc::new(scenario_service());
    let mut orchestrator = orchestrator_in(dir.path(), 2, service.clone()).await;
    let err = orchestrator
        .run(&RecordFactory::scenario(), StartPoint::Fresh)
        .await
        .unwrap_err();

    assert_eq!(orchestrator.state(), RunState::Failed);
    assert!(matches!(
        err,
        ClassifierError::Halted {
            last_completed_batch: Some(0),
            ..
        }
    ));
    assert_checkpoint_at(orchestrator.store(), Some(0)).await;
    assert_eq!(service.calls_for("E"), 0);
    assert!(!dir.path().join("report.json").exists());
}

#[tokio::test]
async fn test_fresh_run_discards_stale_checkpoint() {
    let dir = TempDir::new().unwrap();
    scenario_run(&dir).await;

    let service = Arc::new(ScriptedService::new());
    let mut orchestrator = orchestrator_in(dir.path(), 2, service.clone()).await;
    orchestrator
        .run(&RecordFactory::scenario(), StartPoint::Fresh)
        .await
        .unwrap();

    assert_eq!(service.total_calls(), 5);
    assert_checkpoint_at(orchestrator.store(), Some(2)).await;
}

#[tokio::test]
async fn test_start_batch_override_skips_earlier_batches() {
    let dir = TempDir::new().unwrap();
    let service = Arc::new(ScriptedService::new());
    let mut orchestrator = orchestrator_in(dir.path(), 2, service.clone()).await;

    let report = orchestrator
        .run(&RecordFactory::many(6), StartPoint::ResumeFrom(2))
        .await
        .unwrap();

    assert_eq!(service.total_calls(), 2);
    report.assert_results(&["R4", "R5"]);
    assert_eq!(report.metadata.missing_batches, vec![0, 1]);
}

#[tokio::test]
async fn test_empty_dataset_produces_empty_report() {
    let dir = TempDir::new().unwrap();
    let service = Arc::new(ScriptedService::new());
    let mut orchestrator = orchestrator_in(dir.path(), 2, service.clone()).await;

    let report = orchestrator.run(&[], StartPoint::Fresh).await.unwrap();

    assert_eq!(service.total_calls(), 0);
    assert!(report.detailed_results.is_empty());
    assert_eq!(report.metadata.success_rate(), None);
    assert_checkpoint_at(orchestrator.store(), None).await;
}

#[tokio::test]
async fn test_items_resolve_concurrently_within_batch() {
    let dir = TempDir::new().unwrap();
    let slow = Reply::Delayed(
        Duration::from_millis(50),
        Box::new(Reply::payload(&["slow"], "slow")),
    );
    let service = Arc::new(
        ScriptedService::new()
            .script("R0", vec![slow.clone()])
            .script("R1", vec![slow.clone()])
            .script("R2", vec![slow]),
    );
    let mut orchestrator = orchestrator_in(dir.path(), 3, service).await;

    let started = std::time::Instant::now();
    let report = orchestrator
        .run(&RecordFactory::many(3), StartPoint::Fresh)
        .await
        .unwrap();

    assert!(started.elapsed() < Duration::from_millis(140));
    report.assert_results(&["R0", "R1", "R2"]);
}
