//! Classification service seam and the per-record retrying classifier

use super::decode::decode_payload;
use super::prompt::build_prompt;
use crate::core::types::{FailedItem, ItemOutcome, ItemPosition, ItemResult, Record};
use crate::utils::error::{Result, RetryPolicy};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// One request to the classification service
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationRequest {
    pub target_dataset_id: String,
    pub article_id: String,
    pub prompt: String,
}

impl ClassificationRequest {
    pub fn for_record(record: &Record, mislabel_analysis: bool) -> Self {
        Self {
            target_dataset_id: record.target_dataset_id.clone(),
            article_id: record.article_id.clone(),
            prompt: build_prompt(record, mislabel_analysis),
        }
    }
}

/// Remote text classification
///
/// Implementations return the raw answer text; decoding happens in
/// [`RecordClassifier`].
#[async_trait]
pub trait ClassificationService: Send + Sync {
    async fn complete(&self, request: &ClassificationRequest) -> Result<String>;

    /// Short name used in logs
    fn name(&self) -> &str {
        "classification-service"
    }
}

/// Classifies single records with retry, backoff and two-stage decoding
#[derive(Clone)]
pub struct RecordClassifier {
    service: Arc<dyn ClassificationService>,
    retry: RetryPolicy,
    mislabel_analysis: bool,
}

impl std::fmt::Debug for RecordClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordClassifier")
            .field("service", &self.service.name())
            .field("retry", &self.retry)
            .field("mislabel_analysis", &self.mislabel_analysis)
            .finish()
    }
}

impl RecordClassifier {
    pub fn new(service: Arc<dyn ClassificationService>, retry: RetryPolicy, mislabel_analysis: bool) -> Self {
        Self {
            service,
            retry,
            mislabel_analysis,
        }
    }

    pub fn mislabel_analysis(&self) -> bool {
        self.mislabel_analysis
    }

    /// Classify `record`, never failing: errors become a [`FailedItem`]
    pub async fn classify(&self, record: &Record, position: ItemPosition) -> ItemOutcome {
        let request = ClassificationRequest::for_record(record, self.mislabel_analysis);
        let request = &request;

        let outcome = self
            .retry
            .call(move |attempt| async move {
                debug!(
                    batch = position.batch_index,
                    item = position.item_index,
                    attempt,
                    service = self.service.name(),
                    "Calling classification service"
                );
                let content = self.service.complete(request).await?;
                decode_payload(&content)
            })
            .await;

        match outcome.result {
            Ok(payload) => ItemOutcome::Completed(ItemResult::from_payload(
                record,
                position,
                payload,
                outcome.attempts,
                self.mislabel_analysis,
            )),
            Err(error) => ItemOutcome::Failed(FailedItem::new(record, position, &error, outcome.attempts)),
        }
    }
}
