//! Per-item and per-batch classification outcomes

use super::record::{Record, RecordType};
use crate::utils::error::ClassifierError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Where an item sits in the dataset and in its batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemPosition {
    /// Zero-based row index in the input dataset
    pub row_index: usize,
    /// Zero-based batch index
    pub batch_index: usize,
    /// Zero-based index inside the batch
    pub item_index: usize,
}

/// Structured answer returned by the classification service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationPayload {
    #[serde(default)]
    pub target_dataset_id: Option<String>,
    #[serde(default)]
    pub article_id: Option<String>,
    #[serde(default)]
    pub original_classification: Option<String>,
    pub analysis_reason: String,
    #[serde(default)]
    pub supporting_keywords: Vec<String>,
    #[serde(default)]
    pub context_pattern: String,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_correct_classification: Option<bool>,
    #[serde(default)]
    pub suggested_classification: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub confidence_score: Option<f64>,
}

fn lenient_bool<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Bool(b)) => Some(b),
        Some(serde_json::Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// A successfully classified record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemResult {
    pub target_dataset_id: String,
    pub article_id: String,
    /// Label carried by the input record
    pub original_classification: RecordType,
    pub analysis_reason: String,
    pub supporting_keywords: Vec<String>,
    pub context_pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_correct_classification: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_classification: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f64>,
    /// Number of service calls it took
    pub attempts: u32,
    pub position: ItemPosition,
}

impl ItemResult {
    /// Combine a decoded payload with the record it answers
    ///
    /// Correctness fields are dropped unless mislabel analysis is enabled.
    pub fn from_payload(
        record: &Record,
        position: ItemPosition,
        payload: ClassificationPayload,
        attempts: u32,
        mislabel_analysis: bool,
    ) -> Self {
        let (is_correct_classification, suggested_classification) = if mislabel_analysis {
            (
                payload.is_correct_classification,
                payload
                    .suggested_classification
                    .filter(|s| !s.trim().is_empty()),
            )
        } else {
            (None, None)
        };

        Self {
            target_dataset_id: record.target_dataset_id.clone(),
            article_id: record.article_id.clone(),
            original_classification: record.record_type,
            analysis_reason: payload.analysis_reason,
            supporting_keywords: payload
                .supporting_keywords
                .into_iter()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect(),
            context_pattern: payload.context_pattern.trim().to_string(),
            is_correct_classification,
            suggested_classification,
            confidence_score: payload.confidence_score,
            attempts,
            position,
        }
    }
}

/// A record that could not be classified
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedItem {
    pub record: Record,
    pub position: ItemPosition,
    /// Display text of the last error
    pub error: String,
    /// Machine-readable error tag
    pub error_kind: String,
    /// Whether the last error was retryable (attempts ran out)
    pub retryable: bool,
    pub attempts: u32,
}

impl FailedItem {
    /// Build a failed item from the last error seen
    pub fn new(record: &Record, position: ItemPosition, error: &ClassifierError, attempts: u32) -> Self {
        Self {
            record: record.clone(),
            position,
            error: error.to_string(),
            error_kind: error.kind().to_string(),
            retryable: error.is_retryable(),
            attempts,
        }
    }
}

/// Terminal outcome of one item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemOutcome {
    Completed(ItemResult),
    Failed(FailedItem),
}

impl ItemOutcome {
    pub fn position(&self) -> ItemPosition {
        match self {
            ItemOutcome::Completed(result) => result.position,
            ItemOutcome::Failed(failed) => failed.position,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, ItemOutcome::Completed(_))
    }
}

/// Outcomes of one drained batch, each in batch input order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    pub results: Vec<ItemResult>,
    pub failed_items: Vec<FailedItem>,
}

impl BatchOutcome {
    /// Partition ordered outcomes into successes and failures
    pub fn from_ordered(outcomes: Vec<ItemOutcome>) -> Self {
        let mut batch = Self::default();
        for outcome in outcomes {
            match outcome {
                ItemOutcome::Completed(result) => batch.results.push(result),
                ItemOutcome::Failed(failed) => batch.failed_items.push(failed),
            }
        }
        batch
    }

    pub fn len(&self) -> usize {
        self.results.len() + self.failed_items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Durable record of one fully drained batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchArtifact {
    pub batch_index: usize,
    /// Configured batch size of the run that produced it
    pub batch_size: usize,
    /// Number of records in this batch
    pub item_count: usize,
    pub results: Vec<ItemResult>,
    pub failed_items: Vec<FailedItem>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl BatchArtifact {
    /// Whether every item of the batch is accounted for
    pub fn is_complete(&self) -> bool {
        self.results.len() + self.failed_items.len() == self.item_count
    }
}
