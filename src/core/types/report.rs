//! Final report shape

use super::outcome::{FailedItem, ItemResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Keyword with its number of occurrences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: usize,
}

/// Correctness judgments, present only when mislabel analysis is enabled
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccuracyAnalysis {
    pub total_analyzed: usize,
    pub correct_classifications: usize,
    pub incorrect_classifications: usize,
    /// Results that carried no judgment
    pub unjudged: usize,
    /// Original label -> suggested label -> count, for incorrect results
    pub suggested_relabels: BTreeMap<String, BTreeMap<String, usize>>,
}

impl AccuracyAnalysis {
    /// Share of judged results that were correct, in percent
    pub fn correct_rate(&self) -> Option<f64> {
        let judged = self.correct_classifications + self.incorrect_classifications;
        (judged > 0).then(|| self.correct_classifications as f64 * 100.0 / judged as f64)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub classification_distribution: BTreeMap<String, usize>,
    pub top_keywords: Vec<KeywordCount>,
    pub context_patterns_by_type: BTreeMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy_analysis: Option<AccuracyAnalysis>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub total_processed: usize,
    pub total_failed: usize,
    /// Completion time of the most recent batch aggregated
    pub processing_time: Option<DateTime<Utc>>,
    /// Start time of the earliest batch aggregated
    pub started_at: Option<DateTime<Utc>>,
    pub batch_size: usize,
    pub batches_aggregated: usize,
    /// Expected batch indices that had no artifact
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_batches: Vec<usize>,
}

impl ReportMetadata {
    /// Share of resolved items that succeeded, in percent
    pub fn success_rate(&self) -> Option<f64> {
        let total = self.total_processed + self.total_failed;
        (total > 0).then(|| self.total_processed as f64 * 100.0 / total as f64)
    }
}

/// Aggregate of every batch artifact of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalReport {
    pub summary: ReportSummary,
    pub detailed_results: Vec<ItemResult>,
    pub failed_items: Vec<FailedItem>,
    pub metadata: ReportMetadata,
}
