//! Final report aggregation
//!
//! A pure fold over batch artifacts. Timestamps come from the artifacts
//! themselves, so aggregating the same artifacts twice gives the same report.

use crate::core::types::{
    AccuracyAnalysis, BatchArtifact, FinalReport, ItemResult, KeywordCount, ReportMetadata,
    ReportSummary,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::Write;

/// Report options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationOptions {
    /// Emit `accuracy_analysis`
    pub mislabel_analysis: bool,
    pub top_keywords: usize,
    pub batch_size: usize,
}

/// Builds the [`FinalReport`] of a run
#[derive(Debug, Clone)]
pub struct Aggregator {
    options: AggregationOptions,
}

impl Aggregator {
    pub fn new(options: AggregationOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &AggregationOptions {
        &self.options
    }

    /// Fold `artifacts` into a report
    ///
    /// Artifacts are taken in batch order; a batch index seen twice keeps the
    /// first artifact.
    pub fn aggregate(&self, artifacts: &[BatchArtifact], missing_batches: &[usize]) -> FinalReport {
        let mut ordered: Vec<&BatchArtifact> = artifacts.iter().collect();
        ordered.sort_by_key(|a| a.batch_index);
        ordered.dedup_by_key(|a| a.batch_index);

        let detailed_results: Vec<ItemResult> = ordered
            .iter()
            .flat_map(|a| a.results.iter().cloned())
            .collect();
        let failed_items = ordered
            .iter()
            .flat_map(|a| a.failed_items.iter().cloned())
            .collect::<Vec<_>>();

        let summary = ReportSummary {
            classification_distribution: distribution(&detailed_results),
            top_keywords: top_keywords(&detailed_results, self.options.top_keywords),
            context_patterns_by_type: context_patterns(&detailed_results),
            accuracy_analysis: self
                .options
                .mislabel_analysis
                .then(|| accuracy(&detailed_results)),
        };

        let metadata = ReportMetadata {
            total_processed: detailed_results.len(),
            total_failed: failed_items.len(),
            processing_time: ordered.iter().map(|a| a.completed_at).max(),
            started_at: ordered.iter().map(|a| a.started_at).min(),
            batch_size: self.options.batch_size,
            batches_aggregated: ordered.len(),
            missing_batches: missing_batches.to_vec(),
        };

        FinalReport {
            summary,
            detailed_results,
            failed_items,
            metadata,
        }
    }
}

fn distribution(results: &[ItemResult]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for result in results {
        *counts
            .entry(result.original_classification.to_string())
            .or_insert(0) += 1;
    }
    counts
}

/// Most frequent keywords, ties broken alphabetically
fn top_keywords(results: &[ItemResult], limit: usize) -> Vec<KeywordCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for keyword in results.iter().flat_map(|r| r.supporting_keywords.iter()) {
        *counts.entry(keyword.as_str()).or_insert(0) += 1;
    }

    let mut ranked: Vec<KeywordCount> = counts
        .into_iter()
        .map(|(keyword, count)| KeywordCount {
            keyword: keyword.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.keyword.cmp(&b.keyword)));
    ranked.truncate(limit);
    ranked
}

fn context_patterns(results: &[ItemResult]) -> BTreeMap<String, Vec<String>> {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut seen: HashSet<(String, &str)> = HashSet::new();

    for result in results {
        let pattern = result.context_pattern.as_str();
        if pattern.is_empty() {
            continue;
        }
        let label = result.original_classification.to_string();
        if seen.insert((label.clone(), pattern)) {
            grouped.entry(label).or_default().push(pattern.to_string());
        }
    }
    grouped
}

fn accuracy(results: &[ItemResult]) -> AccuracyAnalysis {
    let mut analysis = AccuracyAnalysis {
        total_analyzed: results.len(),
        ..Default::default()
    };

    for result in results {
        match result.is_correct_classification {
            Some(true) => analysis.correct_classifications += 1,
            Some(false) => {
                analysis.incorrect_classifications += 1;
                if let Some(suggested) = &result.suggested_classification {
                    *analysis
                        .suggested_relabels
                        .entry(result.original_classification.to_string())
                        .or_default()
                        .entry(suggested.clone())
                        .or_insert(0) += 1;
                }
            }
            None => analysis.unjudged += 1,
        }
    }
    analysis
}

/// Human-readable run summary
///
/// Counts, success rate, distribution shares, accuracy and the ten most
/// frequent keywords.
pub fn render_summary(report: &FinalReport) -> String {
    let metadata = &report.metadata;
    let summary = &report.summary;
    let mut out = String::new();

    let _ = writeln!(out, "Analysis complete");
    let _ = writeln!(out, "  processed: {}", metadata.total_processed);
    let _ = writeln!(out, "  failed:    {}", metadata.total_failed);
    if let Some(rate) = metadata.success_rate() {
        let _ = writeln!(out, "  success:   {:.1}%", rate);
    }
    if !metadata.missing_batches.is_empty() {
        let _ = writeln!(out, "  missing batches: {:?}", metadata.missing_batches);
    }

    let _ = writeln!(out, "\nClassification distribution:");
    for (label, count) in &summary.classification_distribution {
        let share = *count as f64 * 100.0 / metadata.total_processed.max(1) as f64;
        let _ = writeln!(out, "  {}: {} ({:.1}%)", label, count, share);
    }

    if let Some(accuracy) = &summary.accuracy_analysis {
        let _ = writeln!(out, "\nAccuracy:");
        let _ = writeln!(
            out,
            "  correct: {}  incorrect: {}  unjudged: {}",
            accuracy.correct_classifications, accuracy.incorrect_classifications, accuracy.unjudged
        );
        if let Some(rate) = accuracy.correct_rate() {
            let _ = writeln!(out, "  accuracy: {:.1}%", rate);
        }
    }

    if !summary.top_keywords.is_empty() {
        let _ = writeln!(out, "\nTop keywords:");
        for keyword in summary.top_keywords.iter().take(10) {
            let _ = writeln!(out, "  {}: {}", keyword.keyword, keyword.count);
        }
    }
    out
}
