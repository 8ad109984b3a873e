//! Prompt construction

use crate::core::types::Record;
use std::fmt::Write;

const CRITERIA: &str = "\
Classification criteria:
A) Primary - data generated specifically for this study
   - original experimental data, measurements or observations created by the authors for this research
   - new datasets produced and deposited by the authors
   - data collected specifically to answer this paper's research question

B) Secondary - data reused or derived from existing sources
   - previously published datasets downloaded and reanalysed
   - public database records retrieved for comparative analysis
   - existing data repurposed for a new research question

C) None - not a dataset reference, or unrelated
   - citations of other papers (not datasets)
   - references to methods, software or tools
   - mentions in a context unrelated to data use
   - database identifiers mentioned without actual data use
";

/// Build the classification prompt for `record`
///
/// With `mislabel_analysis` the model is also asked whether the input label is
/// correct and what it should be instead.
pub fn build_prompt(record: &Record, mislabel_analysis: bool) -> String {
    let label = record.record_type.as_str();
    let mut prompt = String::with_capacity(record.aggregated_text.len() + 2048);

    let _ = write!(
        prompt,
        "As a dataset classification expert, analyse why the following dataset citation was classified the way it was.

Dataset information:
- Target dataset ID: {id}
- Article ID: {article}
- Classification: {label}

Aggregated text:
{text}

{criteria}
Please analyse:
1. Why was this dataset ID classified as \"{label}\"?
2. Which keywords or phrases in the aggregated text support this classification?
3. Independent of any single dataset ID, what reusable contextual pattern characterises this classification?
",
        id = record.target_dataset_id,
        article = record.article_id,
        label = label,
        text = record.aggregated_text,
        criteria = CRITERIA,
    );

    if mislabel_analysis {
        prompt.push_str("4. If the classification is wrong, what should it be, and why?\n");
    }

    let _ = write!(
        prompt,
        "
Return the analysis as JSON:
{{
    \"target_dataset_id\": \"{id}\",
    \"article_id\": \"{article}\",
    \"original_classification\": \"{label}\",
    \"analysis_reason\": \"detailed reasoning for the classification\",
    \"supporting_keywords\": [\"keyword 1\", \"keyword 2\", \"...\"],
    \"context_pattern\": \"a reusable contextual pattern, preferably not specific to one dataset\"",
        id = record.target_dataset_id,
        article = record.article_id,
        label = label,
    );

    if mislabel_analysis {
        prompt.push_str(
            ",
    \"is_correct_classification\": true,
    \"suggested_classification\": \"the correct classification if the original is wrong\",
    \"confidence_score\": 0.95",
        );
    }
    prompt.push_str("\n}\n");
    prompt
}
