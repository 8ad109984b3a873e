//! Analysis options

use super::*;
use serde::{Deserialize, Serialize};

/// What the classification prompt asks for and what the report keeps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Ask the model whether the input label is correct
    #[serde(default = "default_true")]
    pub mislabel_analysis: bool,
    /// Number of keywords kept in the report summary
    #[serde(default = "default_top_keywords")]
    pub top_keywords: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            mislabel_analysis: true,
            top_keywords: default_top_keywords(),
        }
    }
}
