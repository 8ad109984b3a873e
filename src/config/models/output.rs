//! Output locations

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where artifacts and the final report are written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory holding item, batch and checkpoint artifacts
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Final report file
    #[serde(default = "default_report_path")]
    pub report_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            report_path: default_report_path(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("temp_results")
}

fn default_report_path() -> PathBuf {
    PathBuf::from("final_analysis_results.json")
}
