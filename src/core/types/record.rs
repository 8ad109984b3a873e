//! Input records

use crate::utils::error::{ClassifierError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Label attached to a dataset mention in the input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecordType {
    /// Data generated specifically for the citing study
    Primary,
    /// Data reused or derived from an existing source
    Secondary,
    /// Not a dataset reference
    None,
}

impl RecordType {
    /// All labels, in display order
    pub const ALL: [RecordType; 3] = [RecordType::Primary, RecordType::Secondary, RecordType::None];

    /// Canonical label text
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Primary => "Primary",
            RecordType::Secondary => "Secondary",
            RecordType::None => "None",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = ClassifierError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "primary" => Ok(RecordType::Primary),
            "secondary" => Ok(RecordType::Secondary),
            "none" => Ok(RecordType::None),
            other => Err(ClassifierError::input_schema(format!(
                "unknown type '{}', expected one of Primary, Secondary, None",
                other
            ))),
        }
    }
}

/// One row of the input dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub target_dataset_id: String,
    pub article_id: String,
    pub aggregated_text: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
}

impl Record {
    /// Create a new record
    pub fn new(
        target_dataset_id: impl Into<String>,
        article_id: impl Into<String>,
        aggregated_text: impl Into<String>,
        record_type: RecordType,
    ) -> Self {
        Self {
            target_dataset_id: target_dataset_id.into(),
            article_id: article_id.into(),
            aggregated_text: aggregated_text.into(),
            record_type,
        }
    }

    /// Identity used to match results back to records
    pub fn key(&self) -> (&str, &str) {
        (&self.target_dataset_id, &self.article_id)
    }
}
