//! Input dataset readers
//!
//! Records are read once, in file order, from Parquet, CSV or JSON Lines.
//! The format is picked by file extension. Every reader checks the required
//! columns before yielding any record. A missing column fails the load; a bad
//! row is skipped with a warning.

use crate::core::types::{Record, RecordType};
use crate::utils::error::{ClassifierError, Result};
use parquet::file::reader::{FileReader, SerializedFileReader};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Columns every input dataset must carry
pub const REQUIRED_COLUMNS: [&str; 4] = ["target_dataset_id", "article_id", "aggregated_text", "type"];

/// Supported input encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    Parquet,
    Csv,
    JsonLines,
}

impl DatasetFormat {
    /// Detect the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("parquet") => Ok(DatasetFormat::Parquet),
            Some("csv") => Ok(DatasetFormat::Csv),
            Some("jsonl") | Some("ndjson") => Ok(DatasetFormat::JsonLines),
            _ => Err(ClassifierError::dataset(format!(
                "unsupported dataset format for {} (expected .parquet, .csv or .jsonl)",
                path.display()
            ))),
        }
    }
}

/// Ordered, fully loaded input records
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    source: Option<PathBuf>,
    records: Vec<Record>,
    skipped: usize,
}

impl Dataset {
    /// Wrap records already in memory
    pub fn from_records(records: Vec<Record>) -> Self {
        Self {
            source: None,
            records,
            skipped: 0,
        }
    }

    /// Read a dataset file synchronously
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = DatasetFormat::from_path(path)?;
        info!(path = %path.display(), ?format, "Reading dataset");

        let rows = match format {
            DatasetFormat::Parquet => read_parquet(path)?,
            DatasetFormat::Csv => read_csv(path)?,
            DatasetFormat::JsonLines => read_json_lines(path)?,
        };

        if rows.skipped > 0 {
            warn!(skipped = rows.skipped, "Some rows were unusable and left out");
        }
        info!(rows = rows.records.len(), "Dataset loaded");
        Ok(Self {
            source: Some(path.to_path_buf()),
            records: rows.records,
            skipped: rows.skipped,
        })
    }

    /// Read a dataset file on the blocking pool
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        tokio::task::spawn_blocking(move || Self::open(path))
            .await
            .map_err(|e| ClassifierError::internal(format!("dataset reader panicked: {}", e)))?
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows left out for a null id or an unknown label
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

/// Records decoded so far, plus the count of rows left out
#[derive(Debug, Default)]
struct Rows {
    records: Vec<Record>,
    skipped: usize,
}

impl Rows {
    fn push(&mut self, row_index: usize, row: &Map<String, Value>) {
        match record_from_row(row_index, row) {
            Ok(record) => self.records.push(record),
            Err(e) => {
                warn!(row = row_index, "Skipping row: {}", e);
                self.skipped += 1;
            }
        }
    }
}

fn check_columns<'a>(path: &Path, present: impl IntoIterator<Item = &'a str>) -> Result<()> {
    let present: Vec<&str> = present.into_iter().collect();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| !present.contains(c))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ClassifierError::input_schema(format!(
            "{} is missing required columns: {}",
            path.display(),
            missing.join(", ")
        )))
    }
}

fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// Convert one decoded row into a record
///
/// Numeric ids are stringified. A null text cell becomes empty text and a
/// null or blank type becomes `None`. A null id or an unknown type is a
/// schema error for this row.
pub fn record_from_row(row_index: usize, row: &Map<String, Value>) -> Result<Record> {
    let required = |column: &str| -> Result<String> {
        row.get(column).and_then(cell_text).ok_or_else(|| {
            ClassifierError::input_schema(format!("row {}: column '{}' is null or missing", row_index, column))
        })
    };

    let target_dataset_id = required("target_dataset_id")?;
    let article_id = required("article_id")?;
    let record_type = match row.get("type").and_then(cell_text) {
        Some(label) if !label.trim().is_empty() => label
            .parse()
            .map_err(|e| ClassifierError::input_schema(format!("row {}: {}", row_index, e)))?,
        _ => RecordType::None,
    };
    let aggregated_text = row
        .get("aggregated_text")
        .and_then(cell_text)
        .unwrap_or_default();

    Ok(Record {
        target_dataset_id,
        article_id,
        aggregated_text,
        record_type,
    })
}

fn read_parquet(path: &Path) -> Result<Rows> {
    let file = File::open(path)
        .map_err(|e| ClassifierError::dataset(format!("failed opening {}: {}", path.display(), e)))?;
    let reader = SerializedFileReader::new(file)
        .map_err(|e| ClassifierError::dataset(format!("failed reading parquet {}: {}", path.display(), e)))?;

    let schema = reader.metadata().file_metadata().schema_descr_ptr();
    check_columns(path, schema.root_schema().get_fields().iter().map(|f| f.name()))?;
    debug!(
        row_groups = reader.num_row_groups(),
        rows = reader.metadata().file_metadata().num_rows(),
        "Parquet metadata read"
    );

    let rows = reader
        .get_row_iter(None)
        .map_err(|e| ClassifierError::dataset(format!("failed iterating parquet {}: {}", path.display(), e)))?;

    let mut records = Rows::default();
    for (row_index, row) in rows.enumerate() {
        let row = row.map_err(|e| {
            ClassifierError::dataset(format!("failed reading parquet row {}: {}", row_index, e))
        })?;
        match row.to_json_value() {
            Value::Object(map) => records.push(row_index, &map),
            other => {
                return Err(ClassifierError::dataset(format!(
                    "parquet row {} decoded to a non-object value: {}",
                    row_index, other
                )));
            }
        }
    }
    Ok(records)
}

fn read_csv(path: &Path) -> Result<Rows> {
    let file = File::open(path)
        .map_err(|e| ClassifierError::dataset(format!("failed opening {}: {}", path.display(), e)))?;
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(BufReader::new(file));

    let headers = csv_reader
        .headers()
        .map_err(|e| ClassifierError::dataset(format!("failed reading CSV header: {}", e)))?
        .clone();
    check_columns(path, headers.iter())?;

    let mut records = Rows::default();
    for (row_index, result) in csv_reader.records().enumerate() {
        let row = result
            .map_err(|e| ClassifierError::dataset(format!("failed reading CSV row {}: {}", row_index, e)))?;
        let map: Map<String, Value> = headers
            .iter()
            .zip(row.iter())
            .map(|(name, cell)| (name.to_string(), Value::String(cell.to_string())))
            .collect();
        records.push(row_index, &map);
    }
    Ok(records)
}

fn read_json_lines(path: &Path) -> Result<Rows> {
    let file = File::open(path)
        .map_err(|e| ClassifierError::dataset(format!("failed opening {}: {}", path.display(), e)))?;

    let mut records = Rows::default();
    let mut row_index = 0;
    for (line_no, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(&line).map_err(|e| {
            ClassifierError::dataset(format!("line {}: invalid JSON: {}", line_no + 1, e))
        })?;
        let Value::Object(map) = value else {
            return Err(ClassifierError::dataset(format!(
                "line {}: expected a JSON object",
                line_no + 1
            )));
        };
        if row_index == 0 {
            check_columns(path, map.keys().map(String::as_str))?;
        }
        records.push(row_index, &map);
        row_index += 1;
    }
    Ok(records)
}
