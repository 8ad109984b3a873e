//! Data model shared by every stage of a classification run
//!
//! Records flow in, [`ItemOutcome`]s come out of the worker pool, batches of
//! outcomes are persisted as [`BatchArtifact`]s, and the run ends with a
//! [`FinalReport`] folded from those artifacts.

mod checkpoint;
mod outcome;
mod record;
mod report;

pub use checkpoint::Checkpoint;
pub use outcome::{
    BatchArtifact, BatchOutcome, ClassificationPayload, FailedItem, ItemOutcome, ItemPosition,
    ItemResult,
};
pub use record::{Record, RecordType};
pub use report::{AccuracyAnalysis, FinalReport, KeywordCount, ReportMetadata, ReportSummary};
