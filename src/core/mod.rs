//! Core functionality for classification runs
//!
//! This module contains the data model, the dataset readers, batching, the
//! record classifier, aggregation and the run orchestrator.

pub mod aggregator;
pub mod batch;
pub mod classifier;
pub mod dataset;
pub mod orchestrator;
pub mod types;

pub use aggregator::{AggregationOptions, Aggregator, render_summary};
pub use dataset::Dataset;
pub use orchestrator::{Orchestrator, RunContext, RunState, StartPoint};
