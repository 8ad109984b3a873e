//! Storage layer
//!
//! Durability is local files only: item, batch, checkpoint and report
//! artifacts under the run's output directory.

/// File storage module
pub mod files;

pub use files::{PersistenceManager, RunTotals};
