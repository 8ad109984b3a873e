//! Configuration data models
//!
//! This module defines all configuration structures used by a classification run.

#![allow(missing_docs)]

pub mod analysis;
pub mod batch;
pub mod logging;
pub mod output;
pub mod service;

// Re-export all configuration types
pub use analysis::*;
pub use batch::*;
pub use logging::*;
pub use output::*;
pub use service::*;

/// Default number of records per batch
pub fn default_batch_size() -> usize {
    50
}

/// Default number of concurrent service calls
pub fn default_concurrency() -> usize {
    5
}

/// Default maximum attempts per record
pub fn default_max_retries() -> u32 {
    5
}

/// Default request timeout in seconds
pub fn default_timeout() -> u64 {
    120
}

/// Default number of keywords kept in the report
pub fn default_top_keywords() -> usize {
    20
}

pub(crate) fn default_true() -> bool {
    true
}
