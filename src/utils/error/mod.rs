//! Error handling utilities
//!
//! This module provides the crate error type and the retry machinery that decides
//! which of those errors are worth another attempt.

pub mod error;
pub mod recovery;

// Re-export commonly used types and functions
pub use error::*;
pub use recovery::*;
