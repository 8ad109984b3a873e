//! Local file artifacts
//!
//! This module provides atomic JSON writes and the per-run artifact layout.

mod artifacts;
pub mod atomic;

pub use artifacts::{PersistenceManager, RunTotals};
pub use atomic::{read_json, write_atomic, write_json_atomic};
