//! Utility modules
//!
//! - **error**: Error taxonomy and retry/backoff
//! - **logging**: Tracing subscriber setup

pub mod error;
pub mod logging;
