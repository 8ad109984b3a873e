//! Error recovery utilities
//!
//! Bounded retries with exponential backoff for calls to the classification service.

mod retry;
mod types;

pub use retry::RetryPolicy;
pub use types::{RetryConfig, RetryOutcome};
