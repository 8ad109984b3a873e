//! End-to-end tests for batch-classifier
//!
//! These tests call a real chat-completions service and require an API key.
//! Run with: cargo test -- --ignored
//!
//! Required environment variables:
//! - CLASSIFIER_API_KEY
//!
//! Optional:
//! - CLASSIFIER_BASE_URL, CLASSIFIER_MODEL

pub mod classification;
