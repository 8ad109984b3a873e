//! Integration tests for batch-classifier
//!
//! These tests run real components over temporary directories. Only the
//! classification service is scripted or served by a mock HTTP server.

pub mod chat_client_tests;
pub mod orchestrator_tests;
pub mod worker_pool_tests;
