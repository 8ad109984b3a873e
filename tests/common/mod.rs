//! Common test utilities for batch-classifier
//!
//! - Record and artifact fixtures
//! - A scripted classification service keyed by article id
//! - Custom assertions and helpers

pub mod fixtures;
pub mod services;

pub use fixtures::{RecordFactory, orchestrator_in, fast_retry};
pub use services::{Reply, ScriptedService};

/// Skip test if environment variable is not set
#[macro_export]
macro_rules! skip_without_env {
    ($var:expr) => {
        if std::env::var($var).is_err() {
            eprintln!("Skipping test: {} environment variable not set", $var);
            return;
        }
    };
}
