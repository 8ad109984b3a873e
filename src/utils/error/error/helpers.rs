//! Helper functions for creating specific error types

use super::types::ClassifierError;
use std::time::Duration;

/// Helper functions for creating specific errors
impl ClassifierError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn auth<S: Into<String>>(message: S) -> Self {
        Self::Auth(message.into())
    }

    pub fn rate_limit<S: Into<String>>(message: S, retry_after: Option<Duration>) -> Self {
        Self::RateLimit {
            message: message.into(),
            retry_after,
        }
    }

    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::Timeout(message.into())
    }

    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network(message.into())
    }

    pub fn unavailable<S: Into<String>>(message: S) -> Self {
        Self::ProviderUnavailable(message.into())
    }

    pub fn parsing<S: Into<String>>(message: S) -> Self {
        Self::Parsing(message.into())
    }

    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn rejected<S: Into<String>>(message: S) -> Self {
        Self::Rejected(message.into())
    }

    pub fn input_schema<S: Into<String>>(message: S) -> Self {
        Self::InputSchema(message.into())
    }

    pub fn dataset<S: Into<String>>(message: S) -> Self {
        Self::Dataset(message.into())
    }

    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage(message.into())
    }

    pub fn checkpoint<S: Into<String>>(message: S) -> Self {
        Self::Checkpoint(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Wrap a run-fatal error with the last durably completed batch
    pub fn halted(last_completed_batch: Option<usize>, source: ClassifierError) -> Self {
        match source {
            already @ Self::Halted { .. } => already,
            other => Self::Halted {
                last_completed_batch,
                source: Box::new(other),
            },
        }
    }

    /// Map an HTTP status code from the classification service to an error
    pub fn from_status(status: u16, body: &str, retry_after: Option<Duration>) -> Self {
        let message = format!("HTTP {}: {}", status, body);
        match status {
            401 | 403 => Self::Auth(message),
            408 => Self::Timeout(message),
            429 => Self::rate_limit(message, retry_after),
            400..=499 => Self::BadRequest(message),
            500..=599 => Self::ProviderUnavailable(message),
            _ => Self::Internal(message),
        }
    }
}
