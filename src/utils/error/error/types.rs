//! Error types for the classifier

use std::time::Duration;
use thiserror::Error;

/// Result type alias for the classifier
pub type Result<T> = std::result::Result<T, ClassifierError>;

/// Main error type for the classifier
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication errors reported by the classification service
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Rate limiting errors
    #[error("Rate limit exceeded: {message}")]
    RateLimit {
        message: String,
        /// Server-provided hint for how long to wait
        retry_after: Option<Duration>,
    },

    /// Timeout errors
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Network errors
    #[error("Network error: {0}")]
    Network(String),

    /// Service unavailable errors
    #[error("Service unavailable: {0}")]
    ProviderUnavailable(String),

    /// The service answered but the payload could not be decoded
    #[error("Parsing error: {0}")]
    Parsing(String),

    /// Bad request errors
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Explicit rejection that must not be retried
    #[error("Rejected by service: {0}")]
    Rejected(String),

    /// Input dataset does not have the expected shape
    #[error("Input schema error: {0}")]
    InputSchema(String),

    /// Dataset reader errors
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Artifact storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Checkpoint would move backwards or disagrees with the run
    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// A run-fatal error, annotated with the last durably completed batch
    #[error("{}", halted_message(.last_completed_batch, .source))]
    Halted {
        last_completed_batch: Option<usize>,
        #[source]
        source: Box<ClassifierError>,
    },
}

fn halted_message(last_completed_batch: &Option<usize>, source: &ClassifierError) -> String {
    match last_completed_batch {
        Some(batch) => format!(
            "Run halted: {} (last completed batch: {}, resume from batch {})",
            source,
            batch,
            batch + 1
        ),
        None => format!("Run halted: {} (no batch completed yet)", source),
    }
}

impl ClassifierError {
    /// Whether reattempting the same call could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            ClassifierError::RateLimit { .. }
            | ClassifierError::Timeout(_)
            | ClassifierError::Network(_)
            | ClassifierError::ProviderUnavailable(_)
            | ClassifierError::Parsing(_) => true,
            ClassifierError::HttpClient(e) => {
                e.is_timeout() || e.is_connect() || e.is_request() || e.is_body()
            }
            _ => false,
        }
    }

    /// Server-provided wait hint, if any
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            ClassifierError::RateLimit { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Short machine-readable tag stored alongside failed items
    pub fn kind(&self) -> &'static str {
        match self {
            ClassifierError::Config(_) => "config",
            ClassifierError::HttpClient(_) => "http_client",
            ClassifierError::Serialization(_) => "serialization",
            ClassifierError::Yaml(_) => "yaml",
            ClassifierError::Io(_) => "io",
            ClassifierError::Auth(_) => "auth",
            ClassifierError::RateLimit { .. } => "rate_limit",
            ClassifierError::Timeout(_) => "timeout",
            ClassifierError::Network(_) => "network",
            ClassifierError::ProviderUnavailable(_) => "provider_unavailable",
            ClassifierError::Parsing(_) => "parsing",
            ClassifierError::BadRequest(_) => "bad_request",
            ClassifierError::Rejected(_) => "rejected",
            ClassifierError::InputSchema(_) => "input_schema",
            ClassifierError::Dataset(_) => "dataset",
            ClassifierError::Storage(_) => "storage",
            ClassifierError::Checkpoint(_) => "checkpoint",
            ClassifierError::Internal(_) => "internal",
            ClassifierError::Halted { .. } => "halted",
        }
    }
}
