//! Configuration management for classification runs
//!
//! Settings are layered: defaults, then an optional YAML file, then
//! environment variables, then command-line overrides applied by the binary.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::utils::error::{ClassifierError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable holding the service API key
pub const ENV_API_KEY: &str = "CLASSIFIER_API_KEY";
/// Environment variable overriding the service base URL
pub const ENV_BASE_URL: &str = "CLASSIFIER_BASE_URL";
/// Environment variable overriding the model name
pub const ENV_MODEL: &str = "CLASSIFIER_MODEL";

/// Main configuration struct for a classification run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Input dataset (Parquet, CSV or JSON Lines)
    #[serde(default)]
    pub input: Option<PathBuf>,
    /// Classification service
    #[serde(default)]
    pub service: ServiceConfig,
    /// Batching and retry
    #[serde(default)]
    pub batch: BatchConfig,
    /// Artifact and report locations
    #[serde(default)]
    pub output: OutputConfig,
    /// Prompt and report options
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Batch to start from when no checkpoint exists
    #[serde(default)]
    pub start_batch: usize,
}

impl Config {
    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ClassifierError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| ClassifierError::Config(format!("Failed to parse config: {}", e)))?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Apply overrides using `lookup` to read variables
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty(ENV_API_KEY) {
            self.service.api_key = Some(key);
        }
        if let Some(url) = non_empty(ENV_BASE_URL) {
            debug!("Service base URL overridden from environment");
            self.service.base_url = url;
        }
        if let Some(model) = non_empty(ENV_MODEL) {
            debug!("Model overridden from environment");
            self.service.model = model;
        }
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.service
            .validate()
            .map_err(|e| ClassifierError::Config(format!("Service config error: {}", e)))?;
        self.batch
            .validate()
            .map_err(|e| ClassifierError::Config(format!("Batch config error: {}", e)))?;
        self.output
            .validate()
            .map_err(|e| ClassifierError::Config(format!("Output config error: {}", e)))?;
        self.analysis
            .validate()
            .map_err(|e| ClassifierError::Config(format!("Analysis config error: {}", e)))?;
        self.logging
            .validate()
            .map_err(|e| ClassifierError::Config(format!("Logging config error: {}", e)))?;

        debug!("Configuration validation completed");
        Ok(())
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            ClassifierError::Config(format!("Failed to serialize config to YAML: {}", e))
        })
    }
}
