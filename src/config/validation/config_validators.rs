//! Configuration validators
//!
//! One `Validate` implementation per configuration section.

use super::trait_def::Validate;
use crate::config::models::*;
use tracing::debug;
use url::Url;

impl Validate for ServiceConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating service configuration");

        let url = Url::parse(&self.base_url)
            .map_err(|e| format!("Service base_url is not a valid URL: {}", e))?;
        match url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(format!(
                    "Service base_url must use http:// or https:// scheme, got: {}",
                    scheme
                ));
            }
        }

        if self.model.trim().is_empty() {
            return Err("Service model cannot be empty".to_string());
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!(
                "Service temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            ));
        }

        if self.max_tokens == 0 {
            return Err("Service max_tokens must be greater than 0".to_string());
        }

        if self.timeout_secs == 0 {
            return Err("Service timeout_secs must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for BatchConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating batch configuration");

        if self.batch_size == 0 {
            return Err("Batch size must be greater than 0".to_string());
        }

        if self.concurrency == 0 {
            return Err("Concurrency must be greater than 0".to_string());
        }

        if self.max_retries == 0 {
            return Err("max_retries must allow at least one attempt".to_string());
        }

        if self.max_delay_ms < self.base_delay_ms {
            return Err(format!(
                "max_delay_ms ({}) must not be below base_delay_ms ({})",
                self.max_delay_ms, self.base_delay_ms
            ));
        }

        Ok(())
    }
}

impl Validate for OutputConfig {
    fn validate(&self) -> Result<(), String> {
        if self.output_dir.as_os_str().is_empty() {
            return Err("Output directory cannot be empty".to_string());
        }

        if self.report_path.as_os_str().is_empty() {
            return Err("Report path cannot be empty".to_string());
        }

        if self.report_path.is_dir() {
            return Err(format!(
                "Report path {} is a directory",
                self.report_path.display()
            ));
        }

        Ok(())
    }
}

impl Validate for AnalysisConfig {
    fn validate(&self) -> Result<(), String> {
        if self.top_keywords == 0 {
            return Err("top_keywords must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Validate for LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.level.trim().is_empty() {
            return Err("Logging level cannot be empty".to_string());
        }
        Ok(())
    }
}
