//! Classification service configuration

use super::*;
use serde::{Deserialize, Serialize};

/// Chat-completions service used to classify records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// API base URL; `/chat/completions` is appended
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// API key, usually supplied through the environment
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// Model name
    #[serde(default = "default_model")]
    pub model: String,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum output tokens
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Ask the model to reason before answering
    #[serde(default = "default_true")]
    pub enable_thinking: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout(),
            enable_thinking: true,
        }
    }
}

impl ServiceConfig {
    /// Full chat-completions endpoint
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

fn default_base_url() -> String {
    "https://open.bigmodel.cn/api/paas/v4".to_string()
}

fn default_model() -> String {
    "glm-4.5".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    10_000
}
