//! OpenAI-compatible chat-completions client

use super::service::{ClassificationRequest, ClassificationService};
use crate::config::ServiceConfig;
use crate::utils::error::{ClassifierError, Result};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, RETRY_AFTER};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThinkingOption {
    #[serde(rename = "type")]
    pub kind: String,
}

/// Request body sent to `/chat/completions`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletionBody {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub stream: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking: Option<ThinkingOption>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

/// Classification service backed by a chat-completions endpoint
#[derive(Debug, Clone)]
pub struct ChatCompletionClient {
    http_client: reqwest::Client,
    config: ServiceConfig,
    endpoint: String,
}

impl ChatCompletionClient {
    pub fn new(config: ServiceConfig) -> Result<Self> {
        if config.api_key.as_deref().is_none_or(|k| k.trim().is_empty()) {
            return Err(ClassifierError::config(
                "service API key is not set (CLASSIFIER_API_KEY or --api-key)",
            ));
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let endpoint = config.endpoint();

        Ok(Self {
            http_client,
            config,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Request body for `prompt`
    pub fn body(&self, prompt: &str) -> ChatCompletionBody {
        ChatCompletionBody {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: Some(prompt.to_string()),
            }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            stream: false,
            thinking: self.config.enable_thinking.then(|| ThinkingOption {
                kind: "enabled".to_string(),
            }),
        }
    }
}

/// Seconds from a `Retry-After` header, when given as an integer
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Transport failures are transient; only client-side misuse stays terminal
fn map_send_error(error: reqwest::Error) -> ClassifierError {
    if error.is_timeout() {
        ClassifierError::timeout(error.to_string())
    } else if error.is_connect() || error.is_request() || error.is_body() {
        ClassifierError::network(error.to_string())
    } else {
        ClassifierError::HttpClient(error)
    }
}

#[async_trait]
impl ClassificationService for ChatCompletionClient {
    async fn complete(&self, request: &ClassificationRequest) -> Result<String> {
        let body = self.body(&request.prompt);
        let api_key = self.config.api_key.as_deref().unwrap_or_default();

        debug!(
            endpoint = %self.endpoint,
            model = %self.config.model,
            article_id = %request.article_id,
            "Calling chat completions"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("Bearer {}", api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let hint = retry_after(response.headers());
            let error_text = response.text().await.unwrap_or_default();
            return Err(ClassifierError::from_status(status.as_u16(), &error_text, hint));
        }

        let text = response.text().await.map_err(map_send_error)?;
        let parsed: ChatCompletionResponse = serde_json::from_str(&text)
            .map_err(|e| ClassifierError::parsing(format!("invalid chat completion envelope: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| ClassifierError::parsing("chat completion has no message content"))
    }

    fn name(&self) -> &str {
        &self.config.model
    }
}
