//! Scripted classification service
//!
//! Each article id gets a queue of replies consumed one per call; the last
//! reply repeats once the queue runs dry. Unscripted ids answer with a
//! generic payload.

use async_trait::async_trait;
use batch_classifier::core::classifier::{ClassificationRequest, ClassificationService};
use batch_classifier::utils::error::{ClassifierError, Result};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// One scripted answer
#[derive(Debug, Clone)]
pub enum Reply {
    /// Raw content returned by the service
    Content(String),
    /// Retryable failure
    Unavailable,
    /// Terminal failure
    BadRequest,
    /// Answer after a delay
    Delayed(Duration, Box<Reply>),
}

impl Reply {
    /// Well-formed payload with the given keywords
    pub fn payload(keywords: &[&str], pattern: &str) -> Self {
        let keywords: Vec<String> = keywords.iter().map(|k| format!("\"{}\"", k)).collect();
        Reply::Content(format!(
            r#"{{"analysis_reason": "scripted", "supporting_keywords": [{}], "context_pattern": "{}", "is_correct_classification": true}}"#,
            keywords.join(", "),
            pattern
        ))
    }
}

#[derive(Debug, Default)]
pub struct ScriptedService {
    script: Mutex<HashMap<String, Vec<Reply>>>,
    calls: Mutex<HashMap<String, usize>>,
    total_calls: AtomicUsize,
}

impl ScriptedService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue replies for `article_id`
    pub fn script(self, article_id: &str, replies: Vec<Reply>) -> Self {
        self.script
            .lock()
            .unwrap()
            .insert(article_id.to_string(), replies);
        self
    }

    pub fn calls_for(&self, article_id: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(article_id)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.total_calls.load(Ordering::SeqCst)
    }

    fn next_reply(&self, article_id: &str) -> Reply {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            let count = calls.entry(article_id.to_string()).or_insert(0);
            *count += 1;
            *count
        };
        self.total_calls.fetch_add(1, Ordering::SeqCst);

        let script = self.script.lock().unwrap();
        match script.get(article_id) {
            Some(replies) if !replies.is_empty() => {
                replies[(call - 1).min(replies.len() - 1)].clone()
            }
            _ => Reply::payload(&[article_id], "scripted pattern"),
        }
    }
}

async fn resolve(reply: Reply) -> Result<String> {
    match reply {
        Reply::Content(content) => Ok(content),
        Reply::Unavailable => Err(ClassifierError::unavailable("scripted outage")),
        Reply::BadRequest => Err(ClassifierError::bad_request("scripted rejection")),
        Reply::Delayed(delay, inner) => {
            tokio::time::sleep(delay).await;
            Box::pin(resolve(*inner)).await
        }
    }
}

#[async_trait]
impl ClassificationService for ScriptedService {
    async fn complete(&self, request: &ClassificationRequest) -> Result<String> {
        let reply = self.next_reply(&request.article_id);
        resolve(reply).await
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
