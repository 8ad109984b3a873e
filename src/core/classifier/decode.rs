//! Two-stage decoding of service answers
//!
//! Strict JSON first; if that fails, the payload embedded in surrounding text
//! is extracted (a fenced ```json block, else the first `{` through the last
//! `}`) and decoded once more. A failure of both is a retryable parse error.

use crate::core::types::ClassificationPayload;
use crate::utils::error::{ClassifierError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static FENCED_JSON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(?:json|JSON)?\s*\n?(.*?)```").unwrap_or_else(|e| {
        tracing::error!("Failed to compile fenced JSON regex: {}", e);
        Regex::new(r"[^\s\S]").unwrap()
    })
});

/// Locate a JSON object embedded in free text
pub fn extract_embedded(content: &str) -> Option<&str> {
    let fenced = FENCED_JSON
        .captures_iter(content)
        .filter_map(|c| c.get(1))
        .map(|block| block.as_str().trim())
        .find(|inner| inner.starts_with('{'));
    if fenced.is_some() {
        return fenced;
    }

    let start = content.find('{')?;
    let end = content.rfind('}')?;
    (end > start).then(|| &content[start..=end])
}

/// Decode a service answer into a classification payload
pub fn decode_payload(content: &str) -> Result<ClassificationPayload> {
    let strict_err = match serde_json::from_str::<ClassificationPayload>(content.trim()) {
        Ok(payload) => return Ok(payload),
        Err(e) => e,
    };

    let embedded = extract_embedded(content).ok_or_else(|| {
        ClassifierError::parsing(format!("no JSON object in response: {}", strict_err))
    })?;

    serde_json::from_str::<ClassificationPayload>(embedded).map_err(|e| {
        ClassifierError::parsing(format!("embedded JSON did not decode: {}", e))
    })
}
