//! Record classification
//!
//! - `prompt`: request text for a record
//! - `decode`: strict then embedded JSON decoding of answers
//! - `service`: the service seam and the retrying [`RecordClassifier`]
//! - `chat`: OpenAI-compatible HTTP implementation of the service

pub mod chat;
pub mod decode;
pub mod prompt;
pub mod service;

pub use chat::ChatCompletionClient;
pub use decode::decode_payload;
pub use prompt::build_prompt;
pub use service::{ClassificationRequest, ClassificationService, RecordClassifier};
