//! Chat-completion client used by the gekko pipeline.
//!
//! [`ChatModel`] is the seam every pipeline stage talks to.  The default
//! implementation is [`OpenAiChat`], which speaks the OpenAI-compatible
//! `/chat/completions` REST API; tests substitute scripted fakes.

pub mod error;
pub mod openai;
pub mod types;

pub use error::LlmError;
pub use openai::{OpenAiChat, OpenAiConfig};
pub use types::{CompletionRequest, Message, Role};

use async_trait::async_trait;

/// A language model that turns a list of messages into a single reply.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Run one completion and return the assistant text.
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError>;

    /// Model identifier, used for logging.
    fn model_name(&self) -> &str {
        "unknown"
    }
}
