use gekko_llm::{ChatModel, CompletionRequest, LlmError};

use crate::prompts;
use crate::types::Framing;

/// Run `text` through the Gordon Gekko persona.
pub async fn rewrite_in_persona(
    llm: &dyn ChatModel,
    text: &str,
    framing: Framing,
) -> Result<String, LlmError> {
    let (system, user) = match framing {
        Framing::Restyle => (prompts::GEKKO_RESTYLE, format!("Original text: {text}")),
        Framing::Unrelated => (prompts::GEKKO_UNRELATED, prompts::user_prompt(text)),
    };
    let request = CompletionRequest::instruct(system, user).with_temperature(0.8);
    llm.complete(request).await
}
