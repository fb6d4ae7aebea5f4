use gekko_llm::{ChatModel, CompletionRequest, LlmError};

use crate::prompts;

/// Plain answer for questions outside the two data paths.
pub async fn answer_generic(llm: &dyn ChatModel, question: &str) -> Result<String, LlmError> {
    let request = CompletionRequest::instruct(prompts::GENERIC_ANSWER, question).with_temperature(0.7);
    llm.complete(request).await
}
