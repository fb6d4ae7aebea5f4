use gekko_llm::{ChatModel, CompletionRequest};
use tracing::debug;

use crate::error::AnswerError;
use crate::prompts;
use crate::types::QueryType;

/// Ask the model which [`QueryType`] `question` belongs to.
pub async fn classify_query(llm: &dyn ChatModel, question: &str) -> Result<QueryType, AnswerError> {
    let request = CompletionRequest::instruct(prompts::CLASSIFY_QUERY, prompts::user_prompt(question));
    let reply = llm.complete(request).await?;
    let query_type = parse_query_type(&reply)?;
    debug!(%query_type, "classified question");
    Ok(query_type)
}

/// Exact match of the trimmed reply against the three labels.
pub fn parse_query_type(reply: &str) -> Result<QueryType, AnswerError> {
    let label = reply.trim();
    label
        .parse()
        .map_err(|_| AnswerError::Classification(label.to_owned()))
}
