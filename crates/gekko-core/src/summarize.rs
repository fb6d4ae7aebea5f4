//! Map-reduce summarization of a single earnings-call transcript.

use gekko_llm::{ChatModel, CompletionRequest};
use tracing::{debug, instrument};

use crate::error::AnswerError;
use crate::prompts::{self, NO_RELEVANT_SENTINEL, NO_RELEVANT_TRANSCRIPT};
use crate::settings::PipelineSettings;
use crate::types::Company;

/// Summarize `transcript` with respect to `question`.
///
/// Chunks are summarized one at a time with `settings.chunk_delay` between
/// calls. Chunk summaries containing the "no relevant information" marker
/// are dropped; if none survive the fixed [`NO_RELEVANT_TRANSCRIPT`] text is
/// returned. With `condense_summaries` and more than one survivor, a second
/// pass merges them.
#[instrument(skip_all, fields(symbol = %company.symbol, chars = transcript.len()))]
pub async fn summarize_transcript(
    llm: &dyn ChatModel,
    settings: &PipelineSettings,
    transcript: &str,
    question: &str,
    company: &Company,
) -> Result<String, AnswerError> {
    let chunks = settings
        .chunk_strategy
        .split(transcript, settings.chunk_size);
    let total = chunks.len();

    let mut kept = Vec::with_capacity(total);
    for (i, chunk) in chunks.iter().enumerate() {
        if i > 0 && !settings.chunk_delay.is_zero() {
            tokio::time::sleep(settings.chunk_delay).await;
        }
        let user = format!(
            "Company: {} ({})\nTranscript part {} of {}:\n{}\n\n{}",
            company.name,
            company.symbol,
            i + 1,
            total,
            chunk,
            prompts::user_prompt(question)
        );
        let request =
            CompletionRequest::instruct(prompts::SUMMARIZE_TRANSCRIPT, user).with_temperature(0.7);
        let summary = llm.complete(request).await?;
        if is_irrelevant(&summary) {
            debug!(chunk = i + 1, "chunk had nothing relevant");
            continue;
        }
        kept.push(summary.trim().to_owned());
    }

    debug!(total, kept = kept.len(), "chunk summaries");
    match kept.len() {
        0 => Ok(NO_RELEVANT_TRANSCRIPT.to_owned()),
        1 => Ok(kept.remove(0)),
        _ if settings.condense_summaries => {
            let user = format!(
                "Company: {} ({})\nPartial summaries of one earnings call:\n{}\n\n{}",
                company.name,
                company.symbol,
                kept.join("\n"),
                prompts::user_prompt(question)
            );
            let request = CompletionRequest::instruct(prompts::SUMMARIZE_TRANSCRIPT, user)
                .with_temperature(0.7);
            Ok(llm.complete(request).await?.trim().to_owned())
        }
        _ => Ok(kept.join("\n")),
    }
}

fn is_irrelevant(summary: &str) -> bool {
    summary
        .to_lowercase()
        .contains(&NO_RELEVANT_SENTINEL.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_match_is_case_insensitive() {
        assert!(is_irrelevant("No relevant information found."));
        assert!(is_irrelevant("Sorry: NO RELEVANT INFORMATION FOUND"));
        assert!(!is_irrelevant("Revenue grew 12%."));
    }
}
