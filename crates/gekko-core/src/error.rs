use gekko_fmp::FmpError;
use gekko_llm::LlmError;
use thiserror::Error;

/// Every way a question can fail to produce an answer.
#[derive(Debug, Error)]
pub enum AnswerError {
    #[error("question is empty")]
    EmptyQuestion,

    #[error("no companies could be resolved from the question")]
    NoCompanies,

    #[error("no financial metric could be identified")]
    MetricNotIdentified,

    #[error("no earnings call transcripts were found")]
    NoTranscripts,

    #[error("no financial data was found")]
    NoFinancialData,

    /// The classifier answered with something outside the allow-list.
    #[error("unexpected classification result: {0:?}")]
    Classification(String),

    #[error("language model error: {0}")]
    Llm(#[from] LlmError),

    #[error("financial data error: {0}")]
    Data(#[from] FmpError),
}

impl AnswerError {
    /// Stable identifier for logs and clients.
    pub fn kind(&self) -> &'static str {
        match self {
            AnswerError::EmptyQuestion => "empty_question",
            AnswerError::NoCompanies => "no_companies",
            AnswerError::MetricNotIdentified => "metric_not_identified",
            AnswerError::NoTranscripts => "no_transcripts",
            AnswerError::NoFinancialData => "no_financial_data",
            AnswerError::Classification(_) => "classification",
            AnswerError::Llm(_) => "llm",
            AnswerError::Data(_) => "data",
        }
    }

    /// Natural-language message shown to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            AnswerError::EmptyQuestion => "You need to ask me a question",
            AnswerError::NoCompanies => "No companies were found matching those names",
            AnswerError::MetricNotIdentified => {
                "I couldn't find the financial metric you were looking for. Try being more specific."
            }
            AnswerError::NoTranscripts => {
                "The earnings call had no meaningful data related to your query"
            }
            AnswerError::NoFinancialData => {
                "I couldn't find the financial data you were looking for. Try refining your question."
            }
            AnswerError::Classification(_) => {
                "I couldn't work out what kind of question that is. Please rephrase it."
            }
            AnswerError::Llm(_) => {
                "The language model is unavailable right now. Please try again shortly."
            }
            AnswerError::Data(_) => {
                "The financial data provider is unavailable right now. Please try again shortly."
            }
        }
    }

    /// Text handed to the persona rewriter instead of [`Self::user_message`].
    pub fn persona_prompt(&self) -> &'static str {
        match self {
            AnswerError::NoCompanies => {
                "I don't know about any company with that name. Give me a real company, and we'll make some money."
            }
            other => other.user_message(),
        }
    }
}
