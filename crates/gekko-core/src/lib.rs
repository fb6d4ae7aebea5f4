//! Question answering over earnings calls and financial statements.
//!
//! [`Assistant::answer`] classifies a question, resolves the companies it
//! mentions, fetches transcripts or statement rows through
//! [`FinancialData`](gekko_fmp::FinancialData), and summarizes them with a
//! [`ChatModel`](gekko_llm::ChatModel). Each stage is also exposed on its own.

pub mod chunking;
pub mod classify;
pub mod companies;
pub mod error;
pub mod generic;
mod json;
pub mod metrics;
pub mod pipeline;
pub mod prompts;
pub mod settings;
pub mod style;
pub mod summarize;
pub mod time;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use chunking::{ChunkStrategy, split_fixed, split_sentences};
pub use error::AnswerError;
pub use pipeline::Assistant;
pub use settings::PipelineSettings;
pub use types::{
    Answer, Company, EarningsCallWindow, Framing, MetricTarget, MetricWindow, Period, Persona,
    Quarter, QueryType, Statement,
};
