use std::sync::Arc;

use gekko_fmp::{FinancialData, FmpError};
use gekko_llm::ChatModel;
use tracing::{debug, info, instrument, warn};

use crate::classify::classify_query;
use crate::companies::extract_companies;
use crate::error::AnswerError;
use crate::generic::answer_generic;
use crate::metrics::{identify_metric_target, summarize_financial_metrics};
use crate::settings::PipelineSettings;
use crate::style::rewrite_in_persona;
use crate::summarize::summarize_transcript;
use crate::time::{extract_earnings_call_window, extract_metric_window};
use crate::types::{Answer, Company, Framing, Persona, QueryType};

/// Answers a question end to end.
///
/// Cheap to clone; the model and data source are shared.
#[derive(Clone)]
pub struct Assistant {
    llm: Arc<dyn ChatModel>,
    data: Arc<dyn FinancialData>,
    settings: PipelineSettings,
}

impl Assistant {
    pub fn new(
        llm: Arc<dyn ChatModel>,
        data: Arc<dyn FinancialData>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            llm,
            data,
            settings,
        }
    }

    #[instrument(skip(self, question), fields(model = self.llm.model_name()))]
    pub async fn answer(&self, question: &str, persona: Persona) -> Result<Answer, AnswerError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AnswerError::EmptyQuestion);
        }

        let llm = self.llm.as_ref();
        let query_type = classify_query(llm, question).await?;
        info!(%query_type, "answering question");

        if query_type == QueryType::Other {
            let summary = match persona {
                Persona::Gekko => rewrite_in_persona(llm, question, Framing::Unrelated).await?,
                Persona::Plain => answer_generic(llm, question).await?,
            };
            return Ok(Answer {
                query_type,
                summary,
            });
        }

        let companies = extract_companies(llm, question).await?;
        if companies.is_empty() {
            return Err(AnswerError::NoCompanies);
        }

        let summary = match query_type {
            QueryType::EarningsCall => self.earnings_call(question, &companies).await?,
            _ => self.financial_metric(question, &companies).await?,
        };

        let summary = match persona {
            Persona::Gekko => rewrite_in_persona(llm, &summary, Framing::Restyle).await?,
            Persona::Plain => summary,
        };
        Ok(Answer {
            query_type,
            summary,
        })
    }

    /// The user-facing message for `err`, restyled for the Gekko persona.
    ///
    /// Restyling is best effort; a failed rewrite falls back to the plain
    /// message.
    pub async fn explain(&self, err: &AnswerError, persona: Persona) -> String {
        match persona {
            Persona::Plain => err.user_message().to_owned(),
            Persona::Gekko => {
                match rewrite_in_persona(self.llm.as_ref(), err.persona_prompt(), Framing::Restyle)
                    .await
                {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(error = %e, "could not restyle error message");
                        err.user_message().to_owned()
                    }
                }
            }
        }
    }

    async fn earnings_call(
        &self,
        question: &str,
        companies: &[Company],
    ) -> Result<String, AnswerError> {
        let llm = self.llm.as_ref();
        let today = chrono::Local::now().date_naive();
        let window = extract_earnings_call_window(llm, question, today).await?;

        let mut sections = Vec::with_capacity(companies.len());
        let mut first_call = true;
        for company in companies {
            let fetched = if window.multiple {
                let year = window.year.unwrap_or_else(|| self.settings.effective_year());
                self.data.transcripts(&company.symbol, Some(year)).await
            } else {
                self.data
                    .transcript(&company.symbol, window.year, window.quarter)
                    .await
            };
            let calls = no_data_as_empty(fetched, &company.symbol)?;
            if calls.is_empty() {
                debug!(symbol = %company.symbol, "no earnings calls");
                continue;
            }

            let mut summaries = Vec::with_capacity(calls.len());
            for call in &calls {
                if !first_call && !self.settings.transcript_delay.is_zero() {
                    tokio::time::sleep(self.settings.transcript_delay).await;
                }
                first_call = false;
                let summary =
                    summarize_transcript(llm, &self.settings, call.text(), question, company)
                        .await?;
                summaries.push(summary);
            }
            sections.push(company_section(company, &summaries.join("\n\n")));
        }

        if sections.is_empty() {
            return Err(AnswerError::NoTranscripts);
        }
        Ok(sections.join("\n\n"))
    }

    async fn financial_metric(
        &self,
        question: &str,
        companies: &[Company],
    ) -> Result<String, AnswerError> {
        let llm = self.llm.as_ref();
        let target = identify_metric_target(llm, question)
            .await?
            .ok_or(AnswerError::MetricNotIdentified)?;
        let window = extract_metric_window(
            llm,
            question,
            self.settings.metric_limit,
            self.settings.metric_max_limit,
        )
        .await?;

        let mut sections = Vec::with_capacity(companies.len());
        for company in companies {
            let fetched = self
                .data
                .statement(target.statement, &company.symbol, &window)
                .await;
            let rows = no_data_as_empty(fetched, &company.symbol)?;
            if rows.is_empty() {
                debug!(symbol = %company.symbol, statement = %target.statement, "no statement rows");
                continue;
            }
            let summary = summarize_financial_metrics(
                llm,
                question,
                company,
                &target,
                &rows,
                self.settings.chunk_size,
            )
            .await?;
            sections.push(company_section(company, summary.trim()));
        }

        if sections.is_empty() {
            return Err(AnswerError::NoFinancialData);
        }
        Ok(sections.join("\n\n"))
    }
}

fn company_section(company: &Company, body: &str) -> String {
    format!("**{}**: {}", company.name, body)
}

/// A 404 from the data source means "nothing for this symbol", not failure.
fn no_data_as_empty<T>(result: Result<Vec<T>, FmpError>, symbol: &str) -> Result<Vec<T>, FmpError> {
    match result {
        Err(e) if e.is_no_data() => {
            debug!(%symbol, error = %e, "no data for symbol");
            Ok(Vec::new())
        }
        other => other,
    }
}
