//! Scripted fakes of [`ChatModel`] and [`FinancialData`].
//!
//! Available to this crate's tests and, behind the `testing` feature, to
//! downstream crates.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use gekko_fmp::{FinancialData, FmpError, MetricWindow, Quarter, Statement, Transcript};
use gekko_llm::{ChatModel, CompletionRequest, LlmError};
use serde_json::Value;

type Responder = Arc<dyn Fn(&CompletionRequest) -> Result<String, LlmError> + Send + Sync>;

/// A [`ChatModel`] that answers by system prompt.
///
/// Each pipeline stage uses a distinct constant from [`crate::prompts`], so
/// keying on it selects the stage. Unscripted prompts fail with
/// [`LlmError::EmptyResponse`].
#[derive(Clone, Default)]
pub struct ScriptedModel {
    responders: Arc<Mutex<HashMap<String, Responder>>>,
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always reply `reply` to requests with `system` as system prompt.
    pub fn on(self, system: &str, reply: impl Into<String>) -> Self {
        let reply = reply.into();
        self.on_with(system, move |_| Ok(reply.clone()))
    }

    /// Compute the reply from the request.
    pub fn on_with<F>(self, system: &str, f: F) -> Self
    where
        F: Fn(&CompletionRequest) -> Result<String, LlmError> + Send + Sync + 'static,
    {
        self.responders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(system.to_owned(), Arc::new(f));
        self
    }

    /// Fail every request with `system` as system prompt.
    pub fn fail_on(self, system: &str) -> Self {
        self.on_with(system, |_| {
            Err(LlmError::Provider {
                status: 500,
                message: "scripted failure".into(),
            })
        })
    }

    /// Every request seen so far, in order.
    pub fn calls(&self) -> Vec<CompletionRequest> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Requests seen so far with `system` as system prompt.
    pub fn calls_to(&self, system: &str) -> Vec<CompletionRequest> {
        self.calls()
            .into_iter()
            .filter(|r| r.system_text() == Some(system))
            .collect()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());
        let responder = self
            .responders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(request.system_text().unwrap_or_default())
            .cloned();
        match responder {
            Some(f) => f(&request),
            None => Err(LlmError::EmptyResponse),
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// In-memory [`FinancialData`] keyed by symbol.
///
/// Symbols without data answer [`FmpError::NotFound`]; symbols registered
/// with [`StubData::fail`] answer a 500 status error.
#[derive(Clone, Default)]
pub struct StubData {
    transcripts: HashMap<String, Vec<Transcript>>,
    statements: HashMap<(Statement, String), Vec<Value>>,
    failing: Vec<String>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transcript(mut self, symbol: &str, year: i32, quarter: Quarter, text: &str) -> Self {
        self.transcripts
            .entry(symbol.to_owned())
            .or_default()
            .push(Transcript {
                symbol: Some(symbol.to_owned()),
                quarter: Some(quarter),
                year: Some(year),
                date: None,
                content: Some(text.to_owned()),
            });
        self
    }

    pub fn with_statement(mut self, statement: Statement, symbol: &str, rows: Vec<Value>) -> Self {
        self.statements.insert((statement, symbol.to_owned()), rows);
        self
    }

    pub fn fail(mut self, symbol: &str) -> Self {
        self.failing.push(symbol.to_owned());
        self
    }

    /// One `kind:symbol[:detail]` line per call received.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, line: String) {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line);
    }

    fn check(&self, symbol: &str) -> Result<(), FmpError> {
        if self.failing.iter().any(|s| s == symbol) {
            return Err(FmpError::Status {
                status: 500,
                message: "stub failure".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl FinancialData for StubData {
    async fn transcript(
        &self,
        symbol: &str,
        year: Option<i32>,
        quarter: Option<Quarter>,
    ) -> Result<Vec<Transcript>, FmpError> {
        self.record(format!("transcript:{symbol}:{year:?}:{quarter:?}"));
        self.check(symbol)?;
        let calls = self
            .transcripts
            .get(symbol)
            .ok_or_else(|| FmpError::NotFound(symbol.to_owned()))?;
        let matching = calls
            .iter()
            .filter(|t| year.is_none() || t.year == year)
            .filter(|t| quarter.is_none() || t.quarter == quarter)
            .take(1)
            .cloned()
            .collect();
        Ok(matching)
    }

    async fn transcripts(
        &self,
        symbol: &str,
        year: Option<i32>,
    ) -> Result<Vec<Transcript>, FmpError> {
        self.record(format!("transcripts:{symbol}:{year:?}"));
        self.check(symbol)?;
        let calls = self
            .transcripts
            .get(symbol)
            .ok_or_else(|| FmpError::NotFound(symbol.to_owned()))?;
        Ok(calls
            .iter()
            .filter(|t| year.is_none() || t.year == year)
            .cloned()
            .collect())
    }

    async fn statement(
        &self,
        statement: Statement,
        symbol: &str,
        window: &MetricWindow,
    ) -> Result<Vec<Value>, FmpError> {
        self.record(format!(
            "statement:{symbol}:{statement}:{}:{:?}",
            window.period, window.limit
        ));
        self.check(symbol)?;
        let rows = self
            .statements
            .get(&(statement, symbol.to_owned()))
            .ok_or_else(|| FmpError::NotFound(symbol.to_owned()))?;
        let limit = window.limit.map_or(rows.len(), |n| n as usize);
        Ok(rows.iter().take(limit).cloned().collect())
    }
}
