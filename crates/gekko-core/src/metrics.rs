use gekko_llm::{ChatModel, CompletionRequest, LlmError};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::json::parse_lenient;
use crate::prompts;
use crate::types::{Company, MetricTarget, Statement};

#[derive(Deserialize)]
struct RawTarget {
    #[serde(default)]
    metric: Option<String>,
    #[serde(default)]
    endpoint: Option<String>,
}

/// Ask the model which metric the question wants and where to find it.
///
/// `Ok(None)` means the model found no usable metric.
pub async fn identify_metric_target(
    llm: &dyn ChatModel,
    question: &str,
) -> Result<Option<MetricTarget>, LlmError> {
    let user = format!(
        "Available endpoints:\n{}\n\n{}",
        Statement::catalog(),
        prompts::user_prompt(question)
    );
    let reply = llm
        .complete(CompletionRequest::instruct(prompts::METRIC_TARGET, user))
        .await?;
    let target = parse_metric_target(&reply);
    match &target {
        Some(t) => debug!(metric = %t.metric, statement = %t.statement, "identified metric"),
        None => debug!("no metric identified"),
    }
    Ok(target)
}

pub fn parse_metric_target(reply: &str) -> Option<MetricTarget> {
    let raw = match parse_lenient::<RawTarget>(reply) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "metric target reply is not JSON");
            return None;
        }
    };
    let metric = raw.metric?.trim().to_owned();
    if metric.is_empty() || metric.eq_ignore_ascii_case("unknown") {
        return None;
    }
    let statement = raw.endpoint?.trim().parse::<Statement>().ok()?;
    Some(MetricTarget { metric, statement })
}

/// Summarize fetched statement rows for one company.
///
/// The serialized rows are cut to `max_chars` characters.
pub async fn summarize_financial_metrics(
    llm: &dyn ChatModel,
    question: &str,
    company: &Company,
    target: &MetricTarget,
    rows: &[Value],
    max_chars: usize,
) -> Result<String, LlmError> {
    let serialized = Value::Array(rows.to_vec()).to_string();
    let data = truncate_chars(&serialized, max_chars);
    let user = format!(
        "Company: {} ({})\nMetric: {}\nData from {}:\n{}\n\n{}",
        company.name,
        company.symbol,
        target.metric,
        target.statement,
        data,
        prompts::user_prompt(question)
    );
    let request =
        CompletionRequest::instruct(prompts::SUMMARIZE_METRICS, user).with_temperature(0.3);
    llm.complete(request).await
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_metric_and_endpoint() {
        let target = parse_metric_target(r#"{"metric":"revenue","endpoint":"income_statement"}"#);
        assert_eq!(
            target,
            Some(MetricTarget {
                metric: "revenue".into(),
                statement: Statement::IncomeStatement
            })
        );

        let target = parse_metric_target(r#"{"metric":"free cash flow","endpoint":"cash_flow"}"#);
        assert_eq!(target.map(|t| t.statement), Some(Statement::CashFlowStatement));
    }

    #[test]
    fn missing_or_unknown_is_none() {
        assert_eq!(parse_metric_target(r#"{"metric":null,"endpoint":null}"#), None);
        assert_eq!(parse_metric_target(r#"{"metric":"revenue","endpoint":"stock_price"}"#), None);
        assert_eq!(parse_metric_target(r#"{"metric":" ","endpoint":"ratios"}"#), None);
        assert_eq!(parse_metric_target(r#"{"metric":"Unknown","endpoint":"ratios"}"#), None);
        assert_eq!(parse_metric_target("revenue"), None);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("ééé", 2), "éé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[tokio::test]
    async fn serialized_rows_are_cut_to_max_chars() {
        use crate::testing::ScriptedModel;

        let llm = ScriptedModel::new().on(prompts::SUMMARIZE_METRICS, "Revenue was flat.");
        let company = Company {
            name: "Apple".into(),
            symbol: "AAPL".into(),
        };
        let target = MetricTarget {
            metric: "revenue".into(),
            statement: Statement::IncomeStatement,
        };
        let rows = [serde_json::json!({"revenue": 123456789})];

        let summary =
            summarize_financial_metrics(&llm, "Apple revenue?", &company, &target, &rows, 13)
                .await
                .unwrap();
        assert_eq!(summary, "Revenue was flat.");

        let calls = llm.calls_to(prompts::SUMMARIZE_METRICS);
        let user = calls[0].user_text().unwrap();
        assert!(user.contains("Company: Apple (AAPL)"));
        assert!(user.contains(r#"[{"revenue":1"#) && !user.contains("123456789"), "{user}");
    }
}
