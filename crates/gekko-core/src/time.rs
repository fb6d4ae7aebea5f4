//! Time-window extraction for both data paths.
//!
//! Model replies are parsed field by field: a field with an unexpected shape
//! falls back to its default instead of failing the whole window.

use chrono::NaiveDate;
use gekko_llm::{ChatModel, CompletionRequest, LlmError};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::json::parse_lenient;
use crate::prompts;
use crate::types::{EarningsCallWindow, MetricWindow, Period, Quarter};

pub async fn extract_earnings_call_window(
    llm: &dyn ChatModel,
    question: &str,
    today: NaiveDate,
) -> Result<EarningsCallWindow, LlmError> {
    let user = format!(
        "Today's date is {}.\n{}",
        today.format("%Y-%m-%d"),
        prompts::user_prompt(question)
    );
    let reply = llm
        .complete(CompletionRequest::instruct(prompts::EARNINGS_CALL_WINDOW, user))
        .await?;
    let window = parse_earnings_window(&reply);
    debug!(
        year = ?window.year,
        quarter = ?window.quarter,
        multiple = window.multiple,
        "earnings call window"
    );
    Ok(window)
}

/// `{year, quarter, multiple}`; anything unparseable gives the empty window.
pub fn parse_earnings_window(reply: &str) -> EarningsCallWindow {
    let Some(fields) = object(reply) else {
        return EarningsCallWindow::default();
    };
    EarningsCallWindow {
        year: fields.get("year").and_then(as_year),
        quarter: fields
            .get("quarter")
            .filter(|v| !v.is_null())
            .and_then(|v| serde_json::from_value::<Quarter>(v.clone()).ok()),
        multiple: fields.get("multiple").is_some_and(as_flag),
    }
}

pub async fn extract_metric_window(
    llm: &dyn ChatModel,
    question: &str,
    default_limit: u32,
    max_limit: u32,
) -> Result<MetricWindow, LlmError> {
    let reply = llm
        .complete(CompletionRequest::instruct(
            prompts::METRIC_WINDOW,
            prompts::user_prompt(question),
        ))
        .await?;
    let window = parse_metric_window(&reply, default_limit, max_limit);
    debug!(period = %window.period, limit = ?window.limit, "metric window");
    Ok(window)
}

/// `{period, limit}` with `limit` clamped to `1..=max_limit`.
pub fn parse_metric_window(reply: &str, default_limit: u32, max_limit: u32) -> MetricWindow {
    let max_limit = max_limit.max(1);
    let clamp = |n: u64| n.clamp(1, u64::from(max_limit)) as u32;
    let fallback = MetricWindow {
        period: Period::Annual,
        limit: Some(clamp(u64::from(default_limit))),
    };
    let Some(fields) = object(reply) else {
        return fallback;
    };

    let period = fields
        .get("period")
        .and_then(Value::as_str)
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(Period::Annual);
    let limit = fields
        .get("limit")
        .and_then(|v| match v {
            Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(|f| f.max(0.0) as u64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .map(clamp)
        .or(fallback.limit);

    MetricWindow { period, limit }
}

fn object(reply: &str) -> Option<Map<String, Value>> {
    match parse_lenient::<Value>(reply) {
        Ok(Value::Object(fields)) => Some(fields),
        Ok(_) => {
            warn!("time window reply is not an object");
            None
        }
        Err(e) => {
            warn!(error = %e, "time window reply is not JSON");
            None
        }
    }
}

fn as_year(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn earnings_window_full() {
        let window = parse_earnings_window(r#"{ "year": 2023, "quarter": "Q1", "multiple": false }"#);
        assert_eq!(
            window,
            EarningsCallWindow {
                year: Some(2023),
                quarter: Some(Quarter::Q1),
                multiple: false
            }
        );
    }

    #[test]
    fn earnings_window_tolerates_loose_types() {
        let window = parse_earnings_window(r#"{ "year": "2022", "quarter": 4, "multiple": "true" }"#);
        assert_eq!(window.year, Some(2022));
        assert_eq!(window.quarter, Some(Quarter::Q4));
        assert!(window.multiple);

        let window = parse_earnings_window(r#"{ "year": null, "quarter": "Q7" }"#);
        assert_eq!(window, EarningsCallWindow::default());
    }

    #[test]
    fn earnings_window_falls_back_on_garbage() {
        assert_eq!(parse_earnings_window("last quarter"), EarningsCallWindow::default());
        assert_eq!(parse_earnings_window("[2023]"), EarningsCallWindow::default());
    }

    #[test]
    fn metric_window_parses_and_clamps() {
        let window = parse_metric_window(r#"{"period":"Quarter","limit":3}"#, 5, 20);
        assert_eq!(window, MetricWindow { period: Period::Quarter, limit: Some(3) });

        let window = parse_metric_window(r#"{"period":"annual","limit":500}"#, 5, 20);
        assert_eq!(window.limit, Some(20));

        let window = parse_metric_window(r#"{"period":"annual","limit":0}"#, 5, 20);
        assert_eq!(window.limit, Some(1));
    }

    #[test]
    fn metric_window_defaults() {
        let window = parse_metric_window("no json here", 5, 20);
        assert_eq!(window, MetricWindow { period: Period::Annual, limit: Some(5) });

        let window = parse_metric_window(r#"{"period":"weekly","limit":null}"#, 8, 6);
        assert_eq!(window, MetricWindow { period: Period::Annual, limit: Some(6) });
    }
}
