use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::endpoints::Statement;
use crate::error::FmpError;
use crate::types::{MetricWindow, Quarter, Transcript};
use crate::FinancialData;

/// Connection settings for [`FmpClient`].
#[derive(Debug, Clone)]
pub struct FmpConfig {
    pub api_key: String,
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Pause before the single retry after an HTTP 429.
    pub retry_delay: Duration,
}

impl Default for FmpConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://financialmodelingprep.com/api/v3".to_owned(),
            timeout: Duration::from_secs(120),
            retry_delay: Duration::from_millis(1000),
        }
    }
}

/// HTTP implementation of [`FinancialData`].
#[derive(Debug, Clone)]
pub struct FmpClient {
    config: FmpConfig,
    client: Client,
}

impl FmpClient {
    pub fn new(config: FmpConfig) -> Result<Self, FmpError> {
        let client = Client::builder()
            .user_agent(concat!("gekko-fmp/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()?;
        Ok(Self { config, client })
    }

    fn url(&self, path: &str, params: &[(&str, String)]) -> Result<Url, FmpError> {
        let raw = format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let mut url = Url::parse(&raw).map_err(|e| FmpError::InvalidUrl(format!("{raw}: {e}")))?;
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in params {
                query.append_pair(key, value);
            }
            query.append_pair("apikey", &self.config.api_key);
        }
        Ok(url)
    }

    /// The URL with the API key masked, for logs and error messages.
    fn redact(&self, url: &Url) -> String {
        let text = url.as_str();
        if self.config.api_key.is_empty() {
            text.to_owned()
        } else {
            text.replace(&self.config.api_key, "***")
        }
    }

    async fn get_rows<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<T>, FmpError> {
        let url = self.url(path, params)?;
        let shown = self.redact(&url);

        let mut retried = false;
        loop {
            debug!(url = %shown, retried, "FMP request");
            let response = self
                .client
                .get(url.clone())
                .send()
                .await
                .map_err(|e| transport_error(e, &shown))?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                if retried {
                    return Err(FmpError::RateLimited);
                }
                warn!(
                    url = %shown,
                    delay_ms = self.config.retry_delay.as_millis() as u64,
                    "FMP rate limit hit; retrying once"
                );
                tokio::time::sleep(self.config.retry_delay).await;
                retried = true;
                continue;
            }
            if status == StatusCode::NOT_FOUND {
                return Err(FmpError::NotFound(shown));
            }
            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(FmpError::Status {
                    status: status.as_u16(),
                    message,
                });
            }

            let body: Value = response
                .json()
                .await
                .map_err(|e| transport_error(e, &shown))?;
            return parse_rows(body);
        }
    }
}

/// reqwest errors carry the request URL, and with it the API key.
fn transport_error(e: reqwest::Error, shown: &str) -> FmpError {
    let e = e.without_url();
    warn!(url = %shown, error = %e, "FMP request failed");
    FmpError::Http(e)
}

/// FMP answers with an array on success, `{}` when empty and
/// `{"Error Message": ..}` for key and plan errors.
fn parse_rows<T: DeserializeOwned>(body: Value) -> Result<Vec<T>, FmpError> {
    match body {
        Value::Array(items) => Ok(serde_json::from_value(Value::Array(items))?),
        Value::Null => Ok(Vec::new()),
        Value::Object(map) => {
            if let Some(message) = map.get("Error Message").and_then(Value::as_str) {
                return Err(FmpError::Provider(message.to_owned()));
            }
            if map.is_empty() {
                return Ok(Vec::new());
            }
            Ok(vec![serde_json::from_value(Value::Object(map))?])
        }
        other => Err(FmpError::Provider(format!(
            "unexpected response shape: {other}"
        ))),
    }
}

#[async_trait]
impl FinancialData for FmpClient {
    async fn transcript(
        &self,
        symbol: &str,
        year: Option<i32>,
        quarter: Option<Quarter>,
    ) -> Result<Vec<Transcript>, FmpError> {
        let mut params = Vec::new();
        if let Some(year) = year {
            params.push(("year", year.to_string()));
        }
        if let Some(quarter) = quarter {
            params.push(("quarter", quarter.number().to_string()));
        }
        self.get_rows(&format!("earning_call_transcript/{symbol}"), &params)
            .await
    }

    async fn transcripts(
        &self,
        symbol: &str,
        year: Option<i32>,
    ) -> Result<Vec<Transcript>, FmpError> {
        let params: Vec<_> = year.map(|y| ("year", y.to_string())).into_iter().collect();
        self.get_rows(&format!("batch_earning_call_transcript/{symbol}"), &params)
            .await
    }

    async fn statement(
        &self,
        statement: Statement,
        symbol: &str,
        window: &MetricWindow,
    ) -> Result<Vec<Value>, FmpError> {
        let mut params = vec![("period", window.period.to_string())];
        if let Some(limit) = window.limit {
            params.push(("limit", limit.to_string()));
        }
        self.get_rows(&format!("{}/{symbol}", statement.path()), &params)
            .await
    }
}
