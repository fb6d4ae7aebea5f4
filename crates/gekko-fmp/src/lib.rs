//! Client for the Financial Modeling Prep REST API.
//!
//! The pipeline depends on the [`FinancialData`] trait only; [`FmpClient`]
//! is the HTTP implementation.  Every call returns `Result<Vec<_>, FmpError>`
//! so callers decide uniformly what "no data" means.

pub mod client;
pub mod endpoints;
pub mod error;
pub mod types;

pub use client::{FmpClient, FmpConfig};
pub use endpoints::Statement;
pub use error::FmpError;
pub use types::{MetricWindow, Period, Quarter, Transcript};

use async_trait::async_trait;

/// Source of earnings-call transcripts and financial statements.
#[async_trait]
pub trait FinancialData: Send + Sync {
    /// A single earnings call, optionally pinned to a year and quarter.
    async fn transcript(
        &self,
        symbol: &str,
        year: Option<i32>,
        quarter: Option<Quarter>,
    ) -> Result<Vec<Transcript>, FmpError>;

    /// Every earnings call of `year` for `symbol`.
    async fn transcripts(&self, symbol: &str, year: Option<i32>)
        -> Result<Vec<Transcript>, FmpError>;

    /// Rows of a financial statement, newest first.
    async fn statement(
        &self,
        statement: Statement,
        symbol: &str,
        window: &MetricWindow,
    ) -> Result<Vec<serde_json::Value>, FmpError>;
}
