//! Catalog of the FMP statement endpoints the metric path can query.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Financial statement endpoint.
///
/// The string form is the identifier the language model is asked to pick,
/// not the URL path; see [`Statement::path`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum Statement {
    #[strum(serialize = "income_statement")]
    IncomeStatement,
    #[strum(serialize = "balance_sheet")]
    BalanceSheet,
    #[serde(alias = "cash_flow")]
    #[strum(to_string = "cashflow_statement", serialize = "cash_flow")]
    #[serde(rename = "cashflow_statement")]
    CashFlowStatement,
    #[strum(serialize = "key_metrics")]
    KeyMetrics,
    #[strum(serialize = "ratios")]
    Ratios,
    #[strum(serialize = "financial_growth")]
    FinancialGrowth,
}

impl Statement {
    /// Path segment under the API base URL.
    pub fn path(self) -> &'static str {
        match self {
            Statement::IncomeStatement => "income-statement",
            Statement::BalanceSheet => "balance-sheet-statement",
            Statement::CashFlowStatement => "cash-flow-statement",
            Statement::KeyMetrics => "key-metrics",
            Statement::Ratios => "ratios",
            Statement::FinancialGrowth => "financial-growth",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Statement::IncomeStatement => {
                "Income statement: revenue, cost of revenue, gross profit, operating income, net income, EPS, EBITDA."
            }
            Statement::BalanceSheet => {
                "Balance sheet: cash, total assets, total liabilities, debt, shareholder equity."
            }
            Statement::CashFlowStatement => {
                "Cash flow statement: operating cash flow, capital expenditure, free cash flow, dividends paid, buybacks."
            }
            Statement::KeyMetrics => {
                "Key metrics: market cap, PE ratio, price to sales, enterprise value, revenue per share, book value per share."
            }
            Statement::Ratios => {
                "Financial ratios: margins, return on equity, return on assets, current ratio, debt to equity."
            }
            Statement::FinancialGrowth => {
                "Financial growth: year over year growth of revenue, net income, EPS, free cash flow."
            }
        }
    }

    /// One `- identifier: description` line per endpoint, for prompts.
    pub fn catalog() -> String {
        Statement::iter()
            .map(|s| format!("- {}: {}", s, s.description()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
