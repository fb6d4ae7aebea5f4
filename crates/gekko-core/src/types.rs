use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

pub use gekko_fmp::{MetricWindow, Period, Quarter, Statement};

/// What kind of question the user asked.
///
/// Parsing is an exact match on the three labels; anything else the
/// classifier returns is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QueryType {
    EarningsCall,
    FinancialMetric,
    Other,
}

/// A company mentioned in the question, as resolved by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    /// Uppercase ticker symbol.
    pub symbol: String,
}

/// Which earnings calls the question is about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarningsCallWindow {
    pub year: Option<i32>,
    pub quarter: Option<Quarter>,
    /// `true` when the question covers several calls.
    pub multiple: bool,
}

/// The metric the question asks for and the statement that holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricTarget {
    pub metric: String,
    pub statement: Statement,
}

/// Voice of the final answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Persona {
    #[default]
    Plain,
    Gekko,
}

impl Persona {
    pub fn from_flag(gekko: bool) -> Self {
        if gekko { Persona::Gekko } else { Persona::Plain }
    }
}

/// How the persona rewriter should treat its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// Keep the meaning, change the tone.
    Restyle,
    /// The input is an off-topic question; answer it in character.
    Unrelated,
}

/// A successful pipeline result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub query_type: QueryType,
    pub summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_type_accepts_only_exact_labels() {
        assert_eq!("earnings_call".parse::<QueryType>().unwrap(), QueryType::EarningsCall);
        assert_eq!(
            "financial_metric".parse::<QueryType>().unwrap(),
            QueryType::FinancialMetric
        );
        assert_eq!("other".parse::<QueryType>().unwrap(), QueryType::Other);
        assert!("Earnings_Call".parse::<QueryType>().is_err());
        assert!("earnings call".parse::<QueryType>().is_err());
    }

    #[test]
    fn answer_serializes_camel_case() {
        let answer = Answer {
            query_type: QueryType::FinancialMetric,
            summary: "up".into(),
        };
        let json = serde_json::to_value(&answer).unwrap();
        assert_eq!(json["queryType"], "financial_metric");
        assert_eq!(json["summary"], "up");
    }
}
