use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{Display, EnumString};

/// Fiscal quarter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Quarter::Q1),
            2 => Some(Quarter::Q2),
            3 => Some(Quarter::Q3),
            4 => Some(Quarter::Q4),
            _ => None,
        }
    }

    /// The number FMP expects in its `quarter` query parameter.
    pub fn number(self) -> u8 {
        match self {
            Quarter::Q1 => 1,
            Quarter::Q2 => 2,
            Quarter::Q3 => 3,
            Quarter::Q4 => 4,
        }
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.number())
    }
}

impl FromStr for Quarter {
    type Err = String;

    /// Accepts `"Q3"`, `"q3"` and `"3"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('Q')
            .or_else(|| trimmed.strip_prefix('q'))
            .unwrap_or(trimmed);
        digits
            .parse::<u8>()
            .ok()
            .and_then(Quarter::from_number)
            .ok_or_else(|| format!("invalid quarter: {s:?}"))
    }
}

impl Serialize for Quarter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Quarter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u8),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Quarter::from_number(n)
                .ok_or_else(|| D::Error::custom(format!("invalid quarter: {n}"))),
            Raw::Text(s) => s.parse().map_err(D::Error::custom),
        }
    }
}

/// Reporting period of a financial statement.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Period {
    #[default]
    Annual,
    Quarter,
}

/// How much statement history to request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricWindow {
    pub period: Period,
    pub limit: Option<u32>,
}

impl Default for MetricWindow {
    fn default() -> Self {
        Self {
            period: Period::Annual,
            limit: Some(5),
        }
    }
}

/// One earnings-call transcript as returned by FMP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub quarter: Option<Quarter>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl Transcript {
    /// Transcript text, empty when FMP sent none.
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_parses_loose_forms() {
        assert_eq!("Q2".parse::<Quarter>().unwrap(), Quarter::Q2);
        assert_eq!(" q4 ".parse::<Quarter>().unwrap(), Quarter::Q4);
        assert_eq!("1".parse::<Quarter>().unwrap(), Quarter::Q1);
        assert!("Q5".parse::<Quarter>().is_err());
        assert!("spring".parse::<Quarter>().is_err());
    }

    #[test]
    fn quarter_deserializes_from_number_or_text() {
        let q: Quarter = serde_json::from_str("3").unwrap();
        assert_eq!(q, Quarter::Q3);
        let q: Quarter = serde_json::from_str(r#""Q1""#).unwrap();
        assert_eq!(q, Quarter::Q1);
        assert_eq!(serde_json::to_string(&Quarter::Q4).unwrap(), r#""Q4""#);
    }

    #[test]
    fn transcript_tolerates_missing_fields() {
        let t: Transcript =
            serde_json::from_str(r#"{"symbol":"AAPL","quarter":2,"year":2023}"#).unwrap();
        assert_eq!(t.quarter, Some(Quarter::Q2));
        assert_eq!(t.text(), "");

        let t: Transcript = serde_json::from_str(r#"{"content":null}"#).unwrap();
        assert_eq!(t.text(), "");
    }

    #[test]
    fn period_is_case_insensitive() {
        assert_eq!("Quarter".parse::<Period>().unwrap(), Period::Quarter);
        assert_eq!(Period::Annual.to_string(), "annual");
    }
}
