use gekko_llm::{ChatModel, CompletionRequest, LlmError};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::json::parse_lenient;
use crate::prompts;
use crate::types::Company;

#[derive(Deserialize)]
struct RawCompany {
    #[serde(default)]
    name: Option<String>,
    symbol: String,
}

/// Resolve the companies mentioned in `question`.
///
/// A reply that is not a JSON array counts as "no companies"; only a failed
/// model call is an error.
pub async fn extract_companies(
    llm: &dyn ChatModel,
    question: &str,
) -> Result<Vec<Company>, LlmError> {
    let request =
        CompletionRequest::instruct(prompts::EXTRACT_COMPANIES, prompts::user_prompt(question));
    let reply = llm.complete(request).await?;
    let companies = parse_companies(&reply);
    debug!(count = companies.len(), "resolved companies");
    Ok(companies)
}

/// Parse the resolver reply, normalising symbols and dropping bad entries.
pub fn parse_companies(reply: &str) -> Vec<Company> {
    let items = match parse_lenient::<Value>(reply) {
        Ok(Value::Array(items)) => items,
        Ok(_) => {
            warn!("company resolver did not return an array");
            return Vec::new();
        }
        Err(e) => {
            warn!(error = %e, "company resolver returned malformed JSON");
            return Vec::new();
        }
    };

    let mut companies: Vec<Company> = Vec::with_capacity(items.len());
    for item in items {
        let Ok(raw) = serde_json::from_value::<RawCompany>(item) else {
            continue;
        };
        let symbol = raw.symbol.trim().to_uppercase();
        if symbol.is_empty() || companies.iter().any(|c| c.symbol == symbol) {
            continue;
        }
        let name = raw
            .name
            .map(|n| n.trim().to_owned())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| symbol.clone());
        companies.push(Company { name, symbol });
    }
    companies
}
