//! Lenient JSON extraction from model replies.

use serde::de::DeserializeOwned;

/// Parse `reply` as JSON, tolerating Markdown fences and prose around the
/// payload.
pub(crate) fn parse_lenient<T: DeserializeOwned>(reply: &str) -> Result<T, serde_json::Error> {
    let body = strip_fences(reply);
    match serde_json::from_str(body) {
        Ok(v) => Ok(v),
        Err(first) => match embedded(body) {
            Some(slice) => serde_json::from_str(slice),
            None => Err(first),
        },
    }
}

fn strip_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest
        .strip_prefix("json")
        .or_else(|| rest.strip_prefix("JSON"))
        .unwrap_or(rest);
    rest.trim().strip_suffix("```").unwrap_or(rest).trim()
}

/// The widest `[..]` or `{..}` span, whichever opens first.
fn embedded(text: &str) -> Option<&str> {
    let start = text.find(['[', '{'])?;
    let close = if text[start..].starts_with('[') { ']' } else { '}' };
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}
