//! Server configuration, loaded from environment variables at startup.

use std::time::Duration;

use gekko_core::{ChunkStrategy, PipelineSettings};
use gekko_fmp::FmpConfig;
use gekko_llm::OpenAiConfig;

/// Runtime configuration for gekko-server.
///
/// Every field has a default so the server starts without any environment
/// variables set; the upstream API keys are then empty and model or data
/// calls fail at request time.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:3000"`).
    pub bind_address: String,

    /// SQLite URL for saved chats.
    pub database_url: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Comma-separated list of allowed CORS origins; `None` allows any.
    pub cors_allowed_origins: Option<String>,

    /// Serve Swagger UI and the OpenAPI document.
    pub enable_swagger: bool,

    /// Bearer token required on `/api/*` when set.
    pub api_token: Option<String>,

    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,

    pub fmp_api_key: String,
    pub fmp_base_url: String,

    /// Timeout of every outbound HTTP call.
    pub http_timeout: Duration,

    /// Pause before the single retry after an HTTP 429 from FMP.
    pub rate_limit_retry: Duration,

    pub chunk_size: usize,
    pub chunk_strategy: ChunkStrategy,
    pub chunk_delay: Duration,
    pub transcript_delay: Duration,
    pub condense_summaries: bool,
    pub default_year: Option<i32>,
    pub metric_limit: u32,
    pub metric_max_limit: u32,

    /// Message count at which a conversation becomes a saved chat.
    pub persist_threshold: usize,

    /// Upper bound on live conversations held in memory.
    pub max_conversations: usize,
    /// Live conversations unused for this long are dropped.
    pub conversation_idle: Duration,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build [`Config`] from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let env = Env(&lookup);
        Self {
            bind_address: env.or("GEKKO_BIND", "0.0.0.0:3000"),
            database_url: env.or("GEKKO_DATABASE_URL", "sqlite://gekko.db?mode=rwc"),
            log_level: env.or("GEKKO_LOG", "info"),
            log_json: env.flag("GEKKO_LOG_JSON", false),
            cors_allowed_origins: env.optional("GEKKO_CORS_ORIGINS"),
            enable_swagger: env.flag("GEKKO_ENABLE_SWAGGER", true),
            api_token: env.optional("GEKKO_API_TOKEN"),
            openai_api_key: env.or("OPENAI_API_KEY", ""),
            openai_base_url: env.or("OPENAI_BASE_URL", "https://api.openai.com/v1"),
            openai_model: env.or("OPENAI_MODEL", "gpt-4"),
            fmp_api_key: env.or("FMP_API_KEY", ""),
            fmp_base_url: env.or("FMP_BASE_URL", "https://financialmodelingprep.com/api/v3"),
            http_timeout: Duration::from_secs(env.parse("GEKKO_HTTP_TIMEOUT_SECS", 120)),
            rate_limit_retry: Duration::from_millis(env.parse("GEKKO_RATE_LIMIT_RETRY_MS", 1000)),
            chunk_size: env.parse("GEKKO_CHUNK_SIZE", 6000),
            chunk_strategy: env.parse("GEKKO_CHUNK_STRATEGY", ChunkStrategy::Fixed),
            chunk_delay: Duration::from_millis(env.parse("GEKKO_CHUNK_DELAY_MS", 125)),
            transcript_delay: Duration::from_millis(env.parse("GEKKO_TRANSCRIPT_DELAY_MS", 500)),
            condense_summaries: env.flag("GEKKO_CONDENSE_SUMMARIES", true),
            default_year: env.optional("GEKKO_DEFAULT_YEAR").and_then(|v| v.trim().parse().ok()),
            metric_limit: env.parse("GEKKO_METRIC_LIMIT", 5),
            metric_max_limit: env.parse("GEKKO_METRIC_MAX_LIMIT", 20),
            persist_threshold: env.parse("GEKKO_PERSIST_THRESHOLD", 4),
            max_conversations: env.parse("GEKKO_MAX_CONVERSATIONS", 10_000),
            conversation_idle: Duration::from_secs(env.parse("GEKKO_CONVERSATION_IDLE_SECS", 3600)),
        }
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.chunk_size == 0 {
            anyhow::bail!("GEKKO_CHUNK_SIZE must be greater than zero");
        }
        if self.metric_max_limit == 0 {
            anyhow::bail!("GEKKO_METRIC_MAX_LIMIT must be greater than zero");
        }
        if self.persist_threshold == 0 {
            anyhow::bail!("GEKKO_PERSIST_THRESHOLD must be greater than zero");
        }
        if self.max_conversations == 0 {
            anyhow::bail!("GEKKO_MAX_CONVERSATIONS must be greater than zero");
        }
        Ok(())
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            chunk_size: self.chunk_size,
            chunk_strategy: self.chunk_strategy,
            chunk_delay: self.chunk_delay,
            transcript_delay: self.transcript_delay,
            condense_summaries: self.condense_summaries,
            default_year: self.default_year,
            metric_limit: self.metric_limit,
            metric_max_limit: self.metric_max_limit,
        }
    }

    pub fn openai_config(&self) -> OpenAiConfig {
        OpenAiConfig {
            api_key: self.openai_api_key.clone(),
            base_url: self.openai_base_url.clone(),
            model: self.openai_model.clone(),
            timeout: self.http_timeout,
        }
    }

    pub fn fmp_config(&self) -> FmpConfig {
        FmpConfig {
            api_key: self.fmp_api_key.clone(),
            base_url: self.fmp_base_url.clone(),
            timeout: self.http_timeout,
            retry_delay: self.rate_limit_retry,
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

struct Env<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    fn or(&self, key: &str, default: &str) -> String {
        (self.0)(key).unwrap_or_else(|| default.to_owned())
    }

    /// Set and non-blank.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn flag(&self, key: &str, default: bool) -> bool {
        match (self.0)(key) {
            Some(v) if v == "1" || v.eq_ignore_ascii_case("true") => true,
            Some(v) if v == "0" || v.eq_ignore_ascii_case("false") => false,
            _ => default,
        }
    }

    fn parse<T: std::str::FromStr>(&self, key: &str, default: T) -> T {
        (self.0)(key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = config(&[]);
        assert_eq!(cfg.bind_address, "0.0.0.0:3000");
        assert_eq!(cfg.database_url, "sqlite://gekko.db?mode=rwc");
        assert!(!cfg.log_json);
        assert!(cfg.enable_swagger);
        assert_eq!(cfg.api_token, None);
        assert_eq!(cfg.openai_model, "gpt-4");
        assert_eq!(cfg.http_timeout, Duration::from_secs(120));
        assert_eq!(cfg.chunk_size, 6000);
        assert_eq!(cfg.chunk_strategy, ChunkStrategy::Fixed);
        assert_eq!(cfg.chunk_delay, Duration::from_millis(125));
        assert_eq!(cfg.transcript_delay, Duration::from_millis(500));
        assert_eq!(cfg.default_year, None);
        assert_eq!(cfg.persist_threshold, 4);
        assert_eq!(cfg.max_conversations, 10_000);
        assert_eq!(cfg.conversation_idle, Duration::from_secs(3600));
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.pipeline_settings(), PipelineSettings::default());
    }

    #[test]
    fn overrides_and_bad_values() {
        let cfg = config(&[
            ("GEKKO_LOG_JSON", "TRUE"),
            ("GEKKO_ENABLE_SWAGGER", "0"),
            ("GEKKO_API_TOKEN", "  "),
            ("GEKKO_CHUNK_STRATEGY", "Sentence"),
            ("GEKKO_CHUNK_SIZE", "lots"),
            ("GEKKO_DEFAULT_YEAR", "2023"),
            ("GEKKO_RATE_LIMIT_RETRY_MS", "250"),
        ]);
        assert!(cfg.log_json);
        assert!(!cfg.enable_swagger);
        assert_eq!(cfg.api_token, None);
        assert_eq!(cfg.chunk_strategy, ChunkStrategy::Sentence);
        assert_eq!(cfg.chunk_size, 6000);
        assert_eq!(cfg.default_year, Some(2023));
        assert_eq!(cfg.fmp_config().retry_delay, Duration::from_millis(250));
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let cfg = config(&[("GEKKO_CHUNK_SIZE", "0")]);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_conversation_capacity_is_rejected() {
        let cfg = config(&[("GEKKO_MAX_CONVERSATIONS", "0")]);
        assert!(cfg.validate().is_err());
    }
}
