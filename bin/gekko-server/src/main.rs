//! gekko-server – entry point.
//!
//! Startup order:
//! 1. Parse configuration from environment variables.
//! 2. Initialise structured tracing (JSON or human-readable).
//! 3. Open the SQLite database and run pending migrations.
//! 4. Build the model and financial data clients.
//! 5. Build the Axum router and start the HTTP server with graceful shutdown.

mod config;
mod conversation;
mod entities;
mod error;
mod middleware;
mod routes;
mod schemas;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use gekko_core::Assistant;
use gekko_fmp::FmpClient;
use gekko_llm::OpenAiChat;
use tracing::{info, warn};

use crate::config::Config;
use crate::entities::SqliteStore;
use crate::state::{AppState, ConversationRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Configuration ───────────────────────────────────────────────────────
    let cfg = Config::from_env();

    // ── 2. Tracing ─────────────────────────────────────────────────────────────
    init_tracing(&cfg);
    info!(version = env!("CARGO_PKG_VERSION"), "gekko-server starting");
    cfg.validate()?;

    if cfg.openai_api_key.is_empty() {
        warn!("OPENAI_API_KEY is not set; every question will fail");
    }
    if cfg.fmp_api_key.is_empty() {
        warn!("FMP_API_KEY is not set; financial data requests will fail");
    }

    // ── 3. Database ────────────────────────────────────────────────────────────
    let store = SqliteStore::connect(&cfg.database_url).await?;
    info!(database_url = %cfg.database_url, "database ready");

    // ── 4. Model and data clients ──────────────────────────────────────────────
    let llm = OpenAiChat::new(cfg.openai_config())?;
    let data = FmpClient::new(cfg.fmp_config())?;
    let assistant = Assistant::new(Arc::new(llm), Arc::new(data), cfg.pipeline_settings());
    info!(
        model = %cfg.openai_model,
        chunk_size = cfg.chunk_size,
        chunk_strategy = %cfg.chunk_strategy,
        "pipeline ready"
    );

    let state = Arc::new(AppState {
        config: Arc::new(cfg.clone()),
        store: Arc::new(store),
        assistant,
        conversations: Arc::new(ConversationRegistry::new(
            cfg.max_conversations,
            cfg.conversation_idle,
        )),
    });

    // ── 5. HTTP server with graceful shutdown ──────────────────────────────────
    let app = routes::build(state);
    let addr: SocketAddr = cfg.bind_address.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("gekko-server stopped");
    Ok(())
}

/// `RUST_LOG` wins over `GEKKO_LOG`; an invalid `GEKKO_LOG` falls back to `info`.
fn init_tracing(cfg: &Config) {
    let env_filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => match cfg.log_level.parse::<tracing_subscriber::EnvFilter>() {
            Ok(f) => f,
            Err(e) => {
                eprintln!(
                    "WARN: GEKKO_LOG='{}' is not a valid tracing filter ({}); \
                     falling back to 'info'",
                    cfg.log_level, e
                );
                tracing_subscriber::EnvFilter::new("info")
            }
        },
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(true);

    if cfg.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

/// Returns a future that resolves when SIGINT (Ctrl-C) or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install CTRL+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => warn!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown signal received; starting graceful shutdown");
}
