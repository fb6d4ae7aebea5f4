//! Persistence of saved chats.
//!
//! [`ChatStore`] defines the interface handlers use; [`SqliteStore`] is the
//! only implementation. Trait methods return `impl Future` so no
//! `async-trait` boxing is needed.

pub mod chat;
pub mod dao;

pub use chat::ChatStore;
pub use dao::{Chat, ChatMessage, ChatRole};

use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the SQLite database at `url` and run pending migrations.
    ///
    /// `url` should be a sqlx-compatible SQLite URL, e.g.
    /// `"sqlite://gekko.db?mode=rwc"` or `"sqlite::memory:"`.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        // Every connection to an in-memory database gets its own database.
        let in_memory = url.contains(":memory:");
        let mut options = SqlitePoolOptions::new().max_connections(if in_memory { 1 } else { 5 });
        if in_memory {
            options = options.idle_timeout(None).max_lifetime(None);
        }
        let pool = options.connect(url).await?;
        // Path is resolved relative to CARGO_MANIFEST_DIR at compile time.
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }
}
