//! Database abstraction layer.
//!
//! One store trait per entity defines the persistence interface; the default
//! implementation is [`SqliteStore`]. To swap to another database, implement
//! the traits for your new type and change the concrete type in
//! [`crate::state::AppState`].
//!
//! All trait methods use `impl Future` in their signatures (stable since Rust
//! 1.75) so no extra `async-trait` crate is required.

pub mod chat;
pub mod dao;
pub mod section;
pub mod session;
pub mod task;
pub mod transcript;
pub mod video;

pub use dao::{ChatMessage, ChatSession, Section, TaskRecord, Thumbnail, TranscriptSentence,
              Video, VideoTranscript};

pub use chat::ChatStore;
pub use section::SectionStore;
pub use session::SessionStore;
pub use task::TaskStore;
pub use transcript::TranscriptStore;
pub use video::{ThumbnailStore, VideoStore};

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

/// SQLite-backed store for every entity in the system.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the SQLite database at `url` and run pending
    /// migrations.
    ///
    /// `url` should be a sqlx-compatible SQLite URL, e.g.
    /// `"sqlite://video-agent.db"` or `"sqlite::memory:"` for tests.
    /// The migrations path is resolved relative to `CARGO_MANIFEST_DIR` at
    /// compile time, so the directory is embedded into the binary.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);
        // Every pooled connection to a `:memory:` URL gets its own empty
        // database, so memory databases are pinned to a single long-lived
        // connection.
        let pool = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePool::connect_with(options).await?
        };
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }
}
