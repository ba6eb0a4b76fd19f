//! Local store: the embedded database shared by all repositories.
//!
//! A [`Store`] is constructed once at startup and handed to each repository.
//! [`Store::unavailable`] models an environment without embedded database
//! support: it is never initialized and every repository call on it degrades
//! to an empty result instead of failing.

use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use crate::{Error, Result};

const MAX_CONNECTIONS: u32 = 5;

/// Schema statements, applied in order inside one transaction.
const SCHEMA: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS favorites (
        rowId INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
        itemId INTEGER NOT NULL,
        itemKind TEXT NOT NULL CHECK(itemKind IN ('character', 'episode')),
        payload TEXT NOT NULL,
        addedAt TEXT DEFAULT CURRENT_TIMESTAMP
    )
    ",
    r"
    CREATE INDEX IF NOT EXISTS idx_favorites_item
    ON favorites(itemId, itemKind)
    ",
    r"
    CREATE UNIQUE INDEX IF NOT EXISTS idx_favorites_unique
    ON favorites(itemId, itemKind)
    ",
    r"
    CREATE TABLE IF NOT EXISTS preferences (
        key TEXT PRIMARY KEY NOT NULL,
        value TEXT NOT NULL
    )
    ",
];

/// Handle to the local database.
///
/// Cloning is cheap; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct Store {
    pool: Option<SqlitePool>,
}

impl Store {
    /// Open (creating if needed) the database file at `path` and initialize its schema.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageInit`] if the file cannot be opened or the schema
    /// cannot be created.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await
            .map_err(Error::StorageInit)?;

        info!(path = %path.display(), "opened local store");
        let store = Self { pool: Some(pool) };
        store.initialize().await?;
        Ok(store)
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageInit`] if the connection or schema creation fails.
    pub async fn in_memory() -> Result<Self> {
        // One connection that never expires: each connection to `:memory:` is
        // its own database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect("sqlite::memory:")
            .await
            .map_err(Error::StorageInit)?;

        let store = Self { pool: Some(pool) };
        store.initialize().await?;
        Ok(store)
    }

    /// A store for environments without embedded database support.
    #[must_use]
    pub const fn unavailable() -> Self {
        Self { pool: None }
    }

    /// Whether this store is backed by a database.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.pool.is_some()
    }

    /// Create tables and indexes if they don't exist.
    ///
    /// Idempotent. All statements run in one transaction, so a partially
    /// created schema is never visible. A no-op on an unavailable store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageInit`] if any statement fails; nothing is applied
    /// in that case.
    pub async fn initialize(&self) -> Result<()> {
        let Some(pool) = &self.pool else {
            info!("embedded database unavailable, skipping initialization");
            return Ok(());
        };

        let mut tx = pool.begin().await.map_err(Error::StorageInit)?;
        for &statement in SCHEMA {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(Error::StorageInit)?;
        }
        tx.commit().await.map_err(Error::StorageInit)?;

        debug!("local store schema ready");
        Ok(())
    }

    /// The connection pool, or `None` for an unavailable store.
    pub(crate) const fn pool(&self) -> Option<&SqlitePool> {
        self.pool.as_ref()
    }

    /// Close the connection pool.
    ///
    /// Waits for checked-out connections to be returned. The store must not be
    /// used afterwards.
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
            debug!("local store closed");
        }
    }
}
