//! Preference storage repository.

use tracing::{debug, warn};

use super::model::{THEME_PREFERENCE_KEY, ThemeMode};
use crate::store::Store;
use crate::{Error, Result};

/// Key/value preference storage.
///
/// On an unavailable [`Store`], saves are dropped and every key reads as absent.
#[derive(Debug, Clone)]
pub struct PreferenceRepository {
    store: Store,
}

impl PreferenceRepository {
    /// Create a repository over `store`.
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn save(&self, key: &str, value: &str) -> Result<()> {
        let Some(pool) = self.store.pool() else {
            debug!(key, "store unavailable, preference not saved");
            return Ok(());
        };

        sqlx::query(r"INSERT OR REPLACE INTO preferences (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(value)
            .execute(pool)
            .await
            .map_err(Error::storage("save", key))?;

        debug!(key, value, "preference saved");
        Ok(())
    }

    /// Value stored under `key`, or `None` if nothing was saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    pub async fn load(&self, key: &str) -> Result<Option<String>> {
        let Some(pool) = self.store.pool() else {
            return Ok(None);
        };

        sqlx::query_scalar(r"SELECT value FROM preferences WHERE key = ?")
            .bind(key)
            .fetch_optional(pool)
            .await
            .map_err(Error::storage("load", key))
    }

    /// Persist the theme choice.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn save_theme(&self, mode: ThemeMode) -> Result<()> {
        self.save(THEME_PREFERENCE_KEY, mode.as_str()).await
    }

    /// Saved theme choice, or `None` if none was saved or the stored value is
    /// not a theme.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    pub async fn load_theme(&self) -> Result<Option<ThemeMode>> {
        let Some(value) = self.load(THEME_PREFERENCE_KEY).await? else {
            return Ok(None);
        };

        let mode = ThemeMode::parse(&value);
        if mode.is_none() {
            warn!(value, "ignoring unrecognized theme preference");
        }
        Ok(mode)
    }

    /// Saved theme choice, falling back to [`ThemeMode::default`].
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    pub async fn theme_or_default(&self) -> Result<ThemeMode> {
        Ok(self.load_theme().await?.unwrap_or_default())
    }
}
