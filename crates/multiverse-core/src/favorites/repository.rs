//! Favorite storage repository.

use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use tracing::{debug, warn};

use super::model::{ChangeResult, FavoriteItem, FavoriteRecord, ItemKind, parse_timestamp};
use crate::error::item_keys;
use crate::store::Store;
use crate::{Error, Result};

/// Repository for favorited characters and episodes.
///
/// On an unavailable [`Store`] every call succeeds with an empty result.
#[derive(Debug, Clone)]
pub struct FavoriteRepository {
    store: Store,
}

impl FavoriteRepository {
    /// Create a repository over `store`.
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Add a favorite snapshot of `item`.
    ///
    /// Adding an item that is already a favorite is a no-op reporting
    /// `changes == 0`; the stored snapshot is left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the item cannot be serialized or the insert fails.
    pub async fn add(&self, item: &FavoriteItem) -> Result<ChangeResult> {
        let (kind, item_id) = (item.kind(), item.id());
        let Some(pool) = self.store.pool() else {
            debug!(%kind, item_id, "store unavailable, favorite not added");
            return Ok(ChangeResult::default());
        };

        let payload = item.to_payload()?;
        let result = sqlx::query(
            r"
            INSERT OR IGNORE INTO favorites (itemId, itemKind, payload)
            VALUES (?, ?, ?)
            ",
        )
        .bind(item_id)
        .bind(kind.as_str())
        .bind(payload)
        .execute(pool)
        .await
        .map_err(Error::storage("add", item_keys(kind, item_id)))?;

        let changes = result.rows_affected();
        if changes > 0 {
            let row_id = result.last_insert_rowid();
            debug!(%kind, item_id, row_id, "favorite added");
            Ok(ChangeResult {
                changes,
                inserted_row_id: Some(row_id),
            })
        } else {
            debug!(%kind, item_id, "favorite already present");
            Ok(ChangeResult::default())
        }
    }

    /// Remove the favorite for `(kind, item_id)`.
    ///
    /// Removing a favorite that does not exist reports `changes == 0`.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub async fn remove(&self, kind: ItemKind, item_id: i64) -> Result<ChangeResult> {
        let Some(pool) = self.store.pool() else {
            debug!(%kind, item_id, "store unavailable, favorite not removed");
            return Ok(ChangeResult::default());
        };

        let result = sqlx::query(r"DELETE FROM favorites WHERE itemId = ? AND itemKind = ?")
            .bind(item_id)
            .bind(kind.as_str())
            .execute(pool)
            .await
            .map_err(Error::storage("remove", item_keys(kind, item_id)))?;

        let changes = result.rows_affected();
        if changes > 0 {
            debug!(%kind, item_id, "favorite removed");
        } else {
            debug!(%kind, item_id, "favorite not found to remove");
        }

        Ok(ChangeResult {
            changes,
            inserted_row_id: None,
        })
    }

    /// Check whether `(kind, item_id)` is a favorite.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn exists(&self, kind: ItemKind, item_id: i64) -> Result<bool> {
        let Some(pool) = self.store.pool() else {
            return Ok(false);
        };

        let row = sqlx::query(
            r"SELECT 1 AS found FROM favorites WHERE itemId = ? AND itemKind = ? LIMIT 1",
        )
        .bind(item_id)
        .bind(kind.as_str())
        .fetch_optional(pool)
        .await
        .map_err(Error::storage("exists", item_keys(kind, item_id)))?;

        Ok(row.is_some())
    }

    /// Get all favorites, most recently added first, optionally of one kind.
    ///
    /// Rows whose payload cannot be decoded are logged and left out of the
    /// result.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_all(&self, kind: Option<ItemKind>) -> Result<Vec<FavoriteRecord>> {
        let Some(pool) = self.store.pool() else {
            return Ok(Vec::new());
        };

        let keys = kind.map_or("all", |k| k.as_str());
        let rows = match kind {
            Some(kind) => {
                sqlx::query(
                    r"
                    SELECT rowId, itemId, itemKind, payload, addedAt
                    FROM favorites
                    WHERE itemKind = ?
                    ORDER BY addedAt DESC, rowId DESC
                    ",
                )
                .bind(kind.as_str())
                .fetch_all(pool)
                .await
            }
            None => {
                sqlx::query(
                    r"
                    SELECT rowId, itemId, itemKind, payload, addedAt
                    FROM favorites
                    ORDER BY addedAt DESC, rowId DESC
                    ",
                )
                .fetch_all(pool)
                .await
            }
        }
        .map_err(Error::storage("list_all", keys))?;

        let favorites: Vec<FavoriteRecord> = rows.iter().filter_map(row_to_favorite).collect();
        debug!(
            filter = keys,
            loaded = favorites.len(),
            dropped = rows.len() - favorites.len(),
            "listed favorites"
        );
        Ok(favorites)
    }

    /// Count favorites, optionally of one kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count(&self, kind: Option<ItemKind>) -> Result<u64> {
        let Some(pool) = self.store.pool() else {
            return Ok(0);
        };

        let keys = kind.map_or("all", |k| k.as_str());
        let count: i64 = match kind {
            Some(kind) => {
                sqlx::query_scalar(r"SELECT COUNT(*) FROM favorites WHERE itemKind = ?")
                    .bind(kind.as_str())
                    .fetch_one(pool)
                    .await
            }
            None => {
                sqlx::query_scalar(r"SELECT COUNT(*) FROM favorites")
                    .fetch_one(pool)
                    .await
            }
        }
        .map_err(Error::storage("count", keys))?;

        Ok(u64::try_from(count).unwrap_or_default())
    }
}

/// Convert a database row to a `FavoriteRecord`, or `None` if it is unreadable.
fn row_to_favorite(row: &SqliteRow) -> Option<FavoriteRecord> {
    let row_id: i64 = row.get("rowId");
    let raw_kind: String = row.get("itemKind");
    let Some(item_kind) = ItemKind::parse(&raw_kind) else {
        warn!(row_id, kind = %raw_kind, "dropping favorite with unknown kind");
        return None;
    };

    let payload: String = row.get("payload");
    let item = match FavoriteItem::from_payload(item_kind, &payload) {
        Ok(item) => item,
        Err(source) => {
            let error = Error::PayloadDecode {
                row_id,
                kind: raw_kind,
                source,
            };
            warn!(%error, "dropping favorite");
            return None;
        }
    };

    Some(FavoriteRecord {
        row_id,
        item_id: row.get("itemId"),
        item_kind,
        item,
        added_at: row
            .get::<Option<String>, _>("addedAt")
            .as_deref()
            .and_then(parse_timestamp),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::fixtures::{character, episode};

    async fn repo() -> FavoriteRepository {
        FavoriteRepository::new(Store::in_memory().await.unwrap())
    }

    #[tokio::test]
    async fn test_add_and_list() {
        let repo = repo().await;
        let rick = FavoriteItem::from(character(1, "Rick Sanchez"));

        let result = repo.add(&rick).await.unwrap();
        assert_eq!(result.changes, 1);
        assert!(result.inserted_row_id.is_some());

        let favorites = repo.list_all(None).await.unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].item_id, 1);
        assert_eq!(favorites[0].item_kind, ItemKind::Character);
        assert_eq!(favorites[0].item, rick);
        assert_eq!(Some(favorites[0].row_id), result.inserted_row_id);
        assert!(favorites[0].added_at.is_some());
    }

    #[tokio::test]
    async fn test_duplicate_add_keeps_original_snapshot() {
        let repo = repo().await;
        repo.add(&character(1, "Rick").into()).await.unwrap();

        let second = repo.add(&character(1, "Pickle Rick").into()).await.unwrap();
        assert_eq!(second.changes, 0);
        assert_eq!(second.inserted_row_id, None);

        let favorites = repo.list_all(None).await.unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].item.name(), "Rick");
    }

    #[tokio::test]
    async fn test_same_id_different_kind_are_distinct() {
        let repo = repo().await;
        repo.add(&character(1, "Rick").into()).await.unwrap();
        let result = repo.add(&episode(1, "Pilot").into()).await.unwrap();

        assert_eq!(result.changes, 1);
        assert_eq!(repo.count(None).await.unwrap(), 2);
        assert_eq!(repo.count(Some(ItemKind::Episode)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_remove() {
        let repo = repo().await;
        repo.add(&episode(7, "Raising Gazorpazorp").into())
            .await
            .unwrap();

        let removed = repo.remove(ItemKind::Episode, 7).await.unwrap();
        assert_eq!(removed.changes, 1);
        assert!(!repo.exists(ItemKind::Episode, 7).await.unwrap());

        let again = repo.remove(ItemKind::Episode, 7).await.unwrap();
        assert_eq!(again.changes, 0);
    }

    #[tokio::test]
    async fn test_remove_only_matches_kind() {
        let repo = repo().await;
        repo.add(&character(2, "Morty Smith").into()).await.unwrap();

        let result = repo.remove(ItemKind::Episode, 2).await.unwrap();
        assert_eq!(result.changes, 0);
        assert!(repo.exists(ItemKind::Character, 2).await.unwrap());
    }

    #[tokio::test]
    async fn test_exists() {
        let repo = repo().await;
        assert!(!repo.exists(ItemKind::Character, 1).await.unwrap());

        repo.add(&character(1, "Rick").into()).await.unwrap();
        assert!(repo.exists(ItemKind::Character, 1).await.unwrap());
        assert!(!repo.exists(ItemKind::Episode, 1).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_filtered_by_kind() {
        let repo = repo().await;
        repo.add(&character(1, "Rick").into()).await.unwrap();
        repo.add(&character(2, "Morty").into()).await.unwrap();

        assert!(repo.list_all(Some(ItemKind::Episode)).await.unwrap().is_empty());
        assert_eq!(
            repo.list_all(Some(ItemKind::Character)).await.unwrap().len(),
            2
        );
    }

    #[tokio::test]
    async fn test_list_most_recent_first() {
        let repo = repo().await;
        repo.add(&character(1, "Rick").into()).await.unwrap();
        repo.add(&episode(1, "Pilot").into()).await.unwrap();
        repo.add(&character(3, "Summer").into()).await.unwrap();

        // Force distinct timestamps on the first two rows.
        let pool = repo.store.pool().unwrap();
        sqlx::query("UPDATE favorites SET addedAt = '2020-01-01 00:00:00' WHERE itemKind = 'episode'")
            .execute(pool)
            .await
            .unwrap();

        let ids: Vec<(ItemKind, i64)> = repo
            .list_all(None)
            .await
            .unwrap()
            .iter()
            .map(|f| (f.item_kind, f.item_id))
            .collect();
        assert_eq!(
            ids,
            vec![
                (ItemKind::Character, 3),
                (ItemKind::Character, 1),
                (ItemKind::Episode, 1)
            ]
        );
    }

    #[tokio::test]
    async fn test_corrupt_payload_is_dropped() {
        let repo = repo().await;
        repo.add(&character(1, "Rick").into()).await.unwrap();
        repo.add(&character(2, "Morty").into()).await.unwrap();

        sqlx::query("INSERT INTO favorites (itemId, itemKind, payload) VALUES (3, 'character', '{not json')")
            .execute(repo.store.pool().unwrap())
            .await
            .unwrap();
        sqlx::query("INSERT INTO favorites (itemId, itemKind, payload) VALUES (4, 'episode', '{\"id\": 4}')")
            .execute(repo.store.pool().unwrap())
            .await
            .unwrap();

        let favorites = repo.list_all(None).await.unwrap();
        let mut ids: Vec<i64> = favorites.iter().map(|f| f.item_id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(repo.count(None).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_unavailable_store_degrades() {
        let repo = FavoriteRepository::new(Store::unavailable());
        let rick = FavoriteItem::from(character(1, "Rick"));

        assert_eq!(repo.add(&rick).await.unwrap(), ChangeResult::default());
        assert!(!repo.exists(ItemKind::Character, 1).await.unwrap());
        assert!(repo.list_all(None).await.unwrap().is_empty());
        assert_eq!(repo.remove(ItemKind::Character, 1).await.unwrap().changes, 0);
        assert_eq!(repo.count(None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_closed_store_reports_operation() {
        let store = Store::in_memory().await.unwrap();
        let repo = FavoriteRepository::new(store.clone());
        store.close().await;

        let err = repo.exists(ItemKind::Episode, 9).await.unwrap_err();
        match err {
            Error::StorageOperation { operation, keys, .. } => {
                assert_eq!(operation, "exists");
                assert_eq!(keys, "episode:9");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
