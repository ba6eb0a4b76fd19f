//! Favorite status reads and add/remove mutations with cache invalidation.

use std::collections::HashSet;
use std::sync::Mutex;

use tracing::{debug, error, info};

use super::model::{ChangeResult, FavoriteItem, FavoriteRecord, ItemKind};
use super::repository::FavoriteRepository;
use crate::error::item_keys;
use crate::query::{QueryCache, lock};
use crate::{Error, Result};

/// A cached query a mutation can invalidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryScope {
    /// Favorite status of one item.
    IsFavorite {
        /// Entity kind.
        kind: ItemKind,
        /// Entity id.
        item_id: i64,
    },
    /// Every cached favorites list, filtered or not.
    FavoriteLists,
}

/// A change to the favorites set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FavoriteMutation {
    /// Favorite a snapshot of the item.
    Add(FavoriteItem),
    /// Unfavorite an item.
    Remove {
        /// Entity kind.
        kind: ItemKind,
        /// Entity id.
        item_id: i64,
    },
}

impl FavoriteMutation {
    /// The item the mutation targets.
    #[must_use]
    pub fn key(&self) -> (ItemKind, i64) {
        match self {
            Self::Add(item) => (item.kind(), item.id()),
            Self::Remove { kind, item_id } => (*kind, *item_id),
        }
    }

    /// Operation name used in errors and logs.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::Add(_) => "add",
            Self::Remove { .. } => "remove",
        }
    }

    /// Queries that must be recomputed once this mutation succeeds.
    #[must_use]
    pub fn invalidates(&self) -> [QueryScope; 2] {
        let (kind, item_id) = self.key();
        [
            QueryScope::IsFavorite { kind, item_id },
            QueryScope::FavoriteLists,
        ]
    }
}

/// Favorite status queries and mutations over a [`FavoriteRepository`].
///
/// Status and list reads are cached until a successful mutation invalidates
/// them. A failed mutation invalidates nothing, so cached reads keep their
/// last known good value.
#[derive(Debug)]
pub struct FavoritesService {
    repo: FavoriteRepository,
    status: QueryCache<(ItemKind, i64), bool>,
    lists: QueryCache<Option<ItemKind>, Vec<FavoriteRecord>>,
    pending: Mutex<HashSet<(ItemKind, i64)>>,
}

impl FavoritesService {
    /// Create a service over `repo` with empty caches.
    #[must_use]
    pub fn new(repo: FavoriteRepository) -> Self {
        Self {
            repo,
            status: QueryCache::new(),
            lists: QueryCache::new(),
            pending: Mutex::new(HashSet::new()),
        }
    }

    /// The underlying repository.
    pub const fn repository(&self) -> &FavoriteRepository {
        &self.repo
    }

    /// Whether the item is a favorite.
    ///
    /// A missing kind or id is never a favorite and does not touch storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the status has to be read and the read fails.
    pub async fn is_favorited(&self, kind: Option<ItemKind>, item_id: Option<i64>) -> Result<bool> {
        let (Some(kind), Some(item_id)) = (kind, item_id) else {
            return Ok(false);
        };

        self.status
            .get_or_fetch((kind, item_id), || self.repo.exists(kind, item_id))
            .await
    }

    /// Favorites, most recent first, optionally of one kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the list has to be read and the read fails.
    pub async fn favorites(&self, kind: Option<ItemKind>) -> Result<Vec<FavoriteRecord>> {
        self.lists
            .get_or_fetch(kind, || self.repo.list_all(kind))
            .await
    }

    /// Favorite a snapshot of `item`.
    ///
    /// # Errors
    ///
    /// See [`FavoritesService::execute`].
    pub async fn add_favorite(&self, item: &FavoriteItem) -> Result<ChangeResult> {
        self.execute(FavoriteMutation::Add(item.clone())).await
    }

    /// Unfavorite `(kind, item_id)`.
    ///
    /// # Errors
    ///
    /// See [`FavoritesService::execute`].
    pub async fn remove_favorite(&self, kind: ItemKind, item_id: i64) -> Result<ChangeResult> {
        self.execute(FavoriteMutation::Remove { kind, item_id }).await
    }

    /// Flip the favorite status of `item` and return the new status.
    ///
    /// # Errors
    ///
    /// Returns an error if the status read or the mutation fails.
    pub async fn toggle_favorite(&self, item: &FavoriteItem) -> Result<bool> {
        let (kind, item_id) = (item.kind(), item.id());
        if self.is_favorited(Some(kind), Some(item_id)).await? {
            self.remove_favorite(kind, item_id).await?;
            Ok(false)
        } else {
            self.add_favorite(item).await?;
            Ok(true)
        }
    }

    /// Whether a mutation for `(kind, item_id)` is in flight.
    pub fn is_mutation_pending(&self, kind: ItemKind, item_id: i64) -> bool {
        lock(&self.pending).contains(&(kind, item_id))
    }

    /// Apply `mutation` and invalidate the queries it affects.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MutationInFlight`] if a mutation for the same item has
    /// not finished, or [`Error::Mutation`] wrapping the storage failure.
    pub async fn execute(&self, mutation: FavoriteMutation) -> Result<ChangeResult> {
        let (kind, item_id) = mutation.key();
        let _pending = self.begin(kind, item_id)?;
        let operation = mutation.operation();

        let result = match &mutation {
            FavoriteMutation::Add(item) => self.repo.add(item).await,
            FavoriteMutation::Remove { kind, item_id } => self.repo.remove(*kind, *item_id).await,
        };

        let change = match result {
            Ok(change) => change,
            Err(e) => {
                error!(operation, %kind, item_id, error = %e, "favorite mutation failed");
                return Err(Error::Mutation {
                    operation,
                    keys: item_keys(kind, item_id),
                    source: Box::new(e),
                });
            }
        };

        for scope in mutation.invalidates() {
            self.invalidate(scope).await;
        }
        info!(operation, %kind, item_id, changes = change.changes, "favorite mutation applied");
        Ok(change)
    }

    async fn invalidate(&self, scope: QueryScope) {
        match scope {
            QueryScope::IsFavorite { kind, item_id } => {
                self.status.invalidate(&(kind, item_id)).await;
            }
            QueryScope::FavoriteLists => {
                let dropped = self.lists.invalidate_where(|_| true).await;
                debug!(dropped, "favorite lists invalidated");
            }
        }
    }

    fn begin(&self, kind: ItemKind, item_id: i64) -> Result<PendingGuard<'_>> {
        if !lock(&self.pending).insert((kind, item_id)) {
            return Err(Error::MutationInFlight(item_keys(kind, item_id)));
        }
        Ok(PendingGuard {
            pending: &self.pending,
            key: (kind, item_id),
        })
    }
}

/// Clears the pending flag for one item when dropped.
struct PendingGuard<'a> {
    pending: &'a Mutex<HashSet<(ItemKind, i64)>>,
    key: (ItemKind, i64),
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        lock(self.pending).remove(&self.key);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::fixtures::{character, episode};
    use crate::store::Store;

    async fn service() -> FavoritesService {
        let store = Store::in_memory().await.unwrap();
        FavoritesService::new(FavoriteRepository::new(store))
    }

    #[tokio::test]
    async fn test_missing_keys_are_not_favorites() {
        let service = service().await;
        service
            .add_favorite(&character(1, "Rick Sanchez").into())
            .await
            .unwrap();

        assert!(!service.is_favorited(None, Some(1)).await.unwrap());
        assert!(!service.is_favorited(Some(ItemKind::Character), None).await.unwrap());
        assert!(service.status.is_empty().await);
    }

    #[tokio::test]
    async fn test_add_invalidates_status_and_lists() {
        let service = service().await;
        let rick: FavoriteItem = character(1, "Rick Sanchez").into();

        assert!(!service.is_favorited(Some(ItemKind::Character), Some(1)).await.unwrap());
        assert!(service.favorites(None).await.unwrap().is_empty());

        let change = service.add_favorite(&rick).await.unwrap();
        assert!(change.is_changed());

        assert!(service.is_favorited(Some(ItemKind::Character), Some(1)).await.unwrap());
        let all = service.favorites(None).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].item, rick);
    }

    #[tokio::test]
    async fn test_remove_invalidates_status_and_lists() {
        let service = service().await;
        service.add_favorite(&episode(7, "Raising Gazorpazorp").into()).await.unwrap();
        assert!(service.is_favorited(Some(ItemKind::Episode), Some(7)).await.unwrap());
        assert_eq!(service.favorites(Some(ItemKind::Episode)).await.unwrap().len(), 1);

        service.remove_favorite(ItemKind::Episode, 7).await.unwrap();

        assert!(!service.is_favorited(Some(ItemKind::Episode), Some(7)).await.unwrap());
        assert!(service.favorites(Some(ItemKind::Episode)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mutation_leaves_other_status_cached() {
        let service = service().await;
        service.is_favorited(Some(ItemKind::Character), Some(2)).await.unwrap();
        service.add_favorite(&character(1, "Rick Sanchez").into()).await.unwrap();

        assert_eq!(
            service.status.get(&(ItemKind::Character, 2)).await,
            Some(false)
        );
    }

    #[tokio::test]
    async fn test_toggle() {
        let service = service().await;
        let morty: FavoriteItem = character(2, "Morty Smith").into();

        assert!(service.toggle_favorite(&morty).await.unwrap());
        assert!(service.is_favorited(Some(ItemKind::Character), Some(2)).await.unwrap());
        assert!(!service.toggle_favorite(&morty).await.unwrap());
        assert!(!service.is_favorited(Some(ItemKind::Character), Some(2)).await.unwrap());
    }

    #[tokio::test]
    async fn test_failed_mutation_keeps_cached_status() {
        let store = Store::in_memory().await.unwrap();
        let service = FavoritesService::new(FavoriteRepository::new(store.clone()));
        assert!(!service.is_favorited(Some(ItemKind::Character), Some(1)).await.unwrap());

        store.close().await;
        let err = service
            .add_favorite(&character(1, "Rick Sanchez").into())
            .await
            .unwrap_err();

        match err {
            Error::Mutation { operation, keys, .. } => {
                assert_eq!(operation, "add");
                assert_eq!(keys, "character:1");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(
            service.status.get(&(ItemKind::Character, 1)).await,
            Some(false)
        );
        assert!(!service.is_mutation_pending(ItemKind::Character, 1));
    }

    #[tokio::test]
    async fn test_second_mutation_while_pending_is_rejected() {
        let service = service().await;
        let guard = service.begin(ItemKind::Episode, 3).unwrap();
        assert!(service.is_mutation_pending(ItemKind::Episode, 3));

        let err = service.remove_favorite(ItemKind::Episode, 3).await.unwrap_err();
        assert!(matches!(err, Error::MutationInFlight(keys) if keys == "episode:3"));

        // Other items are unaffected.
        service.remove_favorite(ItemKind::Character, 3).await.unwrap();

        drop(guard);
        assert!(!service.is_mutation_pending(ItemKind::Episode, 3));
        service.remove_favorite(ItemKind::Episode, 3).await.unwrap();
    }

    #[test]
    fn test_mutation_invalidates_two_scopes() {
        let mutation = FavoriteMutation::Remove {
            kind: ItemKind::Episode,
            item_id: 9,
        };
        assert_eq!(
            mutation.invalidates(),
            [
                QueryScope::IsFavorite {
                    kind: ItemKind::Episode,
                    item_id: 9
                },
                QueryScope::FavoriteLists,
            ]
        );
        assert_eq!(mutation.operation(), "remove");
    }
}
