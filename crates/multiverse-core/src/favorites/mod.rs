//! Favorites: locally persisted snapshots of characters and episodes.
//!
//! Each favorite stores the full JSON of the entity as it was when the user
//! favorited it. This is a copy, not a reference: the snapshot stays readable
//! offline and is never refreshed from the remote API. Favoriting the same
//! entity again keeps the original snapshot.
//!
//! # Example
//!
//! ```ignore
//! use multiverse_core::{FavoriteItem, FavoriteRepository, ItemKind, Store};
//!
//! let repo = FavoriteRepository::new(Store::open("favorites.db").await?);
//!
//! repo.add(&FavoriteItem::from(character)).await?;
//! assert!(repo.exists(ItemKind::Character, character_id).await?);
//!
//! for favorite in repo.list_all(Some(ItemKind::Character)).await? {
//!     println!("{} (added {:?})", favorite.item.name(), favorite.added_at);
//! }
//! ```

mod model;
mod repository;
mod service;

pub use model::{ChangeResult, FavoriteItem, FavoriteRecord, ItemKind, UnknownItemKind};
pub use repository::FavoriteRepository;
pub use service::{FavoriteMutation, FavoritesService, QueryScope};
