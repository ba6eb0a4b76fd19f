//! # multiverse-core
//!
//! Local state for the Rick and Morty client.
//!
//! This crate provides:
//! - Local storage (`SQLite`) behind an explicitly constructed [`Store`]
//! - Favorites: offline snapshots of characters and episodes
//! - Preferences, including the persisted theme choice
//! - Paged remote list queries with stale-response protection
//! - Favorite status queries whose caches are invalidated by mutations
//!
//! ## Quick Start
//!
//! ```ignore
//! use multiverse_core::{FavoriteRepository, FavoritesService, ItemKind, Store};
//!
//! let store = Store::open("rickmorty_favorites.db").await?;
//! let favorites = FavoritesService::new(FavoriteRepository::new(store.clone()));
//!
//! if !favorites.is_favorited(Some(ItemKind::Character), Some(1)).await? {
//!     favorites.add_favorite(&rick.into()).await?;
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod error;
pub mod favorites;
pub mod preferences;
pub mod query;
mod store;

#[cfg(test)]
mod fixtures;

pub use error::{Error, Result};
pub use favorites::{
    ChangeResult, FavoriteItem, FavoriteMutation, FavoriteRecord, FavoriteRepository,
    FavoritesService, ItemKind, QueryScope, UnknownItemKind,
};
pub use preferences::{PreferenceRepository, THEME_PREFERENCE_KEY, ThemeMode};
pub use query::{
    CharacterList, CharacterSource, EpisodeList, EpisodeSource, FetchOutcome, PageSource,
    PagedQuery, PagedSnapshot, QueryCache, QueryStatus,
};
pub use store::Store;
