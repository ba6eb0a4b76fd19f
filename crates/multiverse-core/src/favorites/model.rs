//! Favorites data models.

use chrono::{DateTime, NaiveDateTime, Utc};
use multiverse_api::{Character, Episode};
use serde::{Deserialize, Serialize};

/// Which entity schema a favorite follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// A character.
    Character,
    /// An episode.
    Episode,
}

impl ItemKind {
    /// All kinds, in storage order.
    pub const ALL: [Self; 2] = [Self::Character, Self::Episode];

    /// Parse from database string representation.
    ///
    /// Unlike most parsers in this crate there is no fallback: the store
    /// rejects any other value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "character" => Some(Self::Character),
            "episode" => Some(Self::Episode),
            _ => None,
        }
    }

    /// Convert to database string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Character => "character",
            Self::Episode => "episode",
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown [`ItemKind`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown item kind: {0}")]
pub struct UnknownItemKind(pub String);

impl std::str::FromStr for ItemKind {
    type Err = UnknownItemKind;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(&s.to_lowercase()).ok_or_else(|| UnknownItemKind(s.to_string()))
    }
}

/// A favoritable entity.
///
/// The variant determines the stored kind, so an item can never be filed under
/// the wrong schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FavoriteItem {
    /// A character snapshot.
    Character(Character),
    /// An episode snapshot.
    Episode(Episode),
}

impl FavoriteItem {
    /// The entity kind.
    #[must_use]
    pub const fn kind(&self) -> ItemKind {
        match self {
            Self::Character(_) => ItemKind::Character,
            Self::Episode(_) => ItemKind::Episode,
        }
    }

    /// The entity id assigned by the remote API.
    #[must_use]
    pub const fn id(&self) -> i64 {
        match self {
            Self::Character(character) => character.id,
            Self::Episode(episode) => episode.id,
        }
    }

    /// Display name (character name or episode title).
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Character(character) => &character.name,
            Self::Episode(episode) => &episode.name,
        }
    }

    /// Serialize the entity itself (untagged) as the stored payload.
    pub(crate) fn to_payload(&self) -> serde_json::Result<String> {
        match self {
            Self::Character(character) => serde_json::to_string(character),
            Self::Episode(episode) => serde_json::to_string(episode),
        }
    }

    /// Decode a stored payload according to its kind.
    pub(crate) fn from_payload(kind: ItemKind, payload: &str) -> serde_json::Result<Self> {
        match kind {
            ItemKind::Character => serde_json::from_str(payload).map(Self::Character),
            ItemKind::Episode => serde_json::from_str(payload).map(Self::Episode),
        }
    }
}

impl From<Character> for FavoriteItem {
    fn from(character: Character) -> Self {
        Self::Character(character)
    }
}

impl From<Episode> for FavoriteItem {
    fn from(episode: Episode) -> Self {
        Self::Episode(episode)
    }
}

/// A persisted favorite: a point-in-time snapshot of the entity.
///
/// The snapshot is not refreshed when the remote entity changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteRecord {
    /// Row id in the store (not the entity id).
    pub row_id: i64,
    /// Entity id assigned by the remote API.
    pub item_id: i64,
    /// Entity kind.
    pub item_kind: ItemKind,
    /// Decoded snapshot.
    pub item: FavoriteItem,
    /// When the favorite was added, if the store recorded it.
    pub added_at: Option<DateTime<Utc>>,
}

/// Outcome of a write against the favorites table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChangeResult {
    /// Number of rows written or deleted (0 means "already present" or "not found").
    pub changes: u64,
    /// Row id of a newly inserted favorite.
    pub inserted_row_id: Option<i64>,
}

impl ChangeResult {
    /// Returns true if the call changed the store.
    #[must_use]
    pub const fn is_changed(&self) -> bool {
        self.changes > 0
    }
}

/// Parse `CURRENT_TIMESTAMP` output (`YYYY-MM-DD HH:MM:SS`, UTC).
pub(crate) fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}
