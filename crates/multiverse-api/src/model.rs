//! Entity models returned by the API.

use serde::{Deserialize, Serialize};

use crate::pagination::page_from_link;

/// Life status of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharacterStatus {
    /// Alive.
    Alive,
    /// Dead.
    Dead,
    /// Unknown.
    #[serde(rename = "unknown")]
    Unknown,
}

impl CharacterStatus {
    /// Query-string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Alive => "Alive",
            Self::Dead => "Dead",
            Self::Unknown => "unknown",
        }
    }
}

/// Gender of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    /// Female.
    Female,
    /// Male.
    Male,
    /// Genderless.
    Genderless,
    /// Unknown.
    #[serde(rename = "unknown")]
    Unknown,
}

impl Gender {
    /// Query-string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Female => "Female",
            Self::Male => "Male",
            Self::Genderless => "Genderless",
            Self::Unknown => "unknown",
        }
    }
}

/// A named location reference (origin or last known location).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CharacterLocation {
    /// Location name.
    pub name: String,
    /// Link to the location resource (may be empty).
    pub url: String,
}

/// A character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    /// Character id.
    pub id: i64,
    /// Name.
    pub name: String,
    /// Life status.
    pub status: CharacterStatus,
    /// Species.
    pub species: String,
    /// Subspecies or type (often empty).
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Gender.
    pub gender: Gender,
    /// Origin location.
    pub origin: CharacterLocation,
    /// Last known location.
    pub location: CharacterLocation,
    /// Avatar image link.
    pub image: String,
    /// Links to the episodes this character appears in.
    pub episode: Vec<String>,
    /// Link to this resource.
    pub url: String,
    /// Creation time as reported by the API.
    pub created: String,
}

/// An episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    /// Episode id.
    pub id: i64,
    /// Title.
    pub name: String,
    /// Air date as reported by the API (e.g. "December 2, 2013").
    pub air_date: String,
    /// Episode code (e.g. "S01E01").
    pub episode: String,
    /// Links to the characters appearing in this episode.
    pub characters: Vec<String>,
    /// Link to this resource.
    pub url: String,
    /// Creation time as reported by the API.
    pub created: String,
}

/// Pagination metadata attached to every list response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageInfo {
    /// Total number of matching entities.
    pub count: u64,
    /// Total number of pages.
    pub pages: u32,
    /// Link to the next page, if any.
    pub next: Option<String>,
    /// Link to the previous page, if any.
    pub prev: Option<String>,
}

impl PageInfo {
    /// Page number of the next page, extracted from the `next` link.
    #[must_use]
    pub fn next_page(&self) -> Option<u32> {
        self.next.as_deref().and_then(page_from_link)
    }

    /// Page number of the previous page, extracted from the `prev` link.
    #[must_use]
    pub fn prev_page(&self) -> Option<u32> {
        self.prev.as_deref().and_then(page_from_link)
    }
}

/// One page of a list response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Pagination metadata.
    pub info: PageInfo,
    /// Entities on this page.
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// An empty page with no further pages.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            info: PageInfo::default(),
            results: Vec::new(),
        }
    }
}

/// Body of a multi-id lookup: the API answers a single object for one id.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> From<OneOrMany<T>> for Vec<T> {
    fn from(value: OneOrMany<T>) -> Self {
        match value {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

/// Error body returned alongside non-success statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}
