//! Filter sets for list endpoints.
//!
//! Filters are plain values: two filter sets select the same list exactly when
//! they compare equal.

use crate::model::{CharacterStatus, Gender};

/// Filters accepted by the character list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CharacterFilters {
    /// Name substring.
    pub name: Option<String>,
    /// Life status.
    pub status: Option<CharacterStatus>,
    /// Species.
    pub species: Option<String>,
    /// Subspecies or type.
    pub kind: Option<String>,
    /// Gender.
    pub gender: Option<Gender>,
}

impl CharacterFilters {
    /// Creates an empty filter set (matches every character).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the name filter.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = non_empty(name.into());
        self
    }

    /// Sets the status filter.
    #[must_use]
    pub const fn with_status(mut self, status: CharacterStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the species filter.
    #[must_use]
    pub fn with_species(mut self, species: impl Into<String>) -> Self {
        self.species = non_empty(species.into());
        self
    }

    /// Sets the type filter.
    #[must_use]
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = non_empty(kind.into());
        self
    }

    /// Sets the gender filter.
    #[must_use]
    pub const fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    /// The same filters with empty text fields unset, so that filter sets
    /// selecting the same list compare equal.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.and_then(non_empty),
            species: self.species.and_then(non_empty),
            kind: self.kind.and_then(non_empty),
            ..self
        }
    }

    /// Query parameters for the set filters, in a stable order.
    ///
    /// Empty strings are treated as unset.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_text(&mut pairs, "name", self.name.as_deref());
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        push_text(&mut pairs, "species", self.species.as_deref());
        push_text(&mut pairs, "type", self.kind.as_deref());
        if let Some(gender) = self.gender {
            pairs.push(("gender", gender.as_str().to_string()));
        }
        pairs
    }
}

/// Filters accepted by the episode list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct EpisodeFilters {
    /// Title substring.
    pub name: Option<String>,
    /// Episode code or code prefix (e.g. "S01").
    pub episode: Option<String>,
}

impl EpisodeFilters {
    /// Creates an empty filter set (matches every episode).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the title filter.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = non_empty(name.into());
        self
    }

    /// Sets the episode code filter.
    #[must_use]
    pub fn with_episode(mut self, episode: impl Into<String>) -> Self {
        self.episode = non_empty(episode.into());
        self
    }

    /// The same filters with empty text fields unset.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.and_then(non_empty),
            episode: self.episode.and_then(non_empty),
        }
    }

    /// Query parameters for the set filters, in a stable order.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_text(&mut pairs, "name", self.name.as_deref());
        push_text(&mut pairs, "episode", self.episode.as_deref());
        pairs
    }
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

fn push_text(pairs: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        pairs.push((key, value.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filters_have_no_pairs() {
        assert!(CharacterFilters::new().query_pairs().is_empty());
        assert!(EpisodeFilters::new().query_pairs().is_empty());
    }

    #[test]
    fn test_character_pairs() {
        let filters = CharacterFilters::new()
            .with_name("rick")
            .with_status(CharacterStatus::Unknown)
            .with_gender(Gender::Male)
            .with_kind("");

        assert_eq!(
            filters.query_pairs(),
            vec![
                ("name", "rick".to_string()),
                ("status", "unknown".to_string()),
                ("gender", "Male".to_string()),
            ]
        );
    }

    #[test]
    fn test_value_equality() {
        let a = EpisodeFilters::new().with_episode("S01");
        let b = EpisodeFilters::new().with_episode("S01");
        assert_eq!(a, b);
        assert_ne!(a, EpisodeFilters::new().with_episode("S02"));
    }

    #[test]
    fn test_empty_text_equals_unset() {
        assert_eq!(CharacterFilters::new().with_name(""), CharacterFilters::new());
        assert_eq!(
            CharacterFilters::new().with_species("").with_kind(""),
            CharacterFilters::new()
        );
        assert_eq!(EpisodeFilters::new().with_episode(""), EpisodeFilters::new());
    }

    #[test]
    fn test_normalized() {
        let filters = CharacterFilters {
            name: Some(String::new()),
            status: Some(CharacterStatus::Alive),
            species: Some("Human".to_string()),
            kind: Some(String::new()),
            gender: None,
        };
        assert_eq!(
            filters.normalized(),
            CharacterFilters::new()
                .with_status(CharacterStatus::Alive)
                .with_species("Human")
        );

        let filters = EpisodeFilters {
            name: Some(String::new()),
            episode: Some("S03".to_string()),
        };
        assert_eq!(filters.normalized(), EpisodeFilters::new().with_episode("S03"));
    }
}
