//! Page sources: where a paged query gets its pages from.

use std::fmt::Debug;

use async_trait::async_trait;
use multiverse_api::{ApiClient, Character, CharacterFilters, Episode, EpisodeFilters, Page};
use tracing::debug;

/// A remote list that can be fetched one page at a time.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Filter set selecting the list; compared by value.
    type Filters: Clone + PartialEq + Debug + Send + Sync;
    /// Entity type on each page.
    type Item: Clone + Send + Sync;

    /// Entity kind, used as the first half of the cache key in logs.
    fn name(&self) -> &'static str;

    /// Fetch page `page` (1-based) of the list selected by `filters`.
    async fn fetch_page(
        &self,
        filters: &Self::Filters,
        page: u32,
    ) -> multiverse_api::Result<Page<Self::Item>>;
}

/// Character list pages from the remote API.
#[derive(Debug, Clone)]
pub struct CharacterSource {
    client: ApiClient,
}

impl CharacterSource {
    /// Create a source backed by `client`.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageSource for CharacterSource {
    type Filters = CharacterFilters;
    type Item = Character;

    fn name(&self) -> &'static str {
        "characters"
    }

    async fn fetch_page(
        &self,
        filters: &CharacterFilters,
        page: u32,
    ) -> multiverse_api::Result<Page<Character>> {
        empty_when_no_match(page, self.client.characters(filters, page).await)
    }
}

/// Episode list pages from the remote API.
#[derive(Debug, Clone)]
pub struct EpisodeSource {
    client: ApiClient,
}

impl EpisodeSource {
    /// Create a source backed by `client`.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageSource for EpisodeSource {
    type Filters = EpisodeFilters;
    type Item = Episode;

    fn name(&self) -> &'static str {
        "episodes"
    }

    async fn fetch_page(
        &self,
        filters: &EpisodeFilters,
        page: u32,
    ) -> multiverse_api::Result<Page<Episode>> {
        empty_when_no_match(page, self.client.episodes(filters, page).await)
    }
}

/// The API answers 404 for a filter set with no matches; on the first page
/// that is an empty list, not a failure.
fn empty_when_no_match<T>(
    page: u32,
    result: multiverse_api::Result<Page<T>>,
) -> multiverse_api::Result<Page<T>> {
    match result {
        Err(e) if page == 1 && e.is_not_found() => {
            debug!(error = %e, "no matches for filters");
            Ok(Page::empty())
        }
        other => other,
    }
}
