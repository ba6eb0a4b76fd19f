//! Paged list query: an ordered, growable sequence of pages for one filter set.
//!
//! A [`PagedQuery`] tracks the list currently selected by its filters. State
//! transitions:
//!
//! ```text
//! Idle --observe--> Loading --ok--> Ready | Exhausted
//! Ready --fetch_next_page--> LoadingMore --ok--> Ready | Exhausted
//! Loading | LoadingMore --err--> Error      (pages loaded so far stay visible)
//! Error --refresh--> Loading --ok--> pages replaced from page 1
//! ```
//!
//! Changing the filters drops every page immediately and starts again at
//! page 1; nothing is reused across filter sets. A response that arrives after
//! the filters changed or a refresh was issued is discarded.

use std::sync::Mutex;

use multiverse_api::Page;
use tracing::{debug, warn};

use super::lock;
use super::source::PageSource;
use crate::{Error, Result};

/// Load more when the last visible item is this close to the end of the list.
pub const LOAD_MORE_THRESHOLD: usize = 5;

/// Lifecycle of a paged query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryStatus {
    /// No filters observed yet.
    #[default]
    Idle,
    /// Fetching page 1.
    Loading,
    /// Fetching the next page.
    LoadingMore,
    /// Loaded; another page exists.
    Ready,
    /// Loaded; the remote list has no further pages.
    Exhausted,
    /// The last fetch failed.
    Error,
}

impl QueryStatus {
    /// Returns true while a fetch is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading | Self::LoadingMore)
    }
}

/// What a fetch call ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A page was fetched and applied.
    Loaded,
    /// Nothing was fetched (no further page, a fetch already in flight, or
    /// nothing to refetch).
    Skipped,
    /// A page was fetched but the query had moved on, so it was dropped.
    Discarded,
}

/// Point-in-time copy of a paged query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagedSnapshot<F, T> {
    /// Filters the pages belong to.
    pub filters: Option<F>,
    /// Page numbers fetched, in fetch order; index-aligned with `pages`.
    pub page_params: Vec<u32>,
    /// Fetched pages.
    pub pages: Vec<Page<T>>,
    /// Page number the next fetch will request, if any.
    pub next_page: Option<u32>,
    /// Current status.
    pub status: QueryStatus,
    /// Message of the last failed fetch while in [`QueryStatus::Error`].
    pub error: Option<String>,
}

impl<F, T: Clone> PagedSnapshot<F, T> {
    /// All entities across pages, in page order. Not deduplicated.
    #[must_use]
    pub fn items(&self) -> Vec<T> {
        self.pages
            .iter()
            .flat_map(|page| page.results.iter().cloned())
            .collect()
    }

    /// Total matches reported by the remote list, once page 1 is loaded.
    #[must_use]
    pub fn total_count(&self) -> Option<u64> {
        self.pages.first().map(|page| page.info.count)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    First,
    Next,
}

#[derive(Debug)]
struct State<F, T> {
    filters: Option<F>,
    page_params: Vec<u32>,
    pages: Vec<Page<T>>,
    next_page: Option<u32>,
    status: QueryStatus,
    error: Option<String>,
    /// Bumped whenever in-flight responses must no longer apply.
    generation: u64,
}

impl<F, T> Default for State<F, T> {
    fn default() -> Self {
        Self {
            filters: None,
            page_params: Vec::new(),
            pages: Vec::new(),
            next_page: None,
            status: QueryStatus::Idle,
            error: None,
            generation: 0,
        }
    }
}

/// Paged query over a [`PageSource`].
pub struct PagedQuery<S: PageSource> {
    source: S,
    state: Mutex<State<S::Filters, S::Item>>,
}

impl<S: PageSource> std::fmt::Debug for PagedQuery<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = lock(&self.state);
        f.debug_struct("PagedQuery")
            .field("source", &self.source.name())
            .field("filters", &state.filters)
            .field("pages", &state.page_params)
            .field("status", &state.status)
            .finish_non_exhaustive()
    }
}

impl<S: PageSource> PagedQuery<S> {
    /// Create an idle query over `source`.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: Mutex::new(State::default()),
        }
    }

    /// The page source.
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Select `filters` and load page 1 if they differ from the current ones.
    ///
    /// Observing the filters already selected is a no-op; use
    /// [`PagedQuery::refresh`] to refetch them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RemoteFetch`] if page 1 cannot be fetched; the query is
    /// then in [`QueryStatus::Error`].
    pub async fn observe(&self, filters: S::Filters) -> Result<FetchOutcome> {
        let generation = {
            let mut state = lock(&self.state);
            if state.status != QueryStatus::Idle && state.filters.as_ref() == Some(&filters) {
                return Ok(FetchOutcome::Skipped);
            }

            debug!(query = self.source.name(), ?filters, "filters changed, resetting pages");
            state.filters = Some(filters.clone());
            state.page_params.clear();
            state.pages.clear();
            state.next_page = None;
            state.error = None;
            state.status = QueryStatus::Loading;
            state.generation += 1;
            state.generation
        };

        self.fetch(&filters, 1, generation, Phase::First).await
    }

    /// Refetch from page 1 with the current filters.
    ///
    /// Pages already loaded stay visible until page 1 arrives and then are
    /// replaced. This is also how a query leaves [`QueryStatus::Error`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::RemoteFetch`] if page 1 cannot be fetched.
    pub async fn refresh(&self) -> Result<FetchOutcome> {
        let (filters, generation) = {
            let mut state = lock(&self.state);
            let Some(filters) = state.filters.clone() else {
                return Ok(FetchOutcome::Skipped);
            };
            state.status = QueryStatus::Loading;
            state.generation += 1;
            (filters, state.generation)
        };

        debug!(query = self.source.name(), ?filters, "refreshing from page 1");
        self.fetch(&filters, 1, generation, Phase::First).await
    }

    /// Load the next page, if one exists and no fetch is in flight.
    ///
    /// Concurrent calls coalesce: while one fetch is running the others
    /// return [`FetchOutcome::Skipped`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::RemoteFetch`] if the page cannot be fetched; the pages
    /// loaded so far are kept.
    pub async fn fetch_next_page(&self) -> Result<FetchOutcome> {
        let (filters, page, generation) = {
            let mut state = lock(&self.state);
            if state.status != QueryStatus::Ready {
                return Ok(FetchOutcome::Skipped);
            }
            let (Some(filters), Some(page)) = (state.filters.clone(), state.next_page) else {
                return Ok(FetchOutcome::Skipped);
            };
            state.status = QueryStatus::LoadingMore;
            (filters, page, state.generation)
        };

        self.fetch(&filters, page, generation, Phase::Next).await
    }

    /// Load the next page when `last_visible_index` is near the end of the list.
    ///
    /// # Errors
    ///
    /// See [`PagedQuery::fetch_next_page`].
    pub async fn load_more_near(&self, last_visible_index: usize) -> Result<FetchOutcome> {
        let loaded: usize = {
            let state = lock(&self.state);
            state.pages.iter().map(|page| page.results.len()).sum()
        };

        if loaded == 0 || last_visible_index.saturating_add(LOAD_MORE_THRESHOLD) < loaded {
            return Ok(FetchOutcome::Skipped);
        }
        self.fetch_next_page().await
    }

    /// Current status.
    pub fn status(&self) -> QueryStatus {
        lock(&self.state).status
    }

    /// Whether a further page can be requested.
    pub fn has_next_page(&self) -> bool {
        lock(&self.state).next_page.is_some()
    }

    /// All loaded entities, in page order.
    pub fn items(&self) -> Vec<S::Item> {
        lock(&self.state)
            .pages
            .iter()
            .flat_map(|page| page.results.iter().cloned())
            .collect()
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> PagedSnapshot<S::Filters, S::Item> {
        let state = lock(&self.state);
        PagedSnapshot {
            filters: state.filters.clone(),
            page_params: state.page_params.clone(),
            pages: state.pages.clone(),
            next_page: state.next_page,
            status: state.status,
            error: state.error.clone(),
        }
    }

    async fn fetch(
        &self,
        filters: &S::Filters,
        page: u32,
        generation: u64,
        phase: Phase,
    ) -> Result<FetchOutcome> {
        debug!(query = self.source.name(), ?filters, page, "fetching page");
        let result = self.source.fetch_page(filters, page).await;

        let mut state = lock(&self.state);
        if state.generation != generation {
            warn!(
                query = self.source.name(),
                ?filters,
                page,
                "discarding stale page response"
            );
            return Ok(FetchOutcome::Discarded);
        }

        match result {
            Ok(fetched) => {
                let next_page = fetched.info.next_page();
                if phase == Phase::First {
                    state.pages.clear();
                    state.page_params.clear();
                }
                state.page_params.push(page);
                state.pages.push(fetched);
                state.next_page = next_page;
                state.error = None;
                state.status = if next_page.is_some() {
                    QueryStatus::Ready
                } else {
                    QueryStatus::Exhausted
                };
                debug!(
                    query = self.source.name(),
                    page,
                    next_page,
                    pages = state.pages.len(),
                    "page loaded"
                );
                Ok(FetchOutcome::Loaded)
            }
            Err(e) => {
                warn!(query = self.source.name(), page, error = %e, "page fetch failed");
                state.status = QueryStatus::Error;
                state.error = Some(e.to_string());
                Err(Error::RemoteFetch(e))
            }
        }
    }
}
