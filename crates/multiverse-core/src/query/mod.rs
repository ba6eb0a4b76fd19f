//! Remote list caching and query invalidation.
//!
//! - [`PagedQuery`] holds the paged character and episode lists for the
//!   filters currently on screen.
//! - [`QueryCache`] holds keyed results (favorite status, favorites lists)
//!   until a mutation invalidates them.

mod cache;
mod paged;
mod source;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use cache::QueryCache;
pub use paged::{FetchOutcome, LOAD_MORE_THRESHOLD, PagedQuery, PagedSnapshot, QueryStatus};
pub use source::{CharacterSource, EpisodeSource, PageSource};

/// Paged character list.
pub type CharacterList = PagedQuery<CharacterSource>;

/// Paged episode list.
pub type EpisodeList = PagedQuery<EpisodeSource>;

/// Locks `mutex`, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
