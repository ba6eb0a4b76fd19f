//! Error types for the core library.

use thiserror::Error;

use crate::favorites::ItemKind;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Schema setup failed; favorites and preferences are unusable.
    #[error("Storage initialization failed: {0}")]
    StorageInit(#[source] sqlx::Error),

    /// A single repository call failed against the store.
    #[error("Storage error in {operation} ({keys}): {source}")]
    StorageOperation {
        /// Repository operation name.
        operation: &'static str,
        /// Keys involved, e.g. `character:1`.
        keys: String,
        /// Underlying database error.
        #[source]
        source: sqlx::Error,
    },

    /// A stored payload could not be decoded.
    #[error("Unreadable {kind} payload in row {row_id}: {source}")]
    PayloadDecode {
        /// Row id of the offending favorite.
        row_id: i64,
        /// Entity kind the payload was decoded as.
        kind: String,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// A remote page fetch failed.
    #[error("Remote fetch failed: {0}")]
    RemoteFetch(#[from] multiverse_api::Error),

    /// An add or remove favorite mutation failed.
    #[error("Favorite {operation} failed for {keys}: {source}")]
    Mutation {
        /// `add` or `remove`.
        operation: &'static str,
        /// Keys involved, e.g. `episode:7`.
        keys: String,
        /// Cause.
        #[source]
        source: Box<Error>,
    },

    /// Another mutation for the same favorite has not finished yet.
    #[error("A favorite mutation for {0} is already in flight")]
    MutationInFlight(String),
}

impl Error {
    /// Builds a closure mapping a database error to [`Error::StorageOperation`].
    pub(crate) fn storage(
        operation: &'static str,
        keys: impl Into<String>,
    ) -> impl FnOnce(sqlx::Error) -> Self {
        let keys = keys.into();
        move |source| Self::StorageOperation {
            operation,
            keys,
            source,
        }
    }
}

/// Formats the `kind:id` pair used in error and log context.
pub(crate) fn item_keys(kind: ItemKind, item_id: i64) -> String {
    format!("{kind}:{item_id}")
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
