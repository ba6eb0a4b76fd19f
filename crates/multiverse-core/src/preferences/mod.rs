//! User preferences persisted in the local store.

mod model;
mod repository;

pub use model::{THEME_PREFERENCE_KEY, ThemeMode};
pub use repository::PreferenceRepository;
