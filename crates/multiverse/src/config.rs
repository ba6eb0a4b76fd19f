//! Application configuration.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use multiverse_api::DEFAULT_BASE_URL;

const APP_DIR: &str = "multiverse";
const CONFIG_FILE: &str = "config.json";
const DATABASE_FILE: &str = "rickmorty_favorites.db";

/// Settings read from `<config_dir>/multiverse/config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the REST API.
    pub api_base_url: String,
    /// Favorites database file; defaults to the platform data directory.
    pub database_path: Option<PathBuf>,
    /// Log filter used when `RUST_LOG` is not set.
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            database_path: None,
            log_filter: None,
        }
    }
}

impl Config {
    /// Load from the default location, or defaults if there is no file.
    pub async fn load() -> anyhow::Result<Self> {
        Self::load_from(&default_path()).await
    }

    /// Load from `path`, or defaults if it does not exist.
    pub async fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
    }

    /// Database file to open.
    pub fn database_path(&self) -> PathBuf {
        self.database_path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR)
                .join(DATABASE_FILE)
        })
    }
}

fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(CONFIG_FILE)
}
