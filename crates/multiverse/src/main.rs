//! `multiverse` - Rick and Morty browser with offline favorites.
//!
//! Lists characters and episodes from the public API and keeps favorites and
//! the theme preference in a local `SQLite` database.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod cli;
mod config;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, reload, util::SubscriberInitExt};

use multiverse_api::{ApiClient, Character, Episode};
use multiverse_core::{
    CharacterList, CharacterSource, EpisodeList, EpisodeSource, FavoriteItem, FavoriteRepository,
    FavoritesService, ItemKind, PageSource, PagedQuery, PreferenceRepository, Store,
};

use cli::{Cli, Command, ItemArgs, ThemeArg};
use config::Config;

const DEFAULT_LOG_FILTER: &str = "multiverse=info,multiverse_core=info";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; the filter is swapped once the config is read
    let (filter, filter_handle) = reload::Layer::new(env_filter(None));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match Config::load().await {
        Ok(config) => config,
        Err(e) => {
            error!(error = %format!("{e:#}"), "failed to load configuration");
            return Err(e);
        }
    };
    filter_handle.reload(env_filter(config.log_filter.as_deref()))?;

    info!("Starting multiverse");

    let client = ApiClient::with_base_url(&config.api_base_url)?;
    let store = open_store(&cli, &config).await?;
    let app = App::new(client, store.clone());

    let result = app.run(cli.command).await;
    store.close().await;
    result
}

/// `RUST_LOG` if set, otherwise the configured filter, otherwise the default.
fn env_filter(configured: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback_filter(configured).into())
}

fn fallback_filter(configured: Option<&str>) -> &str {
    configured
        .filter(|f| !f.trim().is_empty())
        .unwrap_or(DEFAULT_LOG_FILTER)
}

/// Open the favorites database, or an unavailable store with `--no-store`.
///
/// `--no-store` wins over any database path.
async fn open_store(cli: &Cli, config: &Config) -> Result<Store> {
    if cli.no_store {
        warn!("running without local storage, favorites will not be kept");
        return Ok(Store::unavailable());
    }

    let path = cli
        .database
        .clone()
        .unwrap_or_else(|| config.database_path());
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    Store::open(&path)
        .await
        .with_context(|| format!("opening favorites database {}", path.display()))
}

struct App {
    client: ApiClient,
    favorites: FavoritesService,
    preferences: PreferenceRepository,
}

impl App {
    fn new(client: ApiClient, store: Store) -> Self {
        Self {
            client,
            favorites: FavoritesService::new(FavoriteRepository::new(store.clone())),
            preferences: PreferenceRepository::new(store),
        }
    }

    async fn run(&self, command: Command) -> Result<()> {
        match command {
            Command::Characters { filters, paging } => {
                let list = CharacterList::new(CharacterSource::new(self.client.clone()));
                list.observe(filters.into()).await?;
                load_pages(&list, paging.pages).await?;
                self.print_characters(&list).await
            }
            Command::Episodes { filters, paging } => {
                let list = EpisodeList::new(EpisodeSource::new(self.client.clone()));
                list.observe(filters.into()).await?;
                load_pages(&list, paging.pages).await?;
                self.print_episodes(&list).await
            }
            Command::Favorites { kind } => self.print_favorites(kind.map(Into::into)).await,
            Command::Show(item) => self.show(&item).await,
            Command::Add(item) => {
                let item = self.fetch_item(&item).await?;
                let change = self.favorites.add_favorite(&item).await?;
                if change.is_changed() {
                    println!("Added {} #{} {}", item.kind(), item.id(), item.name());
                } else {
                    println!("{} #{} is already a favorite", item.kind(), item.id());
                }
                Ok(())
            }
            Command::Remove(ItemArgs { kind, id }) => {
                let kind = ItemKind::from(kind);
                let change = self.favorites.remove_favorite(kind, id).await?;
                if change.is_changed() {
                    println!("Removed {kind} #{id}");
                } else {
                    println!("{kind} #{id} was not a favorite");
                }
                Ok(())
            }
            Command::Toggle(item) => {
                let item = self.fetch_item(&item).await?;
                let favorited = self.favorites.toggle_favorite(&item).await?;
                let verb = if favorited { "Added" } else { "Removed" };
                println!("{verb} {} #{} {}", item.kind(), item.id(), item.name());
                Ok(())
            }
            Command::Status(ItemArgs { kind, id }) => {
                let favorited = self
                    .favorites
                    .is_favorited(Some(kind.into()), Some(id))
                    .await?;
                println!("{}", if favorited { "favorite" } else { "not a favorite" });
                Ok(())
            }
            Command::Theme { mode } => self.theme(mode).await,
        }
    }

    async fn fetch_item(&self, item: &ItemArgs) -> Result<FavoriteItem> {
        let fetched: FavoriteItem = match ItemKind::from(item.kind) {
            ItemKind::Character => self.client.character(item.id).await?.into(),
            ItemKind::Episode => self.client.episode(item.id).await?.into(),
        };
        Ok(fetched)
    }

    async fn star(&self, kind: ItemKind, id: i64) -> Result<&'static str> {
        let favorited = self.favorites.is_favorited(Some(kind), Some(id)).await?;
        Ok(if favorited { "*" } else { " " })
    }

    async fn print_characters(&self, list: &CharacterList) -> Result<()> {
        let snapshot = list.snapshot();
        for character in snapshot.items() {
            self.print_character(&character).await?;
        }
        print_footer(snapshot.items().len(), snapshot.total_count(), list.has_next_page());
        Ok(())
    }

    async fn print_episodes(&self, list: &EpisodeList) -> Result<()> {
        let snapshot = list.snapshot();
        for episode in snapshot.items() {
            self.print_episode(&episode).await?;
        }
        print_footer(snapshot.items().len(), snapshot.total_count(), list.has_next_page());
        Ok(())
    }

    async fn print_character(&self, character: &Character) -> Result<()> {
        println!(
            "{} {:>4}  {:<32} {:<8} {}",
            self.star(ItemKind::Character, character.id).await?,
            character.id,
            character.name,
            character.status.as_str(),
            character.species,
        );
        Ok(())
    }

    async fn print_episode(&self, episode: &Episode) -> Result<()> {
        println!(
            "{} {:>4}  {:<7} {:<36} {}",
            self.star(ItemKind::Episode, episode.id).await?,
            episode.id,
            episode.episode,
            episode.name,
            episode.air_date,
        );
        Ok(())
    }

    async fn print_favorites(&self, kind: Option<ItemKind>) -> Result<()> {
        let records = self.favorites.favorites(kind).await?;
        if records.is_empty() {
            println!("No favorites yet");
            return Ok(());
        }

        for record in records {
            let added = record
                .added_at
                .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();
            println!(
                "{:<9} {:>4}  {:<36} {added}",
                record.item_kind.as_str(),
                record.item_id,
                record.item.name(),
            );
        }
        Ok(())
    }

    async fn show(&self, item: &ItemArgs) -> Result<()> {
        match ItemKind::from(item.kind) {
            ItemKind::Character => {
                let character = self.client.character(item.id).await?;
                self.print_character(&character).await?;
                println!("      origin:   {}", character.origin.name);
                println!("      location: {}", character.location.name);

                let ids: Vec<i64> = character
                    .episode
                    .iter()
                    .filter_map(|url| id_from_url(url))
                    .collect();
                for episode in self.client.episodes_by_ids(&ids).await? {
                    self.print_episode(&episode).await?;
                }
            }
            ItemKind::Episode => {
                let episode = self.client.episode(item.id).await?;
                self.print_episode(&episode).await?;

                let ids: Vec<i64> = episode
                    .characters
                    .iter()
                    .filter_map(|url| id_from_url(url))
                    .collect();
                for character in self.client.characters_by_ids(&ids).await? {
                    self.print_character(&character).await?;
                }
            }
        }
        Ok(())
    }

    async fn theme(&self, mode: Option<ThemeArg>) -> Result<()> {
        let current = self.preferences.theme_or_default().await?;
        let Some(mode) = mode else {
            println!("{current}");
            return Ok(());
        };

        let next = mode.resolve(current);

        self.preferences.save_theme(next).await?;
        info!(theme = %next, "theme preference saved");
        println!("{next}");
        Ok(())
    }
}

/// Load pages until `pages` are loaded or the list ends.
async fn load_pages<S: PageSource>(list: &PagedQuery<S>, pages: u32) -> Result<()> {
    let wanted = usize::try_from(pages).unwrap_or(usize::MAX);
    while list.snapshot().pages.len() < wanted && list.has_next_page() {
        list.fetch_next_page().await?;
    }
    Ok(())
}

fn print_footer(shown: usize, total: Option<u64>, more: bool) {
    match total {
        Some(total) if more => println!("\n{shown} of {total} shown, use --pages for more"),
        Some(total) => println!("\n{shown} of {total} shown"),
        None => println!("\nNo matches"),
    }
}

/// Trailing numeric path segment of an entity URL.
fn id_from_url(url: &str) -> Option<i64> {
    url.trim_end_matches('/').rsplit('/').next()?.parse().ok()
}
