//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use multiverse_api::{CharacterFilters, CharacterStatus, EpisodeFilters, Gender};
use multiverse_core::{ItemKind, ThemeMode};

#[derive(Debug, Parser)]
#[command(name = "multiverse")]
#[command(author, version, about = "Browse Rick and Morty characters and episodes, keep favorites offline", long_about = None)]
pub struct Cli {
    /// Favorites database file (overrides the config file)
    #[arg(long, global = true, env = "MULTIVERSE_DATABASE")]
    pub database: Option<PathBuf>,

    /// Run without local storage; favorites and preferences are not kept
    /// (takes precedence over --database)
    #[arg(long, global = true)]
    pub no_store: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List characters
    Characters {
        #[command(flatten)]
        filters: CharacterArgs,

        #[command(flatten)]
        paging: PagingArgs,
    },

    /// List episodes
    Episodes {
        #[command(flatten)]
        filters: EpisodeArgs,

        #[command(flatten)]
        paging: PagingArgs,
    },

    /// List saved favorites, most recent first
    Favorites {
        /// Only show one kind
        #[arg(short, long, value_enum)]
        kind: Option<KindArg>,
    },

    /// Show one character with its episodes, or one episode with its cast
    Show(ItemArgs),

    /// Favorite a character or episode
    Add(ItemArgs),

    /// Unfavorite a character or episode
    Remove(ItemArgs),

    /// Flip the favorite status of a character or episode
    Toggle(ItemArgs),

    /// Show whether a character or episode is a favorite
    Status(ItemArgs),

    /// Show or change the theme preference
    Theme {
        /// New theme; omit to show the current one
        #[arg(value_enum)]
        mode: Option<ThemeArg>,
    },
}

/// Reusable item key arguments
#[derive(Debug, Clone, Args)]
pub struct ItemArgs {
    /// Entity kind
    #[arg(value_enum)]
    pub kind: KindArg,

    /// Entity id
    pub id: i64,
}

/// How many pages to load
#[derive(Debug, Clone, Args)]
pub struct PagingArgs {
    /// Number of pages to load (stops early when the list ends)
    #[arg(short, long, default_value = "1")]
    pub pages: u32,
}

#[derive(Debug, Clone, Default, Args)]
pub struct CharacterArgs {
    /// Name substring
    #[arg(short, long)]
    pub name: Option<String>,

    /// Life status
    #[arg(short, long, value_enum)]
    pub status: Option<StatusArg>,

    /// Species
    #[arg(long)]
    pub species: Option<String>,

    /// Subspecies or type
    #[arg(long = "type")]
    pub kind: Option<String>,

    /// Gender
    #[arg(short, long, value_enum)]
    pub gender: Option<GenderArg>,
}

impl From<CharacterArgs> for CharacterFilters {
    fn from(args: CharacterArgs) -> Self {
        Self {
            name: args.name,
            status: args.status.map(Into::into),
            species: args.species,
            kind: args.kind,
            gender: args.gender.map(Into::into),
        }
        .normalized()
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct EpisodeArgs {
    /// Title substring
    #[arg(short, long)]
    pub name: Option<String>,

    /// Episode code or prefix, e.g. S01 or S02E03
    #[arg(short, long)]
    pub code: Option<String>,
}

impl From<EpisodeArgs> for EpisodeFilters {
    fn from(args: EpisodeArgs) -> Self {
        Self {
            name: args.name,
            episode: args.code,
        }
        .normalized()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Character,
    Episode,
}

impl From<KindArg> for ItemKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Character => Self::Character,
            KindArg::Episode => Self::Episode,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    Alive,
    Dead,
    Unknown,
}

impl From<StatusArg> for CharacterStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Alive => Self::Alive,
            StatusArg::Dead => Self::Dead,
            StatusArg::Unknown => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GenderArg {
    Female,
    Male,
    Genderless,
    Unknown,
}

impl From<GenderArg> for Gender {
    fn from(gender: GenderArg) -> Self {
        match gender {
            GenderArg::Female => Self::Female,
            GenderArg::Male => Self::Male,
            GenderArg::Genderless => Self::Genderless,
            GenderArg::Unknown => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeArg {
    Light,
    Dark,
    /// Switch to the other mode
    Toggle,
}

impl ThemeArg {
    /// The mode to save, given the one currently in effect.
    pub const fn resolve(self, current: ThemeMode) -> ThemeMode {
        match self {
            Self::Light => ThemeMode::Light,
            Self::Dark => ThemeMode::Dark,
            Self::Toggle => current.toggled(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_character_filters_from_args() {
        let cli = Cli::try_parse_from([
            "multiverse",
            "characters",
            "--name",
            "rick",
            "--status",
            "dead",
            "--type",
            "Parasite",
            "--pages",
            "3",
        ])
        .unwrap();

        let Command::Characters { filters, paging } = cli.command else {
            panic!("expected characters command");
        };
        assert_eq!(paging.pages, 3);
        assert_eq!(
            CharacterFilters::from(filters),
            CharacterFilters::new()
                .with_name("rick")
                .with_status(CharacterStatus::Dead)
                .with_kind("Parasite")
        );
    }

    #[test]
    fn test_no_store_accepted_with_database() {
        let cli = Cli::try_parse_from([
            "multiverse",
            "--no-store",
            "--database",
            "favs.db",
            "favorites",
        ])
        .unwrap();
        assert!(cli.no_store);
        assert_eq!(cli.database, Some(PathBuf::from("favs.db")));
    }

    #[test]
    fn test_empty_filter_args_are_unset() {
        let cli = Cli::try_parse_from(["multiverse", "characters", "--name", ""]).unwrap();
        let Command::Characters { filters, .. } = cli.command else {
            panic!("expected characters command");
        };
        assert_eq!(CharacterFilters::from(filters), CharacterFilters::new());

        let cli = Cli::try_parse_from(["multiverse", "episodes", "--code", ""]).unwrap();
        let Command::Episodes { filters, .. } = cli.command else {
            panic!("expected episodes command");
        };
        assert_eq!(EpisodeFilters::from(filters), EpisodeFilters::new());
    }

    #[test]
    fn test_theme_arg_resolve() {
        assert_eq!(ThemeArg::Light.resolve(ThemeMode::Dark), ThemeMode::Light);
        assert_eq!(ThemeArg::Toggle.resolve(ThemeMode::Dark), ThemeMode::Light);
        assert_eq!(ThemeArg::Toggle.resolve(ThemeMode::Light), ThemeMode::Dark);
    }

    #[test]
    fn test_item_args() {
        let cli = Cli::try_parse_from(["multiverse", "add", "episode", "28"]).unwrap();
        let Command::Add(item) = cli.command else {
            panic!("expected add command");
        };
        assert_eq!(ItemKind::from(item.kind), ItemKind::Episode);
        assert_eq!(item.id, 28);
    }
}
