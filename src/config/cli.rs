use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

use crate::application::listing::DEFAULT_ENTRY_LIMIT;

/// Command-line arguments for the folio binary.
#[derive(Debug, Parser)]
#[command(name = "folio", version, about = "Blog navigation menus over a post fixture")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "FOLIO_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: SettingsOverrides,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Print the rendered navigation tree as JSON.
    Menus(MenusArgs),
    /// Print tag and month counts as JSON.
    Aggregates(RenderArgs),
    /// Print one page of the latest posts as JSON.
    Posts(PostsArgs),
    /// Print the newest published posts, optionally for chosen tags or authors.
    Entries(EntriesArgs),
}

/// Which posts to load and whose view of them to render.
#[derive(Debug, Args, Clone)]
pub struct RenderArgs {
    /// TOML file with the authors, categories and posts to load.
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub fixture: PathBuf,

    /// Locale to render for; defaults to `locales.default`.
    #[arg(long, value_name = "LOCALE")]
    pub locale: Option<String>,

    /// Include posts outside their publication window.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub privileged: bool,

    /// Instant used for the publication check (RFC 3339); defaults to now.
    #[arg(long, value_name = "TIMESTAMP")]
    pub at: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct MenusArgs {
    #[command(flatten)]
    pub render: RenderArgs,

    /// Render for breadcrumbs, keeping hidden nodes visible.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub breadcrumb: bool,

    /// Print the flat node list instead of the nested tree.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub flat: bool,
}

#[derive(Debug, Args, Clone)]
pub struct PostsArgs {
    #[command(flatten)]
    pub render: RenderArgs,

    /// 1-based page number; the page size comes from `listing.page_size`.
    #[arg(long, value_name = "N", default_value_t = 1)]
    pub page: usize,
}

#[derive(Debug, Args, Clone)]
pub struct EntriesArgs {
    #[command(flatten)]
    pub render: RenderArgs,

    /// Only posts carrying this tag slug (repeatable).
    #[arg(long = "tag", value_name = "SLUG")]
    pub tags: Vec<String>,

    /// Only posts by this username (repeatable).
    #[arg(long = "author", value_name = "USERNAME", conflicts_with = "tags")]
    pub authors: Vec<String>,

    /// Number of posts to print.
    #[arg(long, value_name = "N", default_value_t = DEFAULT_ENTRY_LIMIT)]
    pub count: usize,
}

#[derive(Debug, Args, Default, Clone)]
pub struct SettingsOverrides {
    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub log_json: Option<bool>,

    /// Override the menu order (comma separated names).
    #[arg(long = "menus", value_name = "NAMES", value_delimiter = ',', global = true)]
    pub menus: Option<Vec<String>>,

    /// Toggle the menu cache.
    #[arg(
        long = "cache-enabled",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub cache_enabled: Option<bool>,

    /// Override the path the blog is mounted under.
    #[arg(long = "listing-mount", value_name = "PATH", global = true)]
    pub listing_mount: Option<String>,
}
