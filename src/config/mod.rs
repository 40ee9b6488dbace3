//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

use std::{num::NonZeroUsize, str::FromStr};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::application::pagination::DEFAULT_PAGE_SIZE;
use crate::domain::navigation::MenuKind;
use crate::domain::types::Locale;

pub use cli::{CliArgs, Command, EntriesArgs, MenusArgs, PostsArgs, RenderArgs, SettingsOverrides};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "folio";
const DEFAULT_LOCALE: &str = "en";
const DEFAULT_CACHE_CAPACITY: usize = 64;
const DEFAULT_MOUNT: &str = "/blog/";

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub locales: LocaleSettings,
    pub menus: MenuSettings,
    pub cache: CacheSettings,
    pub listing: ListingSettings,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct LocaleSettings {
    pub default: Locale,
    /// Locales links can be built for; always contains `default`.
    pub available: Vec<Locale>,
}

/// Registered menus, in render order, and which of them are hidden outside breadcrumbs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuSettings {
    pub order: Vec<String>,
    pub hide_archive_menu: bool,
    pub hide_categories_menu: bool,
    pub hide_tags_menu: bool,
    pub hide_authors_menu: bool,
}

impl Default for MenuSettings {
    fn default() -> Self {
        Self {
            order: MenuKind::ALL
                .iter()
                .map(|kind| kind.key().to_string())
                .collect(),
            hide_archive_menu: false,
            hide_categories_menu: false,
            hide_tags_menu: false,
            hide_authors_menu: false,
        }
    }
}

impl MenuSettings {
    pub fn is_hidden(&self, kind: MenuKind) -> bool {
        match kind {
            MenuKind::Archive => self.hide_archive_menu,
            MenuKind::Categories => self.hide_categories_menu,
            MenuKind::Tags => self.hide_tags_menu,
            MenuKind::Authors => self.hide_authors_menu,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub enabled: bool,
    pub capacity: NonZeroUsize,
}

#[derive(Debug, Clone)]
pub struct ListingSettings {
    pub page_size: NonZeroUsize,
    /// Path segment(s) the blog is mounted under, e.g. `/blog/`.
    pub mount: String,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(
        Environment::with_prefix("FOLIO")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("locales.available")
            .with_list_parse_key("menus.order")
            .try_parsing(true),
    );

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(&cli.overrides);

    Settings::from_raw(raw)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    logging: RawLoggingSettings,
    locales: RawLocaleSettings,
    menus: RawMenuSettings,
    cache: RawCacheSettings,
    listing: RawListingSettings,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &SettingsOverrides) {
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(order) = overrides.menus.as_ref() {
            self.menus.order = Some(order.clone());
        }
        if let Some(enabled) = overrides.cache_enabled {
            self.cache.enabled = Some(enabled);
        }
        if let Some(mount) = overrides.listing_mount.as_ref() {
            self.listing.mount = Some(mount.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            logging,
            locales,
            menus,
            cache,
            listing,
        } = raw;

        Ok(Self {
            logging: build_logging_settings(logging)?,
            locales: build_locale_settings(locales)?,
            menus: build_menu_settings(menus),
            cache: build_cache_settings(cache)?,
            listing: build_listing_settings(listing)?,
        })
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_locale_settings(locales: RawLocaleSettings) -> Result<LocaleSettings, LoadError> {
    let default = Locale::new(locales.default.as_deref().unwrap_or(DEFAULT_LOCALE))
        .map_err(|err| LoadError::invalid("locales.default", err.to_string()))?;

    let mut available = Vec::new();
    for value in locales.available.unwrap_or_default() {
        if value.trim().is_empty() {
            continue;
        }
        let locale = Locale::new(&value)
            .map_err(|err| LoadError::invalid("locales.available", err.to_string()))?;
        if !available.contains(&locale) {
            available.push(locale);
        }
    }
    if !available.contains(&default) {
        available.insert(0, default.clone());
    }

    Ok(LocaleSettings { default, available })
}

fn build_menu_settings(menus: RawMenuSettings) -> MenuSettings {
    let defaults = MenuSettings::default();
    MenuSettings {
        order: menus.order.unwrap_or(defaults.order),
        hide_archive_menu: menus.hide_archive_menu.unwrap_or(false),
        hide_categories_menu: menus.hide_categories_menu.unwrap_or(false),
        hide_tags_menu: menus.hide_tags_menu.unwrap_or(false),
        hide_authors_menu: menus.hide_authors_menu.unwrap_or(false),
    }
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, LoadError> {
    let capacity = non_zero_usize(
        cache.capacity.unwrap_or(DEFAULT_CACHE_CAPACITY as u64),
        "cache.capacity",
    )?;
    Ok(CacheSettings {
        enabled: cache.enabled.unwrap_or(true),
        capacity,
    })
}

fn build_listing_settings(listing: RawListingSettings) -> Result<ListingSettings, LoadError> {
    let page_size = non_zero_usize(
        listing.page_size.unwrap_or(DEFAULT_PAGE_SIZE as u64),
        "listing.page_size",
    )?;

    let mount = listing
        .mount
        .map(|value| value.trim().to_string())
        .unwrap_or_else(|| DEFAULT_MOUNT.to_string());
    if mount.contains(['?', '#']) {
        return Err(LoadError::invalid(
            "listing.mount",
            "must be a plain path without query or fragment",
        ));
    }

    Ok(ListingSettings { page_size, mount })
}

fn non_zero_usize(value: u64, key: &'static str) -> Result<NonZeroUsize, LoadError> {
    let value: usize = value
        .try_into()
        .map_err(|_| LoadError::invalid(key, "value exceeds supported range for usize"))?;
    NonZeroUsize::new(value).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLocaleSettings {
    default: Option<String>,
    available: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawMenuSettings {
    order: Option<Vec<String>>,
    hide_archive_menu: Option<bool>,
    hide_categories_menu: Option<bool>,
    hide_tags_menu: Option<bool>,
    hide_authors_menu: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    enabled: Option<bool>,
    capacity: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawListingSettings {
    page_size: Option<u64>,
    mount: Option<String>,
}
