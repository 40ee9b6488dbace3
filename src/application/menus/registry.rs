//! Explicit mapping from configured menu names to builders.

use std::sync::Arc;

use tracing::{info, warn};

use crate::application::links::LinkResolver;
use crate::application::repos::PostsRepo;
use crate::config::MenuSettings;
use crate::domain::navigation::MenuKind;

use super::{ArchiveMenu, AuthorsMenu, CategoriesMenu, MenuBuilder, TagsMenu};

#[derive(Clone)]
pub struct RegisteredMenu {
    pub builder: Arc<dyn MenuBuilder>,
    pub hidden: bool,
}

impl RegisteredMenu {
    pub fn kind(&self) -> MenuKind {
        self.builder.kind()
    }
}

/// Registered menus in render order; each kind appears at most once.
#[derive(Clone, Default)]
pub struct MenuRegistry {
    menus: Vec<RegisteredMenu>,
}

impl MenuRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry described by `settings.order`.
    ///
    /// Names that resolve to no menu, and repeats of an already registered
    /// menu, are logged and skipped.
    pub fn from_settings(
        settings: &MenuSettings,
        posts: Arc<dyn PostsRepo>,
        links: Arc<dyn LinkResolver>,
    ) -> Self {
        let mut registry = Self::new();

        for name in &settings.order {
            let Some(kind) = resolve_menu_name(name) else {
                warn!(menu = %name, "Unknown menu in configuration; skipping");
                continue;
            };
            let builder = builder_for(kind, posts.clone(), links.clone());
            registry.register(builder, settings.is_hidden(kind));
        }

        info!(
            menus = ?registry.kinds().iter().map(|kind| kind.key()).collect::<Vec<_>>(),
            "Menu registry ready"
        );
        registry
    }

    /// Append `builder`; returns `false` when its kind is already registered.
    pub fn register(&mut self, builder: Arc<dyn MenuBuilder>, hidden: bool) -> bool {
        let kind = builder.kind();
        if self.get(kind).is_some() {
            warn!(menu = kind.key(), "Menu registered twice; keeping the first");
            return false;
        }
        self.menus.push(RegisteredMenu { builder, hidden });
        true
    }

    pub fn get(&self, kind: MenuKind) -> Option<&RegisteredMenu> {
        self.menus.iter().find(|menu| menu.kind() == kind)
    }

    pub fn menus(&self) -> &[RegisteredMenu] {
        &self.menus
    }

    pub fn kinds(&self) -> Vec<MenuKind> {
        self.menus.iter().map(RegisteredMenu::kind).collect()
    }

    pub fn len(&self) -> usize {
        self.menus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.menus.is_empty()
    }
}

/// Resolve a configured menu name.
///
/// Accepts the short key (`tags`), the display name (`Blog Tags Menu`) or a
/// dotted path ending in the class-style name (`blog.menu.BlogTagsMenu`),
/// all case-insensitively.
pub fn resolve_menu_name(name: &str) -> Option<MenuKind> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return None;
    }
    let last = trimmed.rsplit('.').next().unwrap_or(trimmed).trim();

    MenuKind::ALL.into_iter().find(|kind| {
        [kind.key(), kind.display_name(), kind.class_name()]
            .iter()
            .any(|candidate| {
                candidate.eq_ignore_ascii_case(last) || candidate.eq_ignore_ascii_case(trimmed)
            })
    })
}

fn builder_for(
    kind: MenuKind,
    posts: Arc<dyn PostsRepo>,
    links: Arc<dyn LinkResolver>,
) -> Arc<dyn MenuBuilder> {
    match kind {
        MenuKind::Tags => Arc::new(TagsMenu::new(posts, links)),
        MenuKind::Archive => Arc::new(ArchiveMenu::new(posts, links)),
        MenuKind::Categories => Arc::new(CategoriesMenu::new(posts, links)),
        MenuKind::Authors => Arc::new(AuthorsMenu::new(posts, links)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::StoreFixture;

    #[test]
    fn resolves_keys_display_names_and_class_paths() {
        assert_eq!(resolve_menu_name("tags"), Some(MenuKind::Tags));
        assert_eq!(resolve_menu_name(" Archive "), Some(MenuKind::Archive));
        assert_eq!(
            resolve_menu_name("Blog Categories Menu"),
            Some(MenuKind::Categories)
        );
        assert_eq!(
            resolve_menu_name("aldryn_blog.menu.BlogAuthorsMenu"),
            Some(MenuKind::Authors)
        );
        assert_eq!(resolve_menu_name("blog.menu.BlogEntriesMenu"), None);
        assert_eq!(resolve_menu_name(""), None);
    }

    #[tokio::test]
    async fn unknown_and_duplicate_names_are_skipped() {
        let fixture = StoreFixture::new().await;
        let settings = MenuSettings {
            order: vec![
                "tags".to_string(),
                "no-such-menu".to_string(),
                "BlogTagsMenu".to_string(),
                "archive".to_string(),
            ],
            hide_archive_menu: true,
            ..MenuSettings::default()
        };

        let registry = MenuRegistry::from_settings(&settings, fixture.posts(), fixture.links());

        assert_eq!(registry.kinds(), vec![MenuKind::Tags, MenuKind::Archive]);
        assert!(!registry.get(MenuKind::Tags).expect("tags").hidden);
        assert!(registry.get(MenuKind::Archive).expect("archive").hidden);
        assert!(registry.get(MenuKind::Authors).is_none());
    }

    #[tokio::test]
    async fn default_settings_register_every_menu() {
        let fixture = StoreFixture::new().await;
        let registry =
            MenuRegistry::from_settings(&MenuSettings::default(), fixture.posts(), fixture.links());
        assert_eq!(registry.kinds(), MenuKind::ALL.to_vec());
    }
}
