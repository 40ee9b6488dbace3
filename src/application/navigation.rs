//! Navigation rendering: registered menus, through the cache, merged into one tree.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::context::RequestContext;
use crate::application::error::AppError;
use crate::application::menus::{MenuContext, MenuError, MenuRegistry, RegisteredMenu, build_tree};
use crate::application::modifier::VisibilityModifier;
use crate::cache::{MenuCache, MenuCacheKey};
use crate::domain::navigation::{MenuKind, NavigationTree};

#[derive(Debug, Clone)]
pub struct RenderedNavigation {
    pub tree: NavigationTree,
    /// Menus whose builder failed and were left out of `tree`.
    pub failed: Vec<MenuKind>,
}

#[derive(Clone)]
pub struct NavigationService {
    registry: Arc<MenuRegistry>,
    cache: Arc<MenuCache>,
    modifier: VisibilityModifier,
}

impl NavigationService {
    pub fn new(registry: Arc<MenuRegistry>, cache: Arc<MenuCache>) -> Self {
        Self {
            registry,
            cache,
            modifier: VisibilityModifier,
        }
    }

    pub fn registry(&self) -> &MenuRegistry {
        &self.registry
    }

    /// Render every registered menu for `request`.
    ///
    /// A menu whose builder fails is skipped; the rest still render.
    pub async fn render(&self, request: &RequestContext) -> RenderedNavigation {
        let mut tree = NavigationTree::new();
        let mut failed = Vec::new();

        for menu in self.registry.menus() {
            match self.cached_tree(menu, request).await {
                Ok(menu_tree) => merge_into(&mut tree, &menu_tree, menu.kind()),
                Err(error) => {
                    warn!(
                        menu = menu.kind().key(),
                        locale = %request.locale,
                        error = %error,
                        "Menu build failed; skipping"
                    );
                    failed.push(menu.kind());
                }
            }
        }

        self.modifier.apply(&mut tree, request.breadcrumb);
        debug!(
            locale = %request.locale,
            nodes = tree.len(),
            failed = failed.len(),
            "Navigation rendered"
        );
        RenderedNavigation { tree, failed }
    }

    /// Render a single registered menu.
    pub async fn menu(
        &self,
        kind: MenuKind,
        request: &RequestContext,
    ) -> Result<NavigationTree, AppError> {
        let menu = self
            .registry
            .get(kind)
            .ok_or_else(|| AppError::not_found("menu"))?;
        let mut tree = self.cached_tree(menu, request).await?.as_ref().clone();
        self.modifier.apply(&mut tree, request.breadcrumb);
        Ok(tree)
    }

    async fn cached_tree(
        &self,
        menu: &RegisteredMenu,
        request: &RequestContext,
    ) -> Result<Arc<NavigationTree>, MenuError> {
        let key = MenuCacheKey::new(menu.kind(), request.locale.clone(), request.audience());
        let ctx = MenuContext {
            locale: request.locale.clone(),
            scope: request.scope(),
            hidden: menu.hidden,
        };
        self.cache
            .get_or_build(key, || build_tree(menu.builder.as_ref(), &ctx))
            .await
    }
}

/// Append `menu` to `tree`, dropping nodes whose id is already taken along
/// with their descendants.
fn merge_into(tree: &mut NavigationTree, menu: &NavigationTree, kind: MenuKind) {
    let mut dropped: HashSet<&str> = HashSet::new();

    for node in menu.nodes() {
        let orphaned = node
            .parent_id
            .as_deref()
            .is_some_and(|parent| dropped.contains(parent));
        if orphaned || tree.contains(&node.id) {
            warn!(
                menu = kind.key(),
                node_id = %node.id,
                "Navigation node id already used by an earlier menu; skipping"
            );
            dropped.insert(node.id.as_str());
            continue;
        }
        if let Err(error) = tree.push(node.clone()) {
            warn!(menu = kind.key(), error = %error, "Navigation node rejected during merge");
            dropped.insert(node.id.as_str());
        }
    }
}
