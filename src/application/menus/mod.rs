//! Blog menu builders.
//!
//! Each builder turns the current post store state into the nodes of one
//! menu: a root node followed by its descendants in traversal order. The
//! [`MenuRegistry`] decides which builders run and in what order.

mod archive;
mod authors;
mod categories;
mod registry;
mod tags;

use async_trait::async_trait;
use thiserror::Error;

use crate::application::links::{LinkResolver, Route, resolve_or_fallback};
use crate::application::repos::{PostScope, RepoError};
use crate::domain::navigation::{MenuKind, NavigationNode, NavigationTree, TreeError};
use crate::domain::slug::SlugError;
use crate::domain::types::Locale;

pub use archive::ArchiveMenu;
pub use authors::AuthorsMenu;
pub use categories::CategoriesMenu;
pub use registry::{MenuRegistry, RegisteredMenu, resolve_menu_name};
pub use tags::TagsMenu;

/// Inputs a builder may depend on for one render.
#[derive(Debug, Clone)]
pub struct MenuContext {
    pub locale: Locale,
    pub scope: PostScope,
    /// Copied onto every emitted node's `hidden` attribute.
    pub hidden: bool,
}

#[derive(Debug, Error)]
pub enum MenuError {
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error(transparent)]
    Slug(#[from] SlugError),
}

#[async_trait]
pub trait MenuBuilder: Send + Sync {
    fn kind(&self) -> MenuKind;

    /// Nodes of the menu, root first, parents before children.
    async fn build(&self, ctx: &MenuContext) -> Result<Vec<NavigationNode>, MenuError>;
}

/// Run `builder` and validate its output as a tree.
pub async fn build_tree(
    builder: &dyn MenuBuilder,
    ctx: &MenuContext,
) -> Result<NavigationTree, MenuError> {
    let nodes = builder.build(ctx).await?;
    Ok(NavigationTree::from_nodes(nodes)?)
}

fn root_node(kind: MenuKind, ctx: &MenuContext, links: &dyn LinkResolver) -> NavigationNode {
    NavigationNode::new(
        kind.root_id(),
        kind.root_label(),
        resolve_or_fallback(links, &ctx.locale, &Route::LatestPosts),
    )
    .with_hidden(ctx.hidden)
}

fn child_node(
    id: impl Into<String>,
    label: impl Into<String>,
    parent: &str,
    route: &Route,
    ctx: &MenuContext,
    links: &dyn LinkResolver,
) -> NavigationNode {
    NavigationNode::new(id, label, resolve_or_fallback(links, &ctx.locale, route))
        .with_parent(parent)
        .with_hidden(ctx.hidden)
}
