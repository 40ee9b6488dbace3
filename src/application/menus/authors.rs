use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::application::links::{LinkResolver, Route};
use crate::application::repos::PostsRepo;
use crate::domain::navigation::{MenuKind, NavigationNode};
use crate::domain::slug::SlugAllocator;

use super::{MenuBuilder, MenuContext, MenuError, child_node, root_node};

/// One node per author of a visible post.
///
/// Node ids come from the author's display name, so two "Ada Lovelace"
/// accounts become `author-ada-lovelace` and `author-ada-lovelace-2`.
/// Authors whose name and username both slugify to nothing fall back to
/// `author-<uuid>`.
#[derive(Clone)]
pub struct AuthorsMenu {
    posts: Arc<dyn PostsRepo>,
    links: Arc<dyn LinkResolver>,
}

impl AuthorsMenu {
    pub fn new(posts: Arc<dyn PostsRepo>, links: Arc<dyn LinkResolver>) -> Self {
        Self { posts, links }
    }
}

#[async_trait]
impl MenuBuilder for AuthorsMenu {
    fn kind(&self) -> MenuKind {
        MenuKind::Authors
    }

    async fn build(&self, ctx: &MenuContext) -> Result<Vec<NavigationNode>, MenuError> {
        let authors = self.posts.authors(ctx.scope, &ctx.locale).await?;
        let root = root_node(MenuKind::Authors, ctx, self.links.as_ref());
        let root_id = root.id.clone();

        let mut slugs = SlugAllocator::new();
        let mut nodes = Vec::with_capacity(authors.len() + 1);
        nodes.push(root);
        for author in authors {
            let slug = match slugs
                .allocate(author.label())
                .or_else(|_| slugs.allocate(&author.username))
            {
                Ok(slug) => slug,
                Err(error) => {
                    warn!(
                        author_id = %author.id,
                        username = %author.username,
                        error = %error,
                        "Author name has no slug; using the author id"
                    );
                    author.id.to_string()
                }
            };
            let route = Route::AuthorPosts {
                username: author.username.clone(),
            };
            nodes.push(child_node(
                format!("author-{slug}"),
                author.label(),
                &root_id,
                &route,
                ctx,
                self.links.as_ref(),
            ));
        }
        Ok(nodes)
    }
}
