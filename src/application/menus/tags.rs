use std::sync::Arc;

use async_trait::async_trait;

use crate::application::links::{LinkResolver, Route};
use crate::application::repos::PostsRepo;
use crate::domain::navigation::{MenuKind, NavigationNode};

use super::{MenuBuilder, MenuContext, MenuError, child_node, root_node};

/// One node per tag in use, most used first.
#[derive(Clone)]
pub struct TagsMenu {
    posts: Arc<dyn PostsRepo>,
    links: Arc<dyn LinkResolver>,
}

impl TagsMenu {
    pub fn new(posts: Arc<dyn PostsRepo>, links: Arc<dyn LinkResolver>) -> Self {
        Self { posts, links }
    }
}

#[async_trait]
impl MenuBuilder for TagsMenu {
    fn kind(&self) -> MenuKind {
        MenuKind::Tags
    }

    async fn build(&self, ctx: &MenuContext) -> Result<Vec<NavigationNode>, MenuError> {
        let counts = self.posts.tag_counts(ctx.scope, &ctx.locale).await?;
        let root = root_node(MenuKind::Tags, ctx, self.links.as_ref());
        let root_id = root.id.clone();

        let mut nodes = Vec::with_capacity(counts.len() + 1);
        nodes.push(root);
        for entry in counts {
            let route = Route::TaggedPosts {
                tag: entry.tag.slug.clone(),
            };
            nodes.push(child_node(
                entry.tag.id.to_string(),
                entry.tag.name,
                &root_id,
                &route,
                ctx,
                self.links.as_ref(),
            ));
        }
        Ok(nodes)
    }
}
