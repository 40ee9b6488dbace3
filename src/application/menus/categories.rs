use std::sync::Arc;

use async_trait::async_trait;

use crate::application::links::{LinkResolver, Route};
use crate::application::repos::PostsRepo;
use crate::domain::navigation::{MenuKind, NavigationNode};

use super::{MenuBuilder, MenuContext, MenuError, child_node, root_node};

#[derive(Clone)]
pub struct CategoriesMenu {
    posts: Arc<dyn PostsRepo>,
    links: Arc<dyn LinkResolver>,
}

impl CategoriesMenu {
    pub fn new(posts: Arc<dyn PostsRepo>, links: Arc<dyn LinkResolver>) -> Self {
        Self { posts, links }
    }
}

#[async_trait]
impl MenuBuilder for CategoriesMenu {
    fn kind(&self) -> MenuKind {
        MenuKind::Categories
    }

    async fn build(&self, ctx: &MenuContext) -> Result<Vec<NavigationNode>, MenuError> {
        let categories = self.posts.categories(ctx.scope, &ctx.locale).await?;
        let root = root_node(MenuKind::Categories, ctx, self.links.as_ref());
        let root_id = root.id.clone();

        let mut nodes = Vec::with_capacity(categories.len() + 1);
        nodes.push(root);
        for category in categories {
            let route = Route::CategoryPosts {
                category: category.slug.clone(),
            };
            nodes.push(child_node(
                format!("category-{}", category.slug),
                category.name,
                &root_id,
                &route,
                ctx,
                self.links.as_ref(),
            ));
        }
        Ok(nodes)
    }
}
