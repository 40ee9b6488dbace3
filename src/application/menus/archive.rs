use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::application::links::{LinkResolver, Route};
use crate::application::repos::{PostQueryFilter, PostsRepo};
use crate::domain::navigation::{MenuKind, NavigationNode};

use super::{MenuBuilder, MenuContext, MenuError, child_node, root_node};

/// Year / month / day / post hierarchy over visible posts, newest first.
///
/// Node ids are derived from the publication date (`year-2024`,
/// `month-2024-02`, `day-2024-02-10`) and the post id, so rebuilding from the
/// same posts yields the same tree.
#[derive(Clone)]
pub struct ArchiveMenu {
    posts: Arc<dyn PostsRepo>,
    links: Arc<dyn LinkResolver>,
}

impl ArchiveMenu {
    pub fn new(posts: Arc<dyn PostsRepo>, links: Arc<dyn LinkResolver>) -> Self {
        Self { posts, links }
    }
}

#[async_trait]
impl MenuBuilder for ArchiveMenu {
    fn kind(&self) -> MenuKind {
        MenuKind::Archive
    }

    async fn build(&self, ctx: &MenuContext) -> Result<Vec<NavigationNode>, MenuError> {
        let posts = self
            .posts
            .list_posts(ctx.scope, &PostQueryFilter::for_locale(&ctx.locale))
            .await?;
        let links = self.links.as_ref();

        let root = root_node(MenuKind::Archive, ctx, links);
        let root_id = root.id.clone();
        let mut nodes = vec![root];
        let mut emitted: HashSet<String> = HashSet::new();

        for post in &posts {
            let date = post.publication_date();
            let (year, month, day) = (date.year(), date.month(), date.day());
            let month_number = u8::from(month);

            let year_id = format!("year-{year:04}");
            let month_id = format!("month-{year:04}-{month_number:02}");
            let day_id = format!("day-{year:04}-{month_number:02}-{day:02}");
            let month_route = Route::ArchiveMonth { year, month };

            if emitted.insert(year_id.clone()) {
                nodes.push(child_node(
                    year_id.clone(),
                    year.to_string(),
                    &root_id,
                    &Route::ArchiveYear { year },
                    ctx,
                    links,
                ));
            }
            if emitted.insert(month_id.clone()) {
                nodes.push(child_node(
                    month_id.clone(),
                    month.to_string(),
                    &year_id,
                    &month_route,
                    ctx,
                    links,
                ));
            }
            // There is no per-day listing; day nodes open their month.
            if emitted.insert(day_id.clone()) {
                nodes.push(child_node(
                    day_id.clone(),
                    day.to_string(),
                    &month_id,
                    &month_route,
                    ctx,
                    links,
                ));
            }

            nodes.push(child_node(
                post.id.to_string(),
                post.title.clone(),
                &day_id,
                &Route::post_detail(post),
                ctx,
                links,
            ));
        }

        Ok(nodes)
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;
    use crate::application::menus::build_tree;
    use crate::application::repos::PostScope;
    use crate::application::testing::{PostSeed, StoreFixture};

    async fn fixture() -> StoreFixture {
        let fixture = StoreFixture::new().await;
        fixture
            .seed(PostSeed::new("A", datetime!(2024-01-15 10:00 UTC)))
            .await;
        fixture
            .seed(PostSeed::new("B", datetime!(2024-02-10 10:00 UTC)))
            .await;
        fixture
            .seed(PostSeed::new("C", datetime!(2024-02-10 18:00 UTC)))
            .await;
        fixture
            .seed(PostSeed::new("Old", datetime!(2023-12-31 23:00 UTC)))
            .await;
        fixture
    }

    #[tokio::test]
    async fn groups_posts_by_year_month_and_day() {
        let fixture = fixture().await;
        let menu = ArchiveMenu::new(fixture.posts(), fixture.links());
        let tree = build_tree(&menu, &fixture.context(PostScope::All, false))
            .await
            .expect("archive tree");

        let structural: Vec<(&str, Option<&str>)> = tree
            .edges()
            .into_iter()
            .filter(|(id, _)| id.parse::<uuid::Uuid>().is_err())
            .collect();
        assert_eq!(
            structural,
            vec![
                ("blog-archive", None),
                ("year-2024", Some("blog-archive")),
                ("month-2024-02", Some("year-2024")),
                ("day-2024-02-10", Some("month-2024-02")),
                ("month-2024-01", Some("year-2024")),
                ("day-2024-01-15", Some("month-2024-01")),
                ("year-2023", Some("blog-archive")),
                ("month-2023-12", Some("year-2023")),
                ("day-2023-12-31", Some("month-2023-12")),
            ]
        );

        let leaves: Vec<&str> = tree
            .children("day-2024-02-10")
            .map(|node| node.label.as_str())
            .collect();
        assert_eq!(leaves, vec!["C", "B"]);
        assert_eq!(
            tree.get("month-2024-02").map(|node| node.label.as_str()),
            Some("February")
        );
        assert_eq!(
            tree.get("month-2024-02").map(|node| node.link.as_str()),
            Some("/en/blog/2024/02/")
        );
        assert_eq!(
            tree.get("blog-archive").map(|node| node.link.as_str()),
            Some("/en/blog/")
        );
    }

    #[tokio::test]
    async fn rebuilding_yields_identical_edges() {
        let fixture = fixture().await;
        let menu = ArchiveMenu::new(fixture.posts(), fixture.links());
        let ctx = fixture.context(PostScope::All, false);

        let first = build_tree(&menu, &ctx).await.expect("first build");
        let second = build_tree(&menu, &ctx).await.expect("second build");
        assert_eq!(first.edges(), second.edges());
    }

    #[tokio::test]
    async fn post_leaves_link_to_detail_pages() {
        let fixture = StoreFixture::new().await;
        let post = fixture
            .seed(PostSeed::new("Hello World", datetime!(2024-01-05 08:00 UTC)))
            .await;
        let menu = ArchiveMenu::new(fixture.posts(), fixture.links());

        let tree = build_tree(&menu, &fixture.context(PostScope::All, false))
            .await
            .expect("archive tree");
        let leaf = tree.get(&post.id.to_string()).expect("post leaf");
        assert_eq!(leaf.link, "/en/blog/2024/01/05/hello-world/");
        assert_eq!(leaf.parent_id.as_deref(), Some("day-2024-01-05"));
    }
}
