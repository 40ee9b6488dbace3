use std::collections::BTreeMap;

use async_trait::async_trait;
use time::Date;
use uuid::Uuid;

use crate::application::repos::{PostQueryFilter, PostScope, PostsRepo, RepoError};
use crate::domain::entities::{AuthorRecord, CategoryRecord, PostRecord, TagRecord};
use crate::domain::posts::{MonthCount, TagCount, aggregate_months, aggregate_tags};
use crate::domain::types::Locale;
use crate::util::lock::rw_read;

use super::{InMemoryPostStore, SOURCE};

#[async_trait]
impl PostsRepo for InMemoryPostStore {
    async fn list_posts(
        &self,
        scope: PostScope,
        filter: &PostQueryFilter,
    ) -> Result<Vec<PostRecord>, RepoError> {
        rw_read(&self.state, SOURCE, "list_posts").visible(scope, filter)
    }

    async fn find_post(
        &self,
        scope: PostScope,
        locale: &Locale,
        date: Date,
        slug: &str,
    ) -> Result<Option<PostRecord>, RepoError> {
        let filter = PostQueryFilter {
            year: Some(date.year()),
            month: Some(date.month()),
            ..PostQueryFilter::for_locale(locale)
        };
        let posts = rw_read(&self.state, SOURCE, "find_post").visible(scope, &filter)?;
        Ok(posts
            .into_iter()
            .find(|post| post.slug == slug && post.publication_date() == date))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError> {
        let state = rw_read(&self.state, SOURCE, "find_by_id");
        state
            .posts
            .get(&id)
            .map(|stored| state.hydrate(stored))
            .transpose()
    }

    async fn slug_in_use(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool, RepoError> {
        Ok(rw_read(&self.state, SOURCE, "slug_in_use").slug_taken(slug, exclude))
    }

    async fn tag_counts(
        &self,
        scope: PostScope,
        locale: &Locale,
    ) -> Result<Vec<TagCount>, RepoError> {
        let posts = rw_read(&self.state, SOURCE, "tag_counts")
            .visible(scope, &PostQueryFilter::for_locale(locale))?;
        Ok(aggregate_tags(&posts))
    }

    async fn month_counts(
        &self,
        scope: PostScope,
        locale: &Locale,
    ) -> Result<Vec<MonthCount>, RepoError> {
        let posts = rw_read(&self.state, SOURCE, "month_counts")
            .visible(scope, &PostQueryFilter::for_locale(locale))?;
        Ok(aggregate_months(&posts))
    }

    async fn categories(
        &self,
        scope: PostScope,
        locale: &Locale,
    ) -> Result<Vec<CategoryRecord>, RepoError> {
        let posts = rw_read(&self.state, SOURCE, "categories")
            .visible(scope, &PostQueryFilter::for_locale(locale))?;

        let mut distinct: BTreeMap<(String, String), CategoryRecord> = BTreeMap::new();
        for category in posts.into_iter().flat_map(|post| post.categories) {
            distinct
                .entry((category.name.clone(), category.slug.clone()))
                .or_insert(category);
        }
        Ok(distinct.into_values().collect())
    }

    async fn authors(
        &self,
        scope: PostScope,
        locale: &Locale,
    ) -> Result<Vec<AuthorRecord>, RepoError> {
        let posts = rw_read(&self.state, SOURCE, "authors")
            .visible(scope, &PostQueryFilter::for_locale(locale))?;

        let mut distinct: BTreeMap<(String, String), AuthorRecord> = BTreeMap::new();
        for post in posts {
            distinct
                .entry((post.author.label().to_string(), post.author.username.clone()))
                .or_insert(post.author);
        }
        Ok(distinct.into_values().collect())
    }

    async fn find_tag_by_slug(&self, slug: &str) -> Result<Option<TagRecord>, RepoError> {
        Ok(rw_read(&self.state, SOURCE, "find_tag_by_slug")
            .tags
            .values()
            .find(|tag| tag.slug == slug)
            .cloned())
    }

    async fn find_category_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<CategoryRecord>, RepoError> {
        Ok(rw_read(&self.state, SOURCE, "find_category_by_slug")
            .categories
            .values()
            .find(|category| category.slug == slug)
            .cloned())
    }

    async fn find_author_by_username(
        &self,
        username: &str,
    ) -> Result<Option<AuthorRecord>, RepoError> {
        Ok(rw_read(&self.state, SOURCE, "find_author_by_username")
            .authors
            .values()
            .find(|author| author.username == username)
            .cloned())
    }
}
