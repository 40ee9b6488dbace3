//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use time::{Date, Month, OffsetDateTime};
use uuid::Uuid;

use crate::domain::entities::{AuthorRecord, CategoryRecord, PostRecord, TagRecord};
use crate::domain::posts::{MonthCount, TagCount};
use crate::domain::types::Locale;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Which posts a caller may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostScope {
    /// Anonymous readers: only posts whose publication window contains `at`.
    Published { at: OffsetDateTime },
    /// Staff: every post regardless of its publication window.
    All,
}

impl PostScope {
    pub fn admits(&self, post: &PostRecord) -> bool {
        match self {
            PostScope::Published { at } => post.is_published_at(*at),
            PostScope::All => true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PostQueryFilter {
    pub locale: Option<Locale>,
    /// Author username.
    pub author: Option<String>,
    /// Tag slug.
    pub tag: Option<String>,
    /// Category slug.
    pub category: Option<String>,
    pub year: Option<i32>,
    pub month: Option<Month>,
    /// Tag slugs; a post matches when it carries any of them. Empty means no restriction.
    pub any_tags: Vec<String>,
    /// Author usernames; a post matches when written by any of them. Empty means no restriction.
    pub any_authors: Vec<String>,
    /// Keep at most this many posts after ordering.
    pub limit: Option<usize>,
}

impl PostQueryFilter {
    pub fn for_locale(locale: &Locale) -> Self {
        Self {
            locale: Some(locale.clone()),
            ..Default::default()
        }
    }

    pub fn matches(&self, post: &PostRecord) -> bool {
        if let Some(locale) = self.locale.as_ref()
            && !post.is_available_in(locale)
        {
            return false;
        }
        if let Some(username) = self.author.as_deref()
            && post.author.username != username
        {
            return false;
        }
        if let Some(slug) = self.tag.as_deref()
            && !post.tags.iter().any(|tag| tag.slug == slug)
        {
            return false;
        }
        if let Some(slug) = self.category.as_deref()
            && !post.categories.iter().any(|category| category.slug == slug)
        {
            return false;
        }

        if !self.any_tags.is_empty()
            && !post
                .tags
                .iter()
                .any(|tag| self.any_tags.iter().any(|slug| *slug == tag.slug))
        {
            return false;
        }
        if !self.any_authors.is_empty()
            && !self
                .any_authors
                .iter()
                .any(|username| *username == post.author.username)
        {
            return false;
        }

        let date = post.publication_date();
        if self.year.is_some_and(|year| date.year() != year) {
            return false;
        }
        if self.month.is_some_and(|month| date.month() != month) {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone)]
pub struct CreatePostParams {
    pub slug: String,
    pub title: String,
    pub language: Option<Locale>,
    pub lead_in: String,
    pub author_id: Uuid,
    pub tag_ids: Vec<Uuid>,
    pub category_ids: Vec<Uuid>,
    pub publication_start: OffsetDateTime,
    pub publication_end: Option<OffsetDateTime>,
}

#[derive(Debug, Clone)]
pub struct UpdatePostParams {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub language: Option<Locale>,
    pub lead_in: String,
    pub author_id: Uuid,
    pub tag_ids: Vec<Uuid>,
    pub category_ids: Vec<Uuid>,
    pub publication_start: OffsetDateTime,
    pub publication_end: Option<OffsetDateTime>,
}

#[derive(Debug, Clone)]
pub struct CreateAuthorParams {
    pub username: String,
    pub display_name: String,
}

/// Read-only query surface over stored posts.
#[async_trait]
pub trait PostsRepo: Send + Sync {
    /// Posts visible in `scope` that match `filter`, newest first, at most `filter.limit`.
    async fn list_posts(
        &self,
        scope: PostScope,
        filter: &PostQueryFilter,
    ) -> Result<Vec<PostRecord>, RepoError>;

    async fn find_post(
        &self,
        scope: PostScope,
        locale: &Locale,
        date: Date,
        slug: &str,
    ) -> Result<Option<PostRecord>, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError>;

    /// Whether a post other than `exclude` already uses `slug`.
    async fn slug_in_use(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool, RepoError>;

    async fn tag_counts(&self, scope: PostScope, locale: &Locale)
    -> Result<Vec<TagCount>, RepoError>;

    async fn month_counts(
        &self,
        scope: PostScope,
        locale: &Locale,
    ) -> Result<Vec<MonthCount>, RepoError>;

    /// Distinct categories of qualifying posts, by name.
    async fn categories(
        &self,
        scope: PostScope,
        locale: &Locale,
    ) -> Result<Vec<CategoryRecord>, RepoError>;

    /// Distinct authors of qualifying posts, by display name then username.
    async fn authors(&self, scope: PostScope, locale: &Locale)
    -> Result<Vec<AuthorRecord>, RepoError>;

    async fn find_tag_by_slug(&self, slug: &str) -> Result<Option<TagRecord>, RepoError>;

    async fn find_category_by_slug(&self, slug: &str)
    -> Result<Option<CategoryRecord>, RepoError>;

    async fn find_author_by_username(
        &self,
        username: &str,
    ) -> Result<Option<AuthorRecord>, RepoError>;
}

#[async_trait]
pub trait PostsWriteRepo: Send + Sync {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError>;

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError>;

    /// Removes the post and returns it as it was stored.
    async fn delete_post(&self, id: Uuid) -> Result<PostRecord, RepoError>;

    /// Removes every existing post in `ids`; unknown ids are ignored.
    async fn delete_posts(&self, ids: &[Uuid]) -> Result<Vec<PostRecord>, RepoError>;
}

/// Tags, categories and authors referenced by posts.
#[async_trait]
pub trait TaxonomyRepo: Send + Sync {
    /// Returns the tag named `name`, creating it with a unique slug when missing.
    async fn ensure_tag(&self, name: &str) -> Result<TagRecord, RepoError>;

    async fn create_category(&self, name: &str) -> Result<CategoryRecord, RepoError>;

    async fn create_author(&self, params: CreateAuthorParams) -> Result<AuthorRecord, RepoError>;
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn post() -> PostRecord {
        PostRecord {
            id: Uuid::new_v4(),
            slug: "hello".to_string(),
            title: "Hello".to_string(),
            language: Some(Locale::new("en").expect("locale")),
            lead_in: String::new(),
            author: AuthorRecord {
                id: Uuid::new_v4(),
                username: "ada".to_string(),
                display_name: "Ada".to_string(),
            },
            tags: vec![TagRecord {
                id: Uuid::new_v4(),
                slug: "rust".to_string(),
                name: "Rust".to_string(),
            }],
            categories: Vec::new(),
            publication_start: datetime!(2024-02-10 12:00 UTC),
            publication_end: Some(datetime!(2024-03-01 00:00 UTC)),
            created_at: datetime!(2024-02-10 12:00 UTC),
            updated_at: datetime!(2024-02-10 12:00 UTC),
        }
    }

    #[test]
    fn published_scope_respects_window() {
        let record = post();
        assert!(PostScope::Published {
            at: datetime!(2024-02-20 00:00 UTC)
        }
        .admits(&record));
        assert!(!PostScope::Published {
            at: datetime!(2024-03-02 00:00 UTC)
        }
        .admits(&record));
        assert!(PostScope::All.admits(&record));
    }

    #[test]
    fn filter_combines_every_criterion() {
        let record = post();
        let mut filter = PostQueryFilter::for_locale(&Locale::new("en").expect("locale"));
        filter.author = Some("ada".to_string());
        filter.tag = Some("rust".to_string());
        filter.year = Some(2024);
        filter.month = Some(Month::February);
        assert!(filter.matches(&record));

        filter.month = Some(Month::March);
        assert!(!filter.matches(&record));

        let other_locale = PostQueryFilter::for_locale(&Locale::new("de").expect("locale"));
        assert!(!other_locale.matches(&record));

        let missing_category = PostQueryFilter {
            category: Some("news".to_string()),
            ..Default::default()
        };
        assert!(!missing_category.matches(&record));
    }

    #[test]
    fn any_of_filters_match_a_single_member() {
        let record = post();
        let tagged = PostQueryFilter {
            any_tags: vec!["go".to_string(), "rust".to_string()],
            ..Default::default()
        };
        assert!(tagged.matches(&record));

        let by_others = PostQueryFilter {
            any_authors: vec!["grace".to_string(), "linus".to_string()],
            ..Default::default()
        };
        assert!(!by_others.matches(&record));
    }
}
