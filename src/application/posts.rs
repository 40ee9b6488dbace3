//! Post write path. Every successful write invalidates cached navigation
//! before returning.

use std::sync::Arc;

use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::application::error::AppError;
use crate::application::repos::{
    CreatePostParams, PostsRepo, PostsWriteRepo, RepoError, TaxonomyRepo, UpdatePostParams,
};
use crate::cache::CacheTrigger;
use crate::domain::entities::PostRecord;
use crate::domain::slug::generate_unique_slug_async;
use crate::domain::types::Locale;

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    /// Derived from the title when absent or blank.
    pub slug: Option<String>,
    pub language: Option<Locale>,
    pub lead_in: String,
    pub author_id: Uuid,
    /// Tag names; missing tags are created.
    pub tags: Vec<String>,
    pub category_ids: Vec<Uuid>,
    pub publication_start: OffsetDateTime,
    pub publication_end: Option<OffsetDateTime>,
}

#[derive(Debug, Clone)]
pub struct PostUpdate {
    pub id: Uuid,
    /// A blank slug is re-derived from the title.
    pub slug: String,
    pub title: String,
    pub language: Option<Locale>,
    pub lead_in: String,
    pub author_id: Uuid,
    pub tags: Vec<String>,
    pub category_ids: Vec<Uuid>,
    pub publication_start: OffsetDateTime,
    pub publication_end: Option<OffsetDateTime>,
}

#[derive(Clone)]
pub struct PostWriteService {
    reader: Arc<dyn PostsRepo>,
    writer: Arc<dyn PostsWriteRepo>,
    taxonomy: Arc<dyn TaxonomyRepo>,
    trigger: Arc<CacheTrigger>,
}

impl PostWriteService {
    pub fn new(
        reader: Arc<dyn PostsRepo>,
        writer: Arc<dyn PostsWriteRepo>,
        taxonomy: Arc<dyn TaxonomyRepo>,
        trigger: Arc<CacheTrigger>,
    ) -> Self {
        Self {
            reader,
            writer,
            taxonomy,
            trigger,
        }
    }

    pub async fn create(&self, post: NewPost) -> Result<PostRecord, AppError> {
        ensure_non_empty(&post.title, "title")?;
        ensure_window(post.publication_start, post.publication_end)?;

        let slug = match post.slug.as_deref().map(str::trim) {
            Some(explicit) if !explicit.is_empty() => explicit.to_string(),
            _ => self.unique_slug(&post.title, None).await?,
        };
        let tag_ids = self.resolve_tags(&post.tags).await?;

        let record = self
            .writer
            .create_post(CreatePostParams {
                slug,
                title: post.title.trim().to_string(),
                language: post.language,
                lead_in: post.lead_in,
                author_id: post.author_id,
                tag_ids,
                category_ids: post.category_ids,
                publication_start: post.publication_start,
                publication_end: post.publication_end,
            })
            .await?;

        info!(post_id = %record.id, slug = %record.slug, "Post created");
        self.trigger.post_created(record.id, &record.slug);
        Ok(record)
    }

    pub async fn update(&self, post: PostUpdate) -> Result<PostRecord, AppError> {
        ensure_non_empty(&post.title, "title")?;
        ensure_window(post.publication_start, post.publication_end)?;

        let slug = match post.slug.trim() {
            "" => self.unique_slug(&post.title, Some(post.id)).await?,
            explicit => explicit.to_string(),
        };
        let tag_ids = self.resolve_tags(&post.tags).await?;

        let record = self
            .writer
            .update_post(UpdatePostParams {
                id: post.id,
                slug,
                title: post.title.trim().to_string(),
                language: post.language,
                lead_in: post.lead_in,
                author_id: post.author_id,
                tag_ids,
                category_ids: post.category_ids,
                publication_start: post.publication_start,
                publication_end: post.publication_end,
            })
            .await
            .map_err(post_error)?;

        info!(post_id = %record.id, slug = %record.slug, "Post updated");
        self.trigger.post_updated(record.id, &record.slug);
        Ok(record)
    }

    pub async fn delete(&self, id: Uuid) -> Result<PostRecord, AppError> {
        let record = self.writer.delete_post(id).await.map_err(post_error)?;

        info!(post_id = %record.id, slug = %record.slug, "Post deleted");
        self.trigger.post_deleted(record.id, &record.slug);
        Ok(record)
    }

    /// Delete the existing posts among `ids` and return how many were removed.
    pub async fn bulk_delete(&self, ids: &[Uuid]) -> Result<usize, AppError> {
        let removed = self.writer.delete_posts(ids).await?;
        if removed.is_empty() {
            return Ok(0);
        }

        info!(requested = ids.len(), removed = removed.len(), "Posts deleted");
        self.trigger
            .posts_bulk_deleted(removed.iter().map(|post| post.id).collect());
        Ok(removed.len())
    }

    async fn unique_slug(&self, title: &str, exclude: Option<Uuid>) -> Result<String, AppError> {
        let reader = self.reader.clone();
        let slug = generate_unique_slug_async(title, move |candidate| {
            let reader = reader.clone();
            let candidate = candidate.to_string();
            async move {
                reader
                    .slug_in_use(&candidate, exclude)
                    .await
                    .map(|in_use| !in_use)
            }
        })
        .await?;
        Ok(slug)
    }

    async fn resolve_tags(&self, names: &[String]) -> Result<Vec<Uuid>, AppError> {
        let mut ids = Vec::with_capacity(names.len());
        for name in names.iter().filter(|name| !name.trim().is_empty()) {
            ids.push(self.taxonomy.ensure_tag(name).await?.id);
        }
        Ok(ids)
    }
}

fn post_error(error: RepoError) -> AppError {
    match error {
        RepoError::NotFound => AppError::not_found("post"),
        other => other.into(),
    }
}

fn ensure_non_empty(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    Ok(())
}

fn ensure_window(start: OffsetDateTime, end: Option<OffsetDateTime>) -> Result<(), AppError> {
    if end.is_some_and(|end| end < start) {
        return Err(AppError::validation(
            "publication end must not precede publication start",
        ));
    }
    Ok(())
}
