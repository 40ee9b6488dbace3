use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{CreatePostParams, PostsWriteRepo, RepoError, UpdatePostParams};
use crate::domain::entities::PostRecord;
use crate::util::lock::rw_write;

use super::{InMemoryPostStore, SOURCE, StoredPost, dedup_ids};

const SLUG_CONSTRAINT: &str = "posts_slug_key";

fn ensure_slug(slug: &str) -> Result<(), RepoError> {
    if slug.trim().is_empty() {
        return Err(RepoError::InvalidInput {
            message: "slug must not be empty".to_string(),
        });
    }
    Ok(())
}

#[async_trait]
impl PostsWriteRepo for InMemoryPostStore {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        ensure_slug(&params.slug)?;
        let mut state = rw_write(&self.state, SOURCE, "create_post");

        if state.slug_taken(&params.slug, None) {
            return Err(RepoError::Duplicate {
                constraint: SLUG_CONSTRAINT.to_string(),
            });
        }
        let tag_ids = dedup_ids(params.tag_ids);
        let category_ids = dedup_ids(params.category_ids);
        state.check_references(params.author_id, &tag_ids, &category_ids)?;

        let now = OffsetDateTime::now_utc();
        let stored = StoredPost {
            id: Uuid::new_v4(),
            slug: params.slug,
            title: params.title,
            language: params.language,
            lead_in: params.lead_in,
            author_id: params.author_id,
            tag_ids,
            category_ids,
            publication_start: params.publication_start,
            publication_end: params.publication_end,
            created_at: now,
            updated_at: now,
        };
        let record = state.hydrate(&stored)?;
        state.posts.insert(stored.id, stored);
        Ok(record)
    }

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError> {
        ensure_slug(&params.slug)?;
        let mut state = rw_write(&self.state, SOURCE, "update_post");

        let created_at = state
            .posts
            .get(&params.id)
            .map(|existing| existing.created_at)
            .ok_or(RepoError::NotFound)?;
        if state.slug_taken(&params.slug, Some(params.id)) {
            return Err(RepoError::Duplicate {
                constraint: SLUG_CONSTRAINT.to_string(),
            });
        }
        let tag_ids = dedup_ids(params.tag_ids);
        let category_ids = dedup_ids(params.category_ids);
        state.check_references(params.author_id, &tag_ids, &category_ids)?;

        let stored = StoredPost {
            id: params.id,
            slug: params.slug,
            title: params.title,
            language: params.language,
            lead_in: params.lead_in,
            author_id: params.author_id,
            tag_ids,
            category_ids,
            publication_start: params.publication_start,
            publication_end: params.publication_end,
            created_at,
            updated_at: OffsetDateTime::now_utc(),
        };
        let record = state.hydrate(&stored)?;
        state.posts.insert(stored.id, stored);
        Ok(record)
    }

    async fn delete_post(&self, id: Uuid) -> Result<PostRecord, RepoError> {
        let mut state = rw_write(&self.state, SOURCE, "delete_post");
        let record = match state.posts.get(&id) {
            Some(stored) => state.hydrate(stored)?,
            None => return Err(RepoError::NotFound),
        };
        state.posts.remove(&id);
        Ok(record)
    }

    async fn delete_posts(&self, ids: &[Uuid]) -> Result<Vec<PostRecord>, RepoError> {
        let mut state = rw_write(&self.state, SOURCE, "delete_posts");

        let mut removed = Vec::new();
        for id in dedup_ids(ids.to_vec()) {
            let Some(stored) = state.posts.get(&id) else {
                continue;
            };
            removed.push(state.hydrate(stored)?);
        }
        for record in &removed {
            state.posts.remove(&record.id);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;
    use crate::application::repos::{PostsRepo, TaxonomyRepo};
    use crate::application::testing::{PostSeed, StoreFixture};

    #[tokio::test]
    async fn duplicate_slugs_are_rejected() {
        let fixture = StoreFixture::new().await;
        let existing = fixture
            .seed(PostSeed::new("Hello", datetime!(2024-01-01 00:00 UTC)))
            .await;
        let store = fixture.store();

        let error = store
            .create_post(CreatePostParams {
                slug: existing.slug.clone(),
                title: "Hello again".to_string(),
                language: None,
                lead_in: String::new(),
                author_id: existing.author.id,
                tag_ids: Vec::new(),
                category_ids: Vec::new(),
                publication_start: datetime!(2024-01-02 00:00 UTC),
                publication_end: None,
            })
            .await
            .expect_err("duplicate slug");
        assert!(matches!(error, RepoError::Duplicate { .. }));
    }

    #[tokio::test]
    async fn unknown_references_are_invalid_input() {
        let store = StoreFixture::new().await.store();
        let error = store
            .create_post(CreatePostParams {
                slug: "orphan".to_string(),
                title: "Orphan".to_string(),
                language: None,
                lead_in: String::new(),
                author_id: Uuid::new_v4(),
                tag_ids: Vec::new(),
                category_ids: Vec::new(),
                publication_start: datetime!(2024-01-02 00:00 UTC),
                publication_end: None,
            })
            .await
            .expect_err("unknown author");
        assert!(matches!(error, RepoError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn update_keeps_identity_and_creation_time() {
        let fixture = StoreFixture::new().await;
        let original = fixture
            .seed(PostSeed::new("Draft title", datetime!(2024-01-01 00:00 UTC)))
            .await;
        let store = fixture.store();
        let tag = store.ensure_tag("Rust").await.expect("tag");

        let updated = store
            .update_post(UpdatePostParams {
                id: original.id,
                slug: "final-title".to_string(),
                title: "Final title".to_string(),
                language: original.language.clone(),
                lead_in: original.lead_in.clone(),
                author_id: original.author.id,
                tag_ids: vec![tag.id, tag.id],
                category_ids: Vec::new(),
                publication_start: original.publication_start,
                publication_end: None,
            })
            .await
            .expect("update");

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.created_at, original.created_at);
        assert_eq!(updated.tags, vec![tag]);
        assert!(!store.slug_in_use("draft-title", None).await.expect("slug check"));
    }

    #[tokio::test]
    async fn bulk_delete_ignores_unknown_ids() {
        let fixture = StoreFixture::new().await;
        let first = fixture
            .seed(PostSeed::new("First", datetime!(2024-01-01 00:00 UTC)))
            .await;
        fixture
            .seed(PostSeed::new("Second", datetime!(2024-01-02 00:00 UTC)))
            .await;
        let store = fixture.store();

        let removed = store
            .delete_posts(&[first.id, Uuid::new_v4(), first.id])
            .await
            .expect("bulk delete");
        assert_eq!(removed.len(), 1);
        assert_eq!(store.post_count(), 1);
        assert!(matches!(
            store.delete_post(first.id).await,
            Err(RepoError::NotFound)
        ));
    }
}
