//! In-process post store.
//!
//! Posts reference their author, tags and categories by id and are hydrated
//! into [`PostRecord`]s on every read, so renaming a tag is visible to every
//! post that carries it.

mod read;
mod taxonomy;
mod write;

use std::collections::HashMap;
use std::sync::RwLock;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{PostQueryFilter, PostScope, RepoError};
use crate::domain::entities::{AuthorRecord, CategoryRecord, PostRecord, TagRecord};
use crate::domain::posts::sort_newest_first;
use crate::domain::types::Locale;

const SOURCE: &str = "infra::memory";

#[derive(Default)]
pub struct InMemoryPostStore {
    state: RwLock<StoreState>,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post_count(&self) -> usize {
        crate::util::lock::rw_read(&self.state, SOURCE, "post_count")
            .posts
            .len()
    }
}

#[derive(Default)]
struct StoreState {
    posts: HashMap<Uuid, StoredPost>,
    authors: HashMap<Uuid, AuthorRecord>,
    tags: HashMap<Uuid, TagRecord>,
    categories: HashMap<Uuid, CategoryRecord>,
}

#[derive(Debug, Clone)]
struct StoredPost {
    id: Uuid,
    slug: String,
    title: String,
    language: Option<Locale>,
    lead_in: String,
    author_id: Uuid,
    tag_ids: Vec<Uuid>,
    category_ids: Vec<Uuid>,
    publication_start: OffsetDateTime,
    publication_end: Option<OffsetDateTime>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl StoreState {
    fn hydrate(&self, stored: &StoredPost) -> Result<PostRecord, RepoError> {
        let author = self
            .authors
            .get(&stored.author_id)
            .cloned()
            .ok_or_else(|| RepoError::Integrity {
                message: format!("post {} references a missing author", stored.id),
            })?;

        let tags = stored
            .tag_ids
            .iter()
            .map(|id| {
                self.tags.get(id).cloned().ok_or_else(|| RepoError::Integrity {
                    message: format!("post {} references a missing tag {id}", stored.id),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let categories = stored
            .category_ids
            .iter()
            .map(|id| {
                self.categories
                    .get(id)
                    .cloned()
                    .ok_or_else(|| RepoError::Integrity {
                        message: format!("post {} references a missing category {id}", stored.id),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PostRecord {
            id: stored.id,
            slug: stored.slug.clone(),
            title: stored.title.clone(),
            language: stored.language.clone(),
            lead_in: stored.lead_in.clone(),
            author,
            tags,
            categories,
            publication_start: stored.publication_start,
            publication_end: stored.publication_end,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        })
    }

    /// Posts admitted by `scope` and `filter`, newest first, cut to `filter.limit`.
    fn visible(
        &self,
        scope: PostScope,
        filter: &PostQueryFilter,
    ) -> Result<Vec<PostRecord>, RepoError> {
        let mut posts = Vec::new();
        for stored in self.posts.values() {
            let post = self.hydrate(stored)?;
            if scope.admits(&post) && filter.matches(&post) {
                posts.push(post);
            }
        }
        sort_newest_first(&mut posts);
        if let Some(limit) = filter.limit {
            posts.truncate(limit);
        }
        Ok(posts)
    }

    fn slug_taken(&self, slug: &str, exclude: Option<Uuid>) -> bool {
        self.posts
            .values()
            .any(|post| post.slug == slug && Some(post.id) != exclude)
    }

    fn check_references(
        &self,
        author_id: Uuid,
        tag_ids: &[Uuid],
        category_ids: &[Uuid],
    ) -> Result<(), RepoError> {
        if !self.authors.contains_key(&author_id) {
            return Err(RepoError::InvalidInput {
                message: format!("unknown author {author_id}"),
            });
        }
        if let Some(id) = tag_ids.iter().find(|id| !self.tags.contains_key(id)) {
            return Err(RepoError::InvalidInput {
                message: format!("unknown tag {id}"),
            });
        }
        if let Some(id) = category_ids
            .iter()
            .find(|id| !self.categories.contains_key(id))
        {
            return Err(RepoError::InvalidInput {
                message: format!("unknown category {id}"),
            });
        }
        Ok(())
    }
}

/// Keep the first occurrence of every id.
fn dedup_ids(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}
