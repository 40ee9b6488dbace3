use async_trait::async_trait;
use uuid::Uuid;

use crate::application::repos::{CreateAuthorParams, RepoError, TaxonomyRepo};
use crate::domain::entities::{AuthorRecord, CategoryRecord, TagRecord};
use crate::domain::slug::generate_unique_slug;
use crate::util::lock::rw_write;

use super::{InMemoryPostStore, SOURCE};

fn required(value: &str, field: &str) -> Result<String, RepoError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RepoError::InvalidInput {
            message: format!("{field} must not be empty"),
        });
    }
    Ok(trimmed.to_string())
}

fn slug_error(error: crate::domain::slug::SlugError) -> RepoError {
    RepoError::InvalidInput {
        message: error.to_string(),
    }
}

#[async_trait]
impl TaxonomyRepo for InMemoryPostStore {
    async fn ensure_tag(&self, name: &str) -> Result<TagRecord, RepoError> {
        let name = required(name, "tag name")?;
        let mut state = rw_write(&self.state, SOURCE, "ensure_tag");

        if let Some(existing) = state.tags.values().find(|tag| tag.name == name) {
            return Ok(existing.clone());
        }

        let slug = generate_unique_slug(&name, |candidate| {
            !state.tags.values().any(|tag| tag.slug == candidate)
        })
        .map_err(slug_error)?;
        let tag = TagRecord {
            id: Uuid::new_v4(),
            slug,
            name,
        };
        state.tags.insert(tag.id, tag.clone());
        Ok(tag)
    }

    async fn create_category(&self, name: &str) -> Result<CategoryRecord, RepoError> {
        let name = required(name, "category name")?;
        let mut state = rw_write(&self.state, SOURCE, "create_category");

        if state.categories.values().any(|category| category.name == name) {
            return Err(RepoError::Duplicate {
                constraint: "categories_name_key".to_string(),
            });
        }

        let slug = generate_unique_slug(&name, |candidate| {
            !state
                .categories
                .values()
                .any(|category| category.slug == candidate)
        })
        .map_err(slug_error)?;
        let category = CategoryRecord {
            id: Uuid::new_v4(),
            slug,
            name,
        };
        state.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn create_author(&self, params: CreateAuthorParams) -> Result<AuthorRecord, RepoError> {
        let username = required(&params.username, "username")?;
        let mut state = rw_write(&self.state, SOURCE, "create_author");

        if state
            .authors
            .values()
            .any(|author| author.username == username)
        {
            return Err(RepoError::Duplicate {
                constraint: "authors_username_key".to_string(),
            });
        }

        let author = AuthorRecord {
            id: Uuid::new_v4(),
            username,
            display_name: params.display_name.trim().to_string(),
        };
        state.authors.insert(author.id, author.clone());
        Ok(author)
    }
}
