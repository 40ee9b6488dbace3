//! Import of authors, categories and posts from a TOML fixture.
//!
//! ```toml
//! [[authors]]
//! username = "ada"
//! display_name = "Ada Lovelace"
//!
//! [[posts]]
//! title = "Hello World"
//! author = "ada"
//! tags = ["rust"]
//! categories = ["News"]
//! publication_start = "2024-01-05T08:00:00Z"
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::application::error::AppError;
use crate::application::posts::{NewPost, PostWriteService};
use crate::application::repos::{CreateAuthorParams, TaxonomyRepo};
use crate::domain::types::Locale;
use crate::infra::error::InfraError;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostFixture {
    #[serde(default)]
    pub authors: Vec<AuthorEntry>,
    #[serde(default)]
    pub categories: Vec<CategoryEntry>,
    #[serde(default)]
    pub posts: Vec<PostEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthorEntry {
    pub username: String,
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryEntry {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostEntry {
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub language: Option<Locale>,
    #[serde(default)]
    pub lead_in: String,
    /// Username of a declared author.
    pub author: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Category names; undeclared ones are created.
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub publication_start: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub publication_end: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FixtureSummary {
    pub authors: usize,
    pub categories: usize,
    pub posts: usize,
}

impl PostFixture {
    pub fn parse(data: &str) -> Result<Self, AppError> {
        toml::from_str(data).map_err(|err| AppError::validation(format!("invalid fixture: {err}")))
    }

    pub async fn read(path: &Path) -> Result<Self, AppError> {
        let data = tokio::fs::read_to_string(path)
            .await
            .map_err(|err| AppError::from(InfraError::Io(err)))?;
        Self::parse(&data)
    }

    /// Create every author, category and post. Posts go through the write
    /// service, so each one invalidates cached navigation.
    pub async fn import(
        self,
        taxonomy: &dyn TaxonomyRepo,
        writer: &PostWriteService,
    ) -> Result<FixtureSummary, AppError> {
        let mut summary = FixtureSummary::default();

        let mut authors: HashMap<String, Uuid> = HashMap::new();
        for entry in self.authors {
            let author = taxonomy
                .create_author(CreateAuthorParams {
                    username: entry.username,
                    display_name: entry.display_name,
                })
                .await?;
            authors.insert(author.username.clone(), author.id);
            summary.authors += 1;
        }

        let mut categories: HashMap<String, Uuid> = HashMap::new();
        for entry in self.categories {
            let category = taxonomy.create_category(&entry.name).await?;
            categories.insert(category.name.clone(), category.id);
            summary.categories += 1;
        }

        for entry in self.posts {
            let author_id = authors.get(entry.author.trim()).copied().ok_or_else(|| {
                AppError::validation(format!(
                    "post `{}` references undeclared author `{}`",
                    entry.title, entry.author
                ))
            })?;

            let mut category_ids = Vec::with_capacity(entry.categories.len());
            for name in &entry.categories {
                let name = name.trim();
                let id = match categories.get(name) {
                    Some(id) => *id,
                    None => {
                        let category = taxonomy.create_category(name).await?;
                        categories.insert(category.name.clone(), category.id);
                        summary.categories += 1;
                        category.id
                    }
                };
                category_ids.push(id);
            }

            writer
                .create(NewPost {
                    title: entry.title,
                    slug: entry.slug,
                    language: entry.language,
                    lead_in: entry.lead_in,
                    author_id,
                    tags: entry.tags,
                    category_ids,
                    publication_start: entry.publication_start,
                    publication_end: entry.publication_end,
                })
                .await?;
            summary.posts += 1;
        }

        info!(
            authors = summary.authors,
            categories = summary.categories,
            posts = summary.posts,
            "Fixture imported"
        );
        Ok(summary)
    }
}
