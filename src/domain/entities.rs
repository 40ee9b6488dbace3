//! Domain entities mirrored from the post store.

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::types::Locale;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorRecord {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
}

impl AuthorRecord {
    /// Name shown in menus; falls back to the username when no display name is set.
    pub fn label(&self) -> &str {
        let display = self.display_name.trim();
        if display.is_empty() {
            &self.username
        } else {
            display
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TagRecord {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CategoryRecord {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostRecord {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    /// `None` means the post is shown in every language.
    pub language: Option<Locale>,
    pub lead_in: String,
    pub author: AuthorRecord,
    pub tags: Vec<TagRecord>,
    pub categories: Vec<CategoryRecord>,
    pub publication_start: OffsetDateTime,
    pub publication_end: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}
