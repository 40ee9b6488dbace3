//! Shared fixtures for application and infrastructure unit tests.

use std::sync::Arc;

use time::OffsetDateTime;

use crate::application::links::{LinkResolver, PrefixLinkResolver};
use crate::application::menus::MenuContext;
use crate::application::repos::{
    CreateAuthorParams, CreatePostParams, PostScope, PostsRepo, PostsWriteRepo, TaxonomyRepo,
};
use crate::domain::entities::PostRecord;
use crate::domain::slug::derive_slug;
use crate::domain::types::Locale;
use crate::infra::memory::InMemoryPostStore;

pub(crate) fn locale(tag: &str) -> Locale {
    Locale::new(tag).expect("valid locale")
}

pub(crate) struct PostSeed {
    title: String,
    start: OffsetDateTime,
    end: Option<OffsetDateTime>,
    tags: Vec<String>,
    category: Option<String>,
    author: (String, String),
    language: Option<Locale>,
}

impl PostSeed {
    pub(crate) fn new(title: &str, start: OffsetDateTime) -> Self {
        Self {
            title: title.to_string(),
            start,
            end: None,
            tags: Vec::new(),
            category: None,
            author: ("editor".to_string(), "Editor".to_string()),
            language: None,
        }
    }

    pub(crate) fn until(mut self, end: OffsetDateTime) -> Self {
        self.end = Some(end);
        self
    }

    pub(crate) fn tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|tag| tag.to_string()).collect();
        self
    }

    pub(crate) fn category(mut self, name: &str) -> Self {
        self.category = Some(name.to_string());
        self
    }

    pub(crate) fn author(mut self, username: &str, display_name: &str) -> Self {
        self.author = (username.to_string(), display_name.to_string());
        self
    }

    pub(crate) fn language(mut self, tag: &str) -> Self {
        self.language = Some(locale(tag));
        self
    }
}

/// In-memory store plus an `en`/`de` link resolver mounted at `/blog/`.
pub(crate) struct StoreFixture {
    store: Arc<InMemoryPostStore>,
    links: Arc<PrefixLinkResolver>,
}

impl StoreFixture {
    pub(crate) async fn new() -> Self {
        Self {
            store: Arc::new(InMemoryPostStore::new()),
            links: Arc::new(PrefixLinkResolver::new(
                "/blog/",
                [locale("en"), locale("de")],
            )),
        }
    }

    pub(crate) fn store(&self) -> Arc<InMemoryPostStore> {
        self.store.clone()
    }

    pub(crate) fn posts(&self) -> Arc<dyn PostsRepo> {
        self.store.clone()
    }

    pub(crate) fn links(&self) -> Arc<dyn LinkResolver> {
        self.links.clone()
    }

    pub(crate) fn context(&self, scope: PostScope, hidden: bool) -> MenuContext {
        MenuContext {
            locale: locale("en"),
            scope,
            hidden,
        }
    }

    pub(crate) async fn seed(&self, seed: PostSeed) -> PostRecord {
        let store = &self.store;
        let (username, display_name) = seed.author;
        let author = match store
            .find_author_by_username(&username)
            .await
            .expect("author lookup")
        {
            Some(author) => author,
            None => store
                .create_author(CreateAuthorParams {
                    username,
                    display_name,
                })
                .await
                .expect("create author"),
        };

        let mut tag_ids = Vec::new();
        for name in &seed.tags {
            tag_ids.push(store.ensure_tag(name).await.expect("ensure tag").id);
        }

        let mut category_ids = Vec::new();
        if let Some(name) = seed.category.as_deref() {
            let slug = derive_slug(name).expect("category slug");
            let category = match store
                .find_category_by_slug(&slug)
                .await
                .expect("category lookup")
            {
                Some(category) => category,
                None => store.create_category(name).await.expect("create category"),
            };
            category_ids.push(category.id);
        }

        store
            .create_post(CreatePostParams {
                slug: derive_slug(&seed.title).expect("post slug"),
                title: seed.title,
                language: seed.language,
                lead_in: String::new(),
                author_id: author.id,
                tag_ids,
                category_ids,
                publication_start: seed.start,
                publication_end: seed.end,
            })
            .await
            .expect("create post")
    }
}
