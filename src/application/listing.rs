//! List and detail page queries for the blog.

use std::sync::Arc;

use serde::Serialize;
use time::{Date, Month};
use tracing::debug;

use crate::application::context::RequestContext;
use crate::application::error::AppError;
use crate::application::links::{LinkResolver, Route, resolve_or_fallback};
use crate::application::pagination::{DEFAULT_PAGE_SIZE, PageRequest, Paginated};
use crate::application::repos::{PostQueryFilter, PostScope, PostsRepo};
use crate::domain::entities::{AuthorRecord, CategoryRecord, PostRecord, TagRecord};
use crate::domain::types::Locale;

pub type PostPage = Paginated<PostRecord>;

/// Post count shown by the latest-entries and author-entries widgets.
pub const DEFAULT_ENTRY_LIMIT: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct ArchivePage {
    pub year: Option<i32>,
    pub month: Option<Month>,
    /// First day of the archived month, or of January when only a year is given.
    pub archive_date: Option<Date>,
    pub posts: PostPage,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaggedPage {
    pub tag: TagRecord,
    pub posts: PostPage,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryPage {
    pub category: CategoryRecord,
    pub posts: PostPage,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorPage {
    pub username: String,
    /// `None` when no account has this username.
    pub author: Option<AuthorRecord>,
    pub posts: PostPage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageLink {
    pub locale: Locale,
    pub link: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostDetailPage {
    pub post: PostRecord,
    /// Language switcher targets. Only set for single-language posts, whose
    /// detail page does not exist in other locales.
    pub language_links: Vec<LanguageLink>,
}

#[derive(Clone)]
pub struct ListingService {
    posts: Arc<dyn PostsRepo>,
    links: Arc<dyn LinkResolver>,
    locales: Vec<Locale>,
    page_size: usize,
}

impl ListingService {
    pub fn new(
        posts: Arc<dyn PostsRepo>,
        links: Arc<dyn LinkResolver>,
        locales: Vec<Locale>,
    ) -> Self {
        Self {
            posts,
            links,
            locales,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub async fn latest(&self, request: &RequestContext, page: usize) -> Result<PostPage, AppError> {
        self.page_of(request, PostQueryFilter::for_locale(&request.locale), page)
            .await
    }

    pub async fn archive(
        &self,
        request: &RequestContext,
        year: Option<i32>,
        month: Option<Month>,
        page: usize,
    ) -> Result<ArchivePage, AppError> {
        let filter = PostQueryFilter {
            year,
            month,
            ..PostQueryFilter::for_locale(&request.locale)
        };
        let posts = self.page_of(request, filter, page).await?;
        let archive_date = year.and_then(|year| {
            Date::from_calendar_date(year, month.unwrap_or(Month::January), 1).ok()
        });

        Ok(ArchivePage {
            year,
            month,
            archive_date,
            posts,
        })
    }

    pub async fn tagged(
        &self,
        request: &RequestContext,
        tag_slug: &str,
        page: usize,
    ) -> Result<TaggedPage, AppError> {
        let tag = self
            .posts
            .find_tag_by_slug(tag_slug)
            .await?
            .ok_or_else(|| AppError::not_found("tag"))?;
        let filter = PostQueryFilter {
            tag: Some(tag.slug.clone()),
            ..PostQueryFilter::for_locale(&request.locale)
        };
        let posts = self.page_of(request, filter, page).await?;
        Ok(TaggedPage { tag, posts })
    }

    pub async fn category(
        &self,
        request: &RequestContext,
        category_slug: &str,
        page: usize,
    ) -> Result<CategoryPage, AppError> {
        let category = self
            .posts
            .find_category_by_slug(category_slug)
            .await?
            .ok_or_else(|| AppError::not_found("category"))?;
        let filter = PostQueryFilter {
            category: Some(category.slug.clone()),
            ..PostQueryFilter::for_locale(&request.locale)
        };
        let posts = self.page_of(request, filter, page).await?;
        Ok(CategoryPage { category, posts })
    }

    pub async fn author(
        &self,
        request: &RequestContext,
        username: &str,
        page: usize,
    ) -> Result<AuthorPage, AppError> {
        let author = self.posts.find_author_by_username(username).await?;
        let filter = PostQueryFilter {
            author: Some(username.to_string()),
            ..PostQueryFilter::for_locale(&request.locale)
        };
        let posts = self.page_of(request, filter, page).await?;
        Ok(AuthorPage {
            username: username.to_string(),
            author,
            posts,
        })
    }

    pub async fn detail(
        &self,
        request: &RequestContext,
        year: i32,
        month: Month,
        day: u8,
        slug: &str,
    ) -> Result<PostDetailPage, AppError> {
        let date = Date::from_calendar_date(year, month, day)
            .map_err(|_| AppError::not_found("post"))?;
        let post = self
            .posts
            .find_post(request.scope(), &request.locale, date, slug)
            .await?
            .ok_or_else(|| AppError::not_found("post"))?;

        let language_links = if post.language.is_some() {
            self.locales
                .iter()
                .filter(|locale| **locale != request.locale)
                .map(|locale| LanguageLink {
                    locale: locale.clone(),
                    link: self.language_changer(locale),
                })
                .collect()
        } else {
            Vec::new()
        };

        Ok(PostDetailPage {
            post,
            language_links,
        })
    }

    /// Newest `limit` published posts for the request locale, restricted to
    /// posts carrying any of `tag_slugs` when that list is not empty.
    pub async fn latest_entries(
        &self,
        request: &RequestContext,
        tag_slugs: &[String],
        limit: usize,
    ) -> Result<Vec<PostRecord>, AppError> {
        let filter = PostQueryFilter {
            any_tags: tag_slugs.to_vec(),
            limit: Some(limit),
            ..PostQueryFilter::for_locale(&request.locale)
        };
        self.entries(request, filter).await
    }

    /// Newest `limit` published posts by any of `usernames`. No authors, no posts.
    pub async fn author_entries(
        &self,
        request: &RequestContext,
        usernames: &[String],
        limit: usize,
    ) -> Result<Vec<PostRecord>, AppError> {
        if usernames.is_empty() {
            return Ok(Vec::new());
        }
        let filter = PostQueryFilter {
            any_authors: usernames.to_vec(),
            limit: Some(limit),
            ..PostQueryFilter::for_locale(&request.locale)
        };
        self.entries(request, filter).await
    }

    /// Latest-posts link for `locale`, or the locale root when it has none.
    pub fn language_changer(&self, locale: &Locale) -> String {
        resolve_or_fallback(self.links.as_ref(), locale, &Route::LatestPosts)
    }

    // Entry widgets list published posts even for staff.
    async fn entries(
        &self,
        request: &RequestContext,
        filter: PostQueryFilter,
    ) -> Result<Vec<PostRecord>, AppError> {
        let scope = PostScope::Published { at: request.at };
        let posts = self.posts.list_posts(scope, &filter).await?;
        debug!(
            locale = %request.locale,
            tags = filter.any_tags.len(),
            authors = filter.any_authors.len(),
            matched = posts.len(),
            "Entries query"
        );
        Ok(posts)
    }

    async fn page_of(
        &self,
        request: &RequestContext,
        filter: PostQueryFilter,
        page: usize,
    ) -> Result<PostPage, AppError> {
        let posts = self.posts.list_posts(request.scope(), &filter).await?;
        debug!(
            locale = %request.locale,
            privileged = request.privileged,
            matched = posts.len(),
            page,
            "Listing query"
        );
        Ok(Paginated::paginate(
            posts,
            PageRequest::new(page, self.page_size),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use time::macros::{date, datetime};

    use super::*;
    use crate::application::testing::{PostSeed, StoreFixture, locale};

    async fn service() -> (StoreFixture, ListingService) {
        let fixture = StoreFixture::new().await;
        fixture
            .seed(
                PostSeed::new("Winter notes", datetime!(2024-01-15 10:00 UTC))
                    .tags(&["x"])
                    .author("ada", "Ada"),
            )
            .await;
        fixture
            .seed(
                PostSeed::new("Spring notes", datetime!(2024-03-02 10:00 UTC))
                    .tags(&["x"])
                    .category("News")
                    .language("en"),
            )
            .await;
        fixture
            .seed(PostSeed::new("Future notes", datetime!(2099-01-01 10:00 UTC)))
            .await;
        let service = ListingService::new(
            fixture.posts(),
            fixture.links(),
            vec![locale("en"), locale("de")],
        );
        (fixture, service)
    }

    fn public() -> RequestContext {
        RequestContext::new(locale("en")).at(datetime!(2024-06-01 00:00 UTC))
    }

    fn titles(page: &PostPage) -> Vec<&str> {
        page.items.iter().map(|post| post.title.as_str()).collect()
    }

    #[tokio::test]
    async fn latest_hides_future_posts_from_the_public() {
        let (_fixture, service) = service().await;

        let public_page = service.latest(&public(), 1).await.expect("latest");
        assert_eq!(titles(&public_page), vec!["Spring notes", "Winter notes"]);

        let staff_page = service
            .latest(&public().privileged(true), 1)
            .await
            .expect("latest");
        assert_eq!(staff_page.total_items, 3);
    }

    #[tokio::test]
    async fn pages_are_bounded() {
        let (_fixture, service) = service().await;
        let service = service.with_page_size(1);

        let second = service.latest(&public(), 2).await.expect("second page");
        assert_eq!(titles(&second), vec!["Winter notes"]);
        assert!(service.latest(&public(), 3).await.expect_err("past end").is_not_found());
    }

    #[tokio::test]
    async fn archive_filters_by_year_and_month() {
        let (_fixture, service) = service().await;

        let march = service
            .archive(&public(), Some(2024), Some(Month::March), 1)
            .await
            .expect("archive");
        assert_eq!(titles(&march.posts), vec!["Spring notes"]);
        assert_eq!(march.archive_date, Some(date!(2024 - 03 - 01)));

        let year = service
            .archive(&public(), Some(2024), None, 1)
            .await
            .expect("archive");
        assert_eq!(year.posts.total_items, 2);
        assert_eq!(year.archive_date, Some(date!(2024 - 01 - 01)));

        let everything = service.archive(&public(), None, None, 1).await.expect("archive");
        assert_eq!(everything.archive_date, None);
    }

    #[tokio::test]
    async fn unknown_tag_is_not_found_but_unknown_author_is_empty() {
        let (_fixture, service) = service().await;

        let tagged = service.tagged(&public(), "x", 1).await.expect("tagged");
        assert_eq!(tagged.posts.total_items, 2);
        assert!(
            service
                .tagged(&public(), "missing", 1)
                .await
                .expect_err("missing tag")
                .is_not_found()
        );

        let ada = service.author(&public(), "ada", 1).await.expect("author");
        assert_eq!(titles(&ada.posts), vec!["Winter notes"]);
        let nobody = service.author(&public(), "nobody", 1).await.expect("author");
        assert!(nobody.author.is_none());
        assert!(nobody.posts.items.is_empty());

        let news = service.category(&public(), "news", 1).await.expect("category");
        assert_eq!(titles(&news.posts), vec!["Spring notes"]);
    }

    #[tokio::test]
    async fn detail_offers_language_links_for_single_language_posts() {
        let (_fixture, service) = service().await;

        let spring = service
            .detail(&public(), 2024, Month::March, 2, "spring-notes")
            .await
            .expect("detail");
        assert_eq!(
            spring.language_links,
            vec![LanguageLink {
                locale: locale("de"),
                link: "/de/blog/".to_string(),
            }]
        );

        let winter = service
            .detail(&public(), 2024, Month::January, 15, "winter-notes")
            .await
            .expect("detail");
        assert!(winter.language_links.is_empty());

        for (month, day) in [(Month::January, 16), (Month::February, 30)] {
            assert!(
                service
                    .detail(&public(), 2024, month, day, "winter-notes")
                    .await
                    .expect_err("no such post")
                    .is_not_found()
            );
        }
    }

    #[tokio::test]
    async fn latest_entries_are_limited_and_filtered_by_any_tag() {
        let (fixture, service) = service().await;
        fixture
            .seed(
                PostSeed::new("Autumn notes", datetime!(2024-05-01 10:00 UTC)).tags(&["y"]),
            )
            .await;
        let staff = public().privileged(true);

        let newest = service
            .latest_entries(&staff, &[], 2)
            .await
            .expect("latest entries");
        let titles: Vec<&str> = newest.iter().map(|post| post.title.as_str()).collect();
        assert_eq!(titles, vec!["Autumn notes", "Spring notes"]);

        let tagged = service
            .latest_entries(&staff, &["x".to_string(), "missing".to_string()], 5)
            .await
            .expect("tagged entries");
        let titles: Vec<&str> = tagged.iter().map(|post| post.title.as_str()).collect();
        assert_eq!(titles, vec!["Spring notes", "Winter notes"]);
    }

    #[tokio::test]
    async fn author_entries_cover_the_chosen_authors_only() {
        let (_fixture, service) = service().await;

        let ada = service
            .author_entries(&public(), &["ada".to_string(), "nobody".to_string()], 5)
            .await
            .expect("author entries");
        let titles: Vec<&str> = ada.iter().map(|post| post.title.as_str()).collect();
        assert_eq!(titles, vec!["Winter notes"]);

        let everyone = service
            .author_entries(&public(), &["ada".to_string(), "editor".to_string()], 1)
            .await
            .expect("author entries");
        assert_eq!(everyone.len(), 1);
        assert_eq!(everyone[0].title, "Spring notes");

        assert!(
            service
                .author_entries(&public(), &[], 5)
                .await
                .expect("no authors")
                .is_empty()
        );
    }

    #[tokio::test]
    async fn language_changer_falls_back_to_locale_root() {
        let (_fixture, service) = service().await;
        assert_eq!(service.language_changer(&locale("de")), "/de/blog/");
        assert_eq!(service.language_changer(&locale("fr")), "/fr/");
    }
}
