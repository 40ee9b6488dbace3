//! Locale-aware link resolution for blog routes.

use std::collections::BTreeSet;

use thiserror::Error;
use time::Month;
use tracing::warn;
use url::Url;

use crate::domain::entities::PostRecord;
use crate::domain::types::Locale;

/// Named blog routes together with their parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    LatestPosts,
    ArchiveYear {
        year: i32,
    },
    ArchiveMonth {
        year: i32,
        month: Month,
    },
    PostDetail {
        year: i32,
        month: Month,
        day: u8,
        slug: String,
    },
    TaggedPosts {
        tag: String,
    },
    CategoryPosts {
        category: String,
    },
    AuthorPosts {
        username: String,
    },
}

impl Route {
    pub fn name(&self) -> &'static str {
        match self {
            Route::LatestPosts => "latest-posts",
            Route::ArchiveYear { .. } => "archive-year",
            Route::ArchiveMonth { .. } => "archive-month",
            Route::PostDetail { .. } => "post-detail",
            Route::TaggedPosts { .. } => "tagged-posts",
            Route::CategoryPosts { .. } => "category-posts",
            Route::AuthorPosts { .. } => "author-posts",
        }
    }

    pub fn post_detail(post: &PostRecord) -> Self {
        let date = post.publication_date();
        Route::PostDetail {
            year: date.year(),
            month: date.month(),
            day: date.day(),
            slug: post.slug.clone(),
        }
    }

    fn segments(&self) -> Result<Vec<String>, RouteError> {
        let segments = match self {
            Route::LatestPosts => Vec::new(),
            Route::ArchiveYear { year } => vec![format!("{year:04}")],
            Route::ArchiveMonth { year, month } => {
                vec![format!("{year:04}"), format!("{:02}", u8::from(*month))]
            }
            Route::PostDetail {
                year,
                month,
                day,
                slug,
            } => vec![
                format!("{year:04}"),
                format!("{:02}", u8::from(*month)),
                format!("{day:02}"),
                self.required(slug)?,
            ],
            Route::TaggedPosts { tag } => vec!["tag".to_string(), self.required(tag)?],
            Route::CategoryPosts { category } => {
                vec!["category".to_string(), self.required(category)?]
            }
            Route::AuthorPosts { username } => {
                vec!["author".to_string(), self.required(username)?]
            }
        };
        Ok(segments)
    }

    fn required(&self, value: &str) -> Result<String, RouteError> {
        if value.trim().is_empty() {
            return Err(RouteError::MissingParameter { route: self.name() });
        }
        Ok(value.to_string())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("no routes are mounted for locale `{locale}`")]
    UnknownLocale { locale: String },
    #[error("route `{route}` is missing a required parameter")]
    MissingParameter { route: &'static str },
    #[error("failed to build link: {0}")]
    Build(String),
}

pub trait LinkResolver: Send + Sync {
    fn resolve(&self, locale: &Locale, route: &Route) -> Result<String, RouteError>;
}

/// Resolve `route`, falling back to the locale root (`/<locale>/`) on failure.
pub fn resolve_or_fallback(resolver: &dyn LinkResolver, locale: &Locale, route: &Route) -> String {
    match resolver.resolve(locale, route) {
        Ok(link) => link,
        Err(error) => {
            warn!(
                route = route.name(),
                locale = %locale,
                error = %error,
                "Link resolution failed; falling back to locale root"
            );
            format!("/{locale}/")
        }
    }
}

/// Builds `/<locale>/<mount>/...` paths for a fixed set of locales.
#[derive(Debug, Clone)]
pub struct PrefixLinkResolver {
    mount: Vec<String>,
    locales: BTreeSet<Locale>,
}

impl PrefixLinkResolver {
    pub fn new(mount: &str, locales: impl IntoIterator<Item = Locale>) -> Self {
        Self {
            mount: mount
                .split('/')
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
            locales: locales.into_iter().collect(),
        }
    }
}

impl LinkResolver for PrefixLinkResolver {
    fn resolve(&self, locale: &Locale, route: &Route) -> Result<String, RouteError> {
        if !self.locales.contains(locale) {
            return Err(RouteError::UnknownLocale {
                locale: locale.to_string(),
            });
        }

        let mut url =
            Url::parse("http://localhost/").map_err(|err| RouteError::Build(err.to_string()))?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| RouteError::Build("base url cannot hold a path".to_string()))?;
            path.clear();
            path.push(locale.as_str());
            path.extend(self.mount.iter());
            path.extend(route.segments()?.iter());
            path.push("");
        }

        Ok(url.path().to_string())
    }
}
