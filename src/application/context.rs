//! Per-request facts the navigation and listing services depend on.

use time::OffsetDateTime;

use crate::application::repos::PostScope;
use crate::cache::Audience;
use crate::domain::types::Locale;

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub locale: Locale,
    /// Staff requests see posts outside their publication window.
    pub privileged: bool,
    /// Breadcrumb renders keep hidden nodes visible.
    pub breadcrumb: bool,
    /// Instant used for the publication window check.
    pub at: OffsetDateTime,
}

impl RequestContext {
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            privileged: false,
            breadcrumb: false,
            at: OffsetDateTime::now_utc(),
        }
    }

    pub fn privileged(mut self, privileged: bool) -> Self {
        self.privileged = privileged;
        self
    }

    pub fn breadcrumb(mut self, breadcrumb: bool) -> Self {
        self.breadcrumb = breadcrumb;
        self
    }

    pub fn at(mut self, at: OffsetDateTime) -> Self {
        self.at = at;
        self
    }

    pub fn scope(&self) -> PostScope {
        if self.privileged {
            PostScope::All
        } else {
            PostScope::Published { at: self.at }
        }
    }

    pub fn audience(&self) -> Audience {
        if self.privileged {
            Audience::Privileged
        } else {
            Audience::Public
        }
    }
}
