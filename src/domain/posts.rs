//! Publication rules and derived aggregates over posts.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;
use time::{Date, Month, OffsetDateTime, UtcOffset};
use uuid::Uuid;

use crate::domain::entities::{PostRecord, TagRecord};
use crate::domain::types::Locale;

/// A post is published while `start <= now` and the optional end has not passed.
pub fn is_published(
    start: OffsetDateTime,
    end: Option<OffsetDateTime>,
    now: OffsetDateTime,
) -> bool {
    start <= now && end.is_none_or(|end| now <= end)
}

impl PostRecord {
    pub fn is_published_at(&self, now: OffsetDateTime) -> bool {
        is_published(self.publication_start, self.publication_end, now)
    }

    /// Posts without a language are shown for every locale.
    pub fn is_available_in(&self, locale: &Locale) -> bool {
        self.language.as_ref().is_none_or(|language| language == locale)
    }

    /// Calendar date of the publication start, in UTC.
    pub fn publication_date(&self) -> Date {
        self.publication_start.to_offset(UtcOffset::UTC).date()
    }
}

/// Newest first; equal timestamps fall back to slug order.
pub fn sort_newest_first(posts: &mut [PostRecord]) {
    posts.sort_by(|lhs, rhs| {
        rhs.publication_start
            .cmp(&lhs.publication_start)
            .then_with(|| lhs.slug.cmp(&rhs.slug))
    });
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: TagRecord,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthCount {
    pub year: i32,
    pub month: Month,
    pub count: usize,
}

impl MonthCount {
    /// `2024-02` style key used in archive links and logs.
    pub fn key(&self) -> String {
        format!("{:04}-{:02}", self.year, u8::from(self.month))
    }

    pub fn label(&self) -> String {
        format!("{} {}", self.month, self.year)
    }
}

/// Count tag usage across posts, most used first and ties by name.
///
/// A tag attached twice to the same post is counted once for that post.
pub fn aggregate_tags<'a>(posts: impl IntoIterator<Item = &'a PostRecord>) -> Vec<TagCount> {
    let mut counts: HashMap<Uuid, TagCount> = HashMap::new();

    for post in posts {
        let mut seen = HashSet::new();
        for tag in &post.tags {
            if !seen.insert(tag.id) {
                continue;
            }
            counts
                .entry(tag.id)
                .and_modify(|entry| entry.count += 1)
                .or_insert_with(|| TagCount {
                    tag: tag.clone(),
                    count: 1,
                });
        }
    }

    let mut entries: Vec<TagCount> = counts.into_values().collect();
    entries.sort_by(|lhs, rhs| {
        rhs.count
            .cmp(&lhs.count)
            .then_with(|| lhs.tag.name.cmp(&rhs.tag.name))
            .then_with(|| lhs.tag.slug.cmp(&rhs.tag.slug))
    });
    entries
}

/// Count posts per publication month, newest month first.
pub fn aggregate_months<'a>(posts: impl IntoIterator<Item = &'a PostRecord>) -> Vec<MonthCount> {
    let mut map: BTreeMap<(i32, u8), usize> = BTreeMap::new();

    for post in posts {
        let date = post.publication_date();
        *map.entry((date.year(), u8::from(date.month()))).or_default() += 1;
    }

    map.into_iter()
        .rev()
        .filter_map(|((year, month), count)| {
            Month::try_from(month)
                .ok()
                .map(|month| MonthCount { year, month, count })
        })
        .collect()
}
