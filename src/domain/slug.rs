//! Slug derivation for posts, tags and menu identifiers.
//!
//! Text is transliterated to ASCII first (Chinese through `pinyin`, other
//! scripts through `slug`'s own transliteration), then lowercased and
//! hyphenated. Collisions are resolved by suffixing `-2`, `-3`, ... so
//! "Café Tips" becomes `cafe-tips` and a second one `cafe-tips-2`. Uniqueness
//! is decided by a caller-supplied predicate so the transform stays pure.

use std::collections::HashMap;
use std::future::Future;

use pinyin::{Pinyin, ToPinyin};
use slug::slugify;
use thiserror::Error;

const MAX_SUFFIX_ATTEMPTS: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug source text is empty")]
    EmptyInput,
    #[error("failed to derive slug from `{input}`")]
    Unrepresentable { input: String },
    #[error("exhausted attempts to find a unique slug for `{base}`")]
    Exhausted { base: String },
}

/// Errors from [`generate_unique_slug_async`], where the uniqueness check itself may fail.
#[derive(Debug, Error)]
pub enum SlugAsyncError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    #[error(transparent)]
    Slug(#[from] SlugError),
    #[error(transparent)]
    Predicate(E),
}

pub fn derive_slug(input: &str) -> Result<String, SlugError> {
    if input.trim().is_empty() {
        return Err(SlugError::EmptyInput);
    }

    let candidate = slugify(transliterate_to_ascii(input));

    if candidate.is_empty() {
        return Err(SlugError::Unrepresentable {
            input: input.to_string(),
        });
    }

    Ok(candidate)
}

/// Produce a slug for which `is_free` returns `true`.
pub fn generate_unique_slug<F>(input: &str, mut is_free: F) -> Result<String, SlugError>
where
    F: FnMut(&str) -> bool,
{
    let base = derive_slug(input)?;

    if is_free(&base) {
        return Ok(base);
    }

    for attempt in 2..=MAX_SUFFIX_ATTEMPTS + 1 {
        let candidate = format!("{base}-{attempt}");
        if is_free(&candidate) {
            return Ok(candidate);
        }
    }

    Err(SlugError::Exhausted { base })
}

/// Async variant of [`generate_unique_slug`] for predicates that hit the store.
pub async fn generate_unique_slug_async<F, Fut, E>(
    input: &str,
    mut is_free: F,
) -> Result<String, SlugAsyncError<E>>
where
    F: FnMut(&str) -> Fut,
    Fut: Future<Output = Result<bool, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    let base = derive_slug(input)?;

    if is_free(&base).await.map_err(SlugAsyncError::Predicate)? {
        return Ok(base);
    }

    for attempt in 2..=MAX_SUFFIX_ATTEMPTS + 1 {
        let candidate = format!("{base}-{attempt}");
        if is_free(&candidate).await.map_err(SlugAsyncError::Predicate)? {
            return Ok(candidate);
        }
    }

    Err(SlugAsyncError::Slug(SlugError::Exhausted { base }))
}

/// Hands out slugs that are unique within one allocator, in first-seen order.
///
/// The first "Ada Lovelace" gets `ada-lovelace`, the next one
/// `ada-lovelace-2`, then `ada-lovelace-3`.
#[derive(Default, Debug)]
pub struct SlugAllocator {
    occurrences: HashMap<String, usize>,
}

impl SlugAllocator {
    pub fn new() -> Self {
        Self {
            occurrences: HashMap::new(),
        }
    }

    pub fn allocate(&mut self, text: &str) -> Result<String, SlugError> {
        let base = derive_slug(text)?;
        let mut count = self.occurrences.get(&base).copied().unwrap_or(0);

        loop {
            count += 1;
            let candidate = if count == 1 {
                base.clone()
            } else {
                format!("{base}-{count}")
            };

            // A suffixed slug may already have been taken verbatim ("ada-2").
            if !self.occurrences.contains_key(&candidate) {
                self.occurrences.insert(base.clone(), count);
                if candidate != base {
                    self.occurrences.insert(candidate.clone(), 1);
                }
                return Ok(candidate);
            }
        }
    }
}

fn transliterate_to_ascii(input: &str) -> String {
    let mut output = String::with_capacity(input.len());

    for ch in input.chars() {
        if ch.is_ascii() {
            output.push(ch);
            continue;
        }

        match ch.to_pinyin() {
            Some(py) => append_pinyin(&mut output, py),
            None if ch.is_whitespace() => output.push(' '),
            // slugify transliterates the rest (accents, Cyrillic, ...).
            None => output.push(ch),
        }
    }

    output
}

fn append_pinyin(buffer: &mut String, pinyin: Pinyin) {
    if !buffer.is_empty() && !buffer.ends_with(' ') {
        buffer.push(' ');
    }
    buffer.push_str(pinyin.plain());
}
