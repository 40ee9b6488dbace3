//! Shared domain value types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Language code used to filter posts and resolve links (`en`, `de`, `pt-br`).
///
/// Values are normalised to lowercase with `-` separating subtags, so `pt_BR`
/// and `pt-br` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale(String);

impl Locale {
    pub fn new(value: &str) -> Result<Self, DomainError> {
        let normalised = value.trim().replace('_', "-").to_ascii_lowercase();
        let mut subtags = normalised.split('-');

        let primary = subtags.next().unwrap_or_default();
        if !(2..=3).contains(&primary.len()) || !primary.chars().all(|ch| ch.is_ascii_lowercase())
        {
            return Err(DomainError::validation(format!(
                "`{value}` is not a valid language code"
            )));
        }

        for subtag in subtags {
            if subtag.is_empty()
                || subtag.len() > 8
                || !subtag.chars().all(|ch| ch.is_ascii_alphanumeric())
            {
                return Err(DomainError::validation(format!(
                    "`{value}` has an invalid language subtag"
                )));
            }
        }

        Ok(Self(normalised))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Locale {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::new(value)
    }
}

impl TryFrom<String> for Locale {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locale_normalises_case_and_separator() {
        let locale = Locale::new(" pt_BR ").expect("valid locale");
        assert_eq!(locale.as_str(), "pt-br");
        assert_eq!(locale, Locale::new("pt-br").expect("valid locale"));
    }

    #[test]
    fn locale_rejects_garbage() {
        assert!(Locale::new("").is_err());
        assert!(Locale::new("e").is_err());
        assert!(Locale::new("english").is_err());
        assert!(Locale::new("en-").is_err());
        assert!(Locale::new("1n").is_err());
    }

    #[test]
    fn locale_deserializes_through_validation() {
        let locale: Locale = serde_json::from_str("\"DE\"").expect("valid json locale");
        assert_eq!(locale.as_str(), "de");
        assert!(serde_json::from_str::<Locale>("\"??\"").is_err());
    }
}
