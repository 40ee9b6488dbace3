//! Cache key definitions.

use crate::domain::navigation::MenuKind;
use crate::domain::types::Locale;

/// Who a menu was built for; privileged renders include unpublished posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Audience {
    Public,
    Privileged,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MenuCacheKey {
    pub kind: MenuKind,
    pub locale: Locale,
    pub audience: Audience,
}

impl MenuCacheKey {
    pub fn new(kind: MenuKind, locale: Locale, audience: Audience) -> Self {
        Self {
            kind,
            locale,
            audience,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn keys_differ_by_every_component() {
        let en = Locale::new("en").expect("locale");
        let de = Locale::new("de").expect("locale");
        let keys: HashSet<MenuCacheKey> = [
            MenuCacheKey::new(MenuKind::Tags, en.clone(), Audience::Public),
            MenuCacheKey::new(MenuKind::Tags, en.clone(), Audience::Privileged),
            MenuCacheKey::new(MenuKind::Tags, de, Audience::Public),
            MenuCacheKey::new(MenuKind::Archive, en.clone(), Audience::Public),
            MenuCacheKey::new(MenuKind::Tags, en, Audience::Public),
        ]
        .into_iter()
        .collect();
        assert_eq!(keys.len(), 4);
    }
}
