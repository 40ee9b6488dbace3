//! Cache trigger service.
//!
//! Write operations call into the trigger after a successful commit; every
//! registered subscriber is notified before the call returns.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info};
use uuid::Uuid;

use super::config::CacheConfig;
use super::events::{CacheEvent, CacheSubscriber, EventKind};
use super::store::MenuCache;

/// Publishes cache events to the registered subscribers.
///
/// ```ignore
/// // After a successful post update:
/// trigger.post_updated(post.id, &post.slug);
/// ```
pub struct CacheTrigger {
    config: CacheConfig,
    subscribers: Vec<Arc<dyn CacheSubscriber>>,
    epoch: AtomicU64,
}

impl CacheTrigger {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            subscribers: Vec::new(),
            epoch: AtomicU64::new(0),
        }
    }

    /// Trigger wired to a single menu cache, sharing its configuration.
    pub fn for_cache(cache: Arc<MenuCache>) -> Self {
        Self::new(cache.config().clone()).with_subscriber(cache)
    }

    pub fn with_subscriber(mut self, subscriber: Arc<dyn CacheSubscriber>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Publish an event to every subscriber.
    ///
    /// Returns the published event, or `None` when the cache is disabled.
    pub fn trigger(&self, kind: EventKind) -> Option<CacheEvent> {
        if !self.config.enabled {
            debug!(event_kind = kind.as_str(), "Cache trigger skipped: cache disabled");
            return None;
        }

        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let event = CacheEvent::new(kind, epoch);
        info!(
            event_id = %event.id,
            event_epoch = event.epoch,
            event_kind = event.kind.as_str(),
            subscribers = self.subscribers.len(),
            "Publishing cache event"
        );

        for subscriber in &self.subscribers {
            subscriber.on_event(&event);
        }
        Some(event)
    }

    pub fn post_created(&self, post_id: Uuid, slug: &str) -> Option<CacheEvent> {
        self.trigger(EventKind::PostCreated {
            post_id,
            slug: slug.to_string(),
        })
    }

    pub fn post_updated(&self, post_id: Uuid, slug: &str) -> Option<CacheEvent> {
        self.trigger(EventKind::PostUpdated {
            post_id,
            slug: slug.to_string(),
        })
    }

    pub fn post_deleted(&self, post_id: Uuid, slug: &str) -> Option<CacheEvent> {
        self.trigger(EventKind::PostDeleted {
            post_id,
            slug: slug.to_string(),
        })
    }

    pub fn posts_bulk_deleted(&self, post_ids: Vec<Uuid>) -> Option<CacheEvent> {
        self.trigger(EventKind::PostsBulkDeleted { post_ids })
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Epoch of the most recently published event (0 before the first).
    pub fn current_epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::cache::keys::{Audience, MenuCacheKey};
    use crate::domain::navigation::{MenuKind, NavigationNode, NavigationTree};
    use crate::domain::types::Locale;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<(u64, &'static str)>>,
    }

    impl CacheSubscriber for Recorder {
        fn on_event(&self, event: &CacheEvent) {
            self.seen
                .lock()
                .expect("recorder lock")
                .push((event.epoch, event.kind.as_str()));
        }
    }

    #[test]
    fn events_reach_every_subscriber_in_epoch_order() {
        let first = Arc::new(Recorder::default());
        let second = Arc::new(Recorder::default());
        let trigger = CacheTrigger::new(CacheConfig::default())
            .with_subscriber(first.clone())
            .with_subscriber(second.clone());

        trigger.post_created(Uuid::new_v4(), "hello");
        trigger.posts_bulk_deleted(vec![Uuid::new_v4(), Uuid::new_v4()]);

        let expected = vec![(1, "post_created"), (2, "posts_bulk_deleted")];
        assert_eq!(*first.seen.lock().expect("lock"), expected);
        assert_eq!(*second.seen.lock().expect("lock"), expected);
        assert_eq!(trigger.current_epoch(), 2);
    }

    #[test]
    fn disabled_trigger_publishes_nothing() {
        let recorder = Arc::new(Recorder::default());
        let trigger =
            CacheTrigger::new(CacheConfig::disabled()).with_subscriber(recorder.clone());

        assert!(trigger.post_deleted(Uuid::new_v4(), "gone").is_none());
        assert!(recorder.seen.lock().expect("lock").is_empty());
        assert_eq!(trigger.current_epoch(), 0);
    }

    #[test]
    fn post_update_clears_the_menu_cache() {
        let cache = Arc::new(MenuCache::new(CacheConfig::default()));
        let key = MenuCacheKey::new(
            MenuKind::Categories,
            Locale::new("en").expect("locale"),
            Audience::Public,
        );
        let tree = NavigationTree::from_nodes([NavigationNode::new(
            "blog-categories",
            "Categories",
            "/en/blog/",
        )])
        .expect("tree");
        assert!(cache.insert(key.clone(), Arc::new(tree), cache.generation()));

        let trigger = CacheTrigger::for_cache(cache.clone());
        let event = trigger.post_updated(Uuid::new_v4(), "hello").expect("event");

        assert_eq!(event.epoch, 1);
        assert!(cache.get(&key).is_none());
        assert_eq!(cache.generation(), 1);
    }
}
