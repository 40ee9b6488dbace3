//! Process-wide store of built menu trees.

use std::future::Future;
use std::sync::{Arc, RwLock};
use std::time::Instant;

use lru::LruCache;
use metrics::{counter, histogram};
use tracing::{debug, info};

use crate::domain::navigation::NavigationTree;
use crate::util::lock::{rw_read, rw_write};

use super::config::CacheConfig;
use super::events::{CacheEvent, CacheSubscriber, Epoch};
use super::keys::MenuCacheKey;

const SOURCE: &str = "cache::store";

pub(crate) const METRIC_MENU_CACHE_HIT: &str = "folio_menu_cache_hit_total";
pub(crate) const METRIC_MENU_CACHE_MISS: &str = "folio_menu_cache_miss_total";
pub(crate) const METRIC_MENU_CACHE_EVICT: &str = "folio_menu_cache_evict_total";
pub(crate) const METRIC_MENU_CACHE_INVALIDATE: &str = "folio_menu_cache_invalidate_total";
pub(crate) const METRIC_MENU_BUILD_MS: &str = "folio_menu_build_ms";

struct CacheState {
    /// Bumped by every invalidation; stores from older generations are dropped.
    generation: Epoch,
    entries: LruCache<MenuCacheKey, Arc<NavigationTree>>,
}

/// Memoised menu trees keyed by (kind, locale, audience).
///
/// The lock is held only for a lookup, a store or a clear, never while a
/// tree is being built, so two concurrent misses for the same key may both
/// build it. The last store wins.
pub struct MenuCache {
    config: CacheConfig,
    state: RwLock<CacheState>,
}

impl MenuCache {
    pub fn new(config: CacheConfig) -> Self {
        let capacity = config.capacity_non_zero();
        Self {
            config,
            state: RwLock::new(CacheState {
                generation: 0,
                entries: LruCache::new(capacity),
            }),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn get(&self, key: &MenuCacheKey) -> Option<Arc<NavigationTree>> {
        if !self.config.enabled {
            return None;
        }

        let hit = rw_write(&self.state, SOURCE, "get")
            .entries
            .get(key)
            .cloned();
        record_lookup(key, hit.is_some());
        hit
    }

    pub fn generation(&self) -> Epoch {
        rw_read(&self.state, SOURCE, "generation").generation
    }

    /// Store `tree` unless the cache was invalidated after `generation` was read.
    pub fn insert(
        &self,
        key: MenuCacheKey,
        tree: Arc<NavigationTree>,
        generation: Epoch,
    ) -> bool {
        if !self.config.enabled {
            return false;
        }

        let mut state = rw_write(&self.state, SOURCE, "insert");
        if state.generation != generation {
            debug!(
                menu = key.kind.key(),
                locale = %key.locale,
                built_generation = generation,
                current_generation = state.generation,
                "Discarding menu built before the last invalidation"
            );
            return false;
        }

        if let Some((evicted, _)) = state.entries.push(key.clone(), tree)
            && evicted != key
        {
            counter!(METRIC_MENU_CACHE_EVICT).increment(1);
        }
        true
    }

    /// Return the cached tree for `key`, building and storing it on a miss.
    ///
    /// Builder errors are returned as-is and never cached.
    pub async fn get_or_build<F, Fut, E>(
        &self,
        key: MenuCacheKey,
        build: F,
    ) -> Result<Arc<NavigationTree>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<NavigationTree, E>>,
    {
        if !self.config.enabled {
            return build().await.map(Arc::new);
        }

        let generation = {
            let mut state = rw_write(&self.state, SOURCE, "get_or_build");
            if let Some(tree) = state.entries.get(&key) {
                let tree = Arc::clone(tree);
                drop(state);
                record_lookup(&key, true);
                return Ok(tree);
            }
            state.generation
        };
        record_lookup(&key, false);

        let started_at = Instant::now();
        let tree = Arc::new(build().await?);
        histogram!(METRIC_MENU_BUILD_MS, "menu" => key.kind.key())
            .record(started_at.elapsed().as_secs_f64() * 1000.0);

        self.insert(key, Arc::clone(&tree), generation);
        Ok(tree)
    }

    pub fn invalidate_all(&self) {
        let (cleared, generation) = {
            let mut state = rw_write(&self.state, SOURCE, "invalidate_all");
            let cleared = state.entries.len();
            state.entries.clear();
            state.generation += 1;
            (cleared, state.generation)
        };

        counter!(METRIC_MENU_CACHE_INVALIDATE).increment(1);
        info!(cleared, generation, "Menu cache invalidated");
    }

    pub fn len(&self) -> usize {
        rw_read(&self.state, SOURCE, "len").entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheSubscriber for MenuCache {
    fn on_event(&self, event: &CacheEvent) {
        debug!(
            event_id = %event.id,
            event_epoch = event.epoch,
            event_kind = event.kind.as_str(),
            "Menu cache received event"
        );
        self.invalidate_all();
    }
}

fn record_lookup(key: &MenuCacheKey, hit: bool) {
    if hit {
        counter!(METRIC_MENU_CACHE_HIT, "menu" => key.kind.key()).increment(1);
        debug!(menu = key.kind.key(), locale = %key.locale, "Menu cache hit");
    } else {
        counter!(METRIC_MENU_CACHE_MISS, "menu" => key.kind.key()).increment(1);
        debug!(menu = key.kind.key(), locale = %key.locale, "Menu cache miss");
    }
}
