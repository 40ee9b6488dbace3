//! Menu cache.
//!
//! Built menu trees are memoised per (menu kind, locale, audience) in a
//! process-wide [`MenuCache`]. Post writes publish [`EventKind`]s through the
//! [`CacheTrigger`], which clears the cache before the write returns.
//!
//! ```toml
//! [cache]
//! enabled = true
//! capacity = 64
//! ```

mod config;
mod events;
mod keys;
mod store;
mod trigger;

pub use config::CacheConfig;
pub use events::{CacheEvent, CacheSubscriber, Epoch, EventKind};
pub use keys::{Audience, MenuCacheKey};
pub use store::MenuCache;
pub use trigger::CacheTrigger;
