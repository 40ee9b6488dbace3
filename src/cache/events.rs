//! Cache events published by the post write path.

use time::OffsetDateTime;
use uuid::Uuid;

/// Monotonic per-process sequence number of a published event.
pub type Epoch = u64;

#[derive(Debug, Clone)]
pub struct CacheEvent {
    /// Unique identifier for log correlation (UUIDv4).
    pub id: Uuid,
    pub epoch: Epoch,
    pub kind: EventKind,
    pub timestamp: OffsetDateTime,
}

impl CacheEvent {
    pub fn new(kind: EventKind, epoch: Epoch) -> Self {
        Self {
            id: Uuid::new_v4(),
            epoch,
            kind,
            timestamp: OffsetDateTime::now_utc(),
        }
    }
}

/// Post mutations that invalidate navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    PostCreated { post_id: Uuid, slug: String },
    PostUpdated { post_id: Uuid, slug: String },
    PostDeleted { post_id: Uuid, slug: String },
    PostsBulkDeleted { post_ids: Vec<Uuid> },
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::PostCreated { .. } => "post_created",
            EventKind::PostUpdated { .. } => "post_updated",
            EventKind::PostDeleted { .. } => "post_deleted",
            EventKind::PostsBulkDeleted { .. } => "posts_bulk_deleted",
        }
    }
}

/// Receives events synchronously, before the publishing write returns.
pub trait CacheSubscriber: Send + Sync {
    fn on_event(&self, event: &CacheEvent);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_creation() {
        let kind = EventKind::PostDeleted {
            post_id: Uuid::nil(),
            slug: "farewell".to_string(),
        };
        let event = CacheEvent::new(kind.clone(), 7);

        assert_eq!(event.epoch, 7);
        assert_eq!(event.kind, kind);
        assert!(!event.id.is_nil());
        assert_eq!(event.kind.as_str(), "post_deleted");
    }

    #[test]
    fn event_kind_equality() {
        let created = EventKind::PostCreated {
            post_id: Uuid::nil(),
            slug: "hello".to_string(),
        };
        let updated = EventKind::PostUpdated {
            post_id: Uuid::nil(),
            slug: "hello".to_string(),
        };
        assert_ne!(created, updated);
        assert_eq!(created.clone(), created);
    }
}
