//! Subscriber bus: a synchronous observer fan-out over cache and I/O events.
//!
//! Subscribers are invoked in registration order and must not call back into
//! the array that is notifying them (no reentrancy). `on_event` returns a
//! `Result`: an `Err` propagates straight out of the array operation that
//! raised the event (the caller sees it composed into
//! [`crate::error::PersistentArrayError`] via the usual `?`), which is how a
//! subscriber failure aborts the surrounding operation without corrupting
//! the array's own state — the event fires only after the corresponding
//! state change has already happened.

use tracing::{debug, info, warn};

use crate::error::PersistentArrayError;

/// Which chunk dimension a [`ArrayEvent::ChunkResized`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKind {
    Read,
    Write,
    Memory,
}

/// One observable event raised by [`crate::array::PersistentArray`].
#[derive(Debug, Clone)]
pub enum ArrayEvent {
    FileCreated,
    CacheMiss { index: i64 },
    RecordSerialized { index: i64 },
    RecordDeserialized { index: i64 },
    ChunkSerialized,
    ChunkDeserialized,
    WriteCollision { prior: i64, incoming: i64 },
    ChunkResized {
        kind: ChunkKind,
        prior: usize,
        next: usize,
    },
}

/// Receiver of array events. Implementors are shared (`Arc`) across readers
/// and invoked synchronously; they must not mutate the array. Returning
/// `Err` aborts the array operation that raised the event.
pub trait ArraySubscriber: Send + Sync {
    fn on_event(&self, event: &ArrayEvent) -> Result<(), PersistentArrayError>;
}

/// Built-in subscriber forwarding every event to `tracing`, at the same
/// granularity the bus fires them: cache/IO-level detail at `debug`,
/// chunk-level milestones at `info`, anomalies (collisions) at `warn`.
/// Never fails — logging cannot itself raise an `ArraySubscriber` error.
pub struct TracingSubscriber;

impl ArraySubscriber for TracingSubscriber {
    fn on_event(&self, event: &ArrayEvent) -> Result<(), PersistentArrayError> {
        match event {
            ArrayEvent::FileCreated => info!("persistent array file created"),
            ArrayEvent::CacheMiss { index } => debug!(index, "cache miss"),
            ArrayEvent::RecordSerialized { index } => debug!(index, "record serialized"),
            ArrayEvent::RecordDeserialized { index } => debug!(index, "record deserialized"),
            ArrayEvent::ChunkSerialized => info!("chunk flushed to disk"),
            ArrayEvent::ChunkDeserialized => info!("chunk loaded from disk"),
            ArrayEvent::WriteCollision { prior, incoming } => {
                warn!(prior, incoming, "write collision: evicting dirty predecessor")
            }
            ArrayEvent::ChunkResized { kind, prior, next } => {
                info!(?kind, prior, next, "chunk resized")
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingSubscriber(Mutex<Vec<String>>);

    impl ArraySubscriber for RecordingSubscriber {
        fn on_event(&self, event: &ArrayEvent) -> Result<(), PersistentArrayError> {
            self.0.lock().unwrap().push(format!("{event:?}"));
            Ok(())
        }
    }

    struct FailingSubscriber;

    impl ArraySubscriber for FailingSubscriber {
        fn on_event(&self, _event: &ArrayEvent) -> Result<(), PersistentArrayError> {
            Err(PersistentArrayError::BadHeader("subscriber refused the event".into()))
        }
    }

    #[test]
    fn records_events_in_order() {
        let sub = RecordingSubscriber(Mutex::new(Vec::new()));
        sub.on_event(&ArrayEvent::FileCreated).unwrap();
        sub.on_event(&ArrayEvent::CacheMiss { index: 3 }).unwrap();
        let log = sub.0.into_inner().unwrap();
        assert_eq!(log.len(), 2);
        assert!(log[0].contains("FileCreated"));
        assert!(log[1].contains("CacheMiss"));
    }

    #[test]
    fn failing_subscriber_surfaces_its_error() {
        let sub = FailingSubscriber;
        assert!(sub.on_event(&ArrayEvent::FileCreated).is_err());
    }
}
