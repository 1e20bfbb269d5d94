//! Room registry: exactly one live room per room id.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use noughts_protocol::RoomId;

use crate::room::spawn_room;
use crate::{RoomConfig, RoomHandle};

struct Entry {
    handle: RoomHandle,
    /// Connections that have attached and not yet been released.
    attached: usize,
}

/// Maps room ids to running room actors.
///
/// Rooms are created on first reference and evicted when the last
/// connection referencing them is released. The lock covers only the
/// lookup-or-create and the release bookkeeping; no room operation ever
/// runs under it.
pub struct RoomRegistry {
    rooms: Mutex<HashMap<RoomId, Entry>>,
    config: RoomConfig,
}

impl RoomRegistry {
    pub fn new(config: RoomConfig) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            config,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<RoomId, Entry>> {
        self.rooms.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the room for `room_id`, spawning it if absent, and counts
    /// one more connection against it.
    ///
    /// Every call must be paired with a later
    /// [`release_if_idle`](Self::release_if_idle).
    pub fn get_or_create(&self, room_id: &RoomId) -> RoomHandle {
        let mut rooms = self.lock();
        let entry = rooms.entry(room_id.clone()).or_insert_with(|| {
            tracing::info!(%room_id, "room created");
            Entry {
                handle: spawn_room(room_id.clone(), &self.config),
                attached: 0,
            }
        });
        entry.attached += 1;
        entry.handle.clone()
    }

    /// Releases one connection's reference and evicts the room once none
    /// remain. Returns whether the room was evicted.
    ///
    /// Callers detach from the room first, so by the time the count reaches
    /// zero the room has no subscribers and therefore no seats or
    /// spectators.
    pub async fn release_if_idle(&self, room_id: &RoomId) -> bool {
        let evicted = {
            let mut rooms = self.lock();
            let remaining = match rooms.get_mut(room_id) {
                Some(entry) => {
                    entry.attached = entry.attached.saturating_sub(1);
                    entry.attached
                }
                None => return false,
            };
            if remaining == 0 {
                rooms.remove(room_id).map(|e| e.handle)
            } else {
                None
            }
        };

        match evicted {
            Some(handle) => {
                tracing::info!(%room_id, "room evicted");
                let _ = handle.shutdown().await;
                true
            }
            None => false,
        }
    }

    /// Number of live rooms.
    pub fn room_count(&self) -> usize {
        self.lock().len()
    }

    pub fn contains(&self, room_id: &RoomId) -> bool {
        self.lock().contains_key(room_id)
    }

    /// Stops every room. Used on server shutdown.
    pub async fn shutdown_all(&self) {
        let handles: Vec<RoomHandle> = self
            .lock()
            .drain()
            .map(|(_, entry)| entry.handle)
            .collect();
        for handle in handles {
            let _ = handle.shutdown().await;
        }
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(RoomConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn test_same_id_same_room() {
        let registry = RoomRegistry::default();
        let a = registry.get_or_create(&RoomId::from("r1"));
        let b = registry.get_or_create(&RoomId::from("r1"));
        let c = registry.get_or_create(&RoomId::from("r2"));
        assert_eq!(registry.room_count(), 2);
        assert_eq!(a.room_id(), b.room_id());
        assert_ne!(a.room_id(), c.room_id());
    }

    #[tokio::test]
    async fn test_evicts_after_last_release() {
        let registry = RoomRegistry::default();
        let room = RoomId::from("r1");
        let handle = registry.get_or_create(&room);
        registry.get_or_create(&room);

        assert!(!registry.release_if_idle(&room).await);
        assert!(registry.contains(&room));
        assert!(registry.release_if_idle(&room).await);
        assert!(!registry.contains(&room));

        // The evicted actor stops.
        tokio::time::timeout(std::time::Duration::from_secs(1), async {
            while !handle.is_closed() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
        assert!(handle.info().await.is_err());
    }

    #[tokio::test]
    async fn test_release_of_unknown_room_is_noop() {
        let registry = RoomRegistry::default();
        assert!(!registry.release_if_idle(&RoomId::from("nope")).await);
    }

    #[tokio::test]
    async fn test_reference_after_eviction_creates_fresh_room() {
        let registry = RoomRegistry::default();
        let room = RoomId::from("r1");
        let first = registry.get_or_create(&room);
        registry.release_if_idle(&room).await;

        let second = registry.get_or_create(&room);
        let info = second.info().await.unwrap();
        assert_eq!(info.subscribers, 0);
        assert!(info.active_game.is_none());
        drop(first);
    }

    #[tokio::test]
    async fn test_concurrent_references_share_one_room() {
        let registry = Arc::new(RoomRegistry::default());
        let room = RoomId::from("busy");
        let tasks: Vec<_> = (0..32)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let room = room.clone();
                tokio::spawn(async move { registry.get_or_create(&room) })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(registry.room_count(), 1);

        for _ in 0..31 {
            assert!(!registry.release_if_idle(&room).await);
        }
        assert!(registry.release_if_idle(&room).await);
        assert_eq!(registry.room_count(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_all() {
        let registry = RoomRegistry::default();
        let a = registry.get_or_create(&RoomId::from("a"));
        registry.get_or_create(&RoomId::from("b"));
        registry.shutdown_all().await;
        assert_eq!(registry.room_count(), 0);
        tokio::time::timeout(std::time::Duration::from_secs(1), async {
            while !a.is_closed() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
    }
}
