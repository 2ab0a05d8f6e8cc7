//! Room-wide statistics

use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time statistics for a room
#[derive(Debug, Clone, Default)]
pub struct RoomStats {
    /// Members currently registered
    pub active_members: usize,
    /// Total joins over the room's lifetime
    pub total_joins: u64,
    /// Messages accepted by the router
    pub messages_published: u64,
    /// Messages evicted from full delivery queues (DropOldest)
    pub messages_dropped: u64,
    /// Members removed by the slow-consumer policy
    pub slow_disconnects: u64,
}

/// Lifetime counters kept on the room
///
/// Updated with relaxed atomics; exact cross-counter consistency is not
/// needed for diagnostics.
#[derive(Debug, Default)]
pub(crate) struct RoomCounters {
    total_joins: AtomicU64,
    messages_published: AtomicU64,
    messages_dropped: AtomicU64,
    slow_disconnects: AtomicU64,
}

impl RoomCounters {
    pub(crate) fn record_join(&self) {
        self.total_joins.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_publish(&self) {
        self.messages_published.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_drop(&self) {
        self.messages_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_slow_disconnect(&self) {
        self.slow_disconnects.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, active_members: usize) -> RoomStats {
        RoomStats {
            active_members,
            total_joins: self.total_joins.load(Ordering::Relaxed),
            messages_published: self.messages_published.load(Ordering::Relaxed),
            messages_dropped: self.messages_dropped.load(Ordering::Relaxed),
            slow_disconnects: self.slow_disconnects.load(Ordering::Relaxed),
        }
    }
}
