//! Member entry and state types
//!
//! This module defines the per-participant state stored in the room.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::delivery::DeliveryQueue;

use super::message::ParticipantId;

/// Connection state of a room member
///
/// Transitions are one-directional: `Active -> Draining -> Closed`, with
/// `Active -> Closed` allowed as a shortcut when there is nothing to flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberState {
    /// Member is registered and receiving messages
    Active,
    /// No new inbound accepted; outbound queue is flushing
    Draining,
    /// Terminal; member is gone from the registry
    Closed,
}

/// Entry for a single participant in the room
///
/// Shared between the registry map and the participant's [`crate::Session`];
/// interior state is synchronized so the router can transition members from
/// inside its critical section.
#[derive(Debug)]
pub struct MemberEntry {
    /// Participant identifier (unique among live members)
    id: ParticipantId,

    /// Display name, immutable after join
    name: String,

    /// Outbound delivery queue, consumed only by this member's write loop
    queue: Arc<DeliveryQueue>,

    /// Current connection state
    state: Mutex<MemberState>,

    /// When the member joined
    joined_at: Instant,
}

impl MemberEntry {
    pub(super) fn new(id: ParticipantId, name: String, queue_capacity: usize) -> Self {
        Self {
            id,
            name,
            queue: Arc::new(DeliveryQueue::with_capacity(queue_capacity)),
            state: Mutex::new(MemberState::Active),
            joined_at: Instant::now(),
        }
    }

    /// Participant identifier
    pub fn id(&self) -> &ParticipantId {
        &self.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The member's delivery queue
    pub fn queue(&self) -> &Arc<DeliveryQueue> {
        &self.queue
    }

    /// Current connection state
    pub fn state(&self) -> MemberState {
        *self.state.lock().unwrap()
    }

    /// Whether the member is accepting inbound messages
    pub fn is_active(&self) -> bool {
        self.state() == MemberState::Active
    }

    /// Time since the member joined
    pub fn connected_for(&self) -> std::time::Duration {
        self.joined_at.elapsed()
    }

    /// Transition `Active -> Draining`; no-op in any other state
    pub(crate) fn begin_drain(&self) {
        let mut state = self.state.lock().unwrap();
        if *state == MemberState::Active {
            *state = MemberState::Draining;
        }
    }

    /// Transition to `Closed` and close the delivery queue
    ///
    /// Idempotent; a closed member never resurrects. Buffered outbound
    /// messages are still flushed by the write loop before it observes
    /// end-of-stream.
    pub(crate) fn close(&self) {
        {
            let mut state = self.state.lock().unwrap();
            if *state == MemberState::Closed {
                return;
            }
            *state = MemberState::Closed;
        }
        self.queue.close();
    }

    /// Build a point-in-time view of this member
    pub(super) fn info(&self) -> MemberInfo {
        MemberInfo {
            id: self.id.clone(),
            name: self.name.clone(),
            state: self.state(),
            queued: self.queue.len(),
            evicted: self.queue.evicted(),
            connected_for: self.connected_for(),
        }
    }
}

/// Point-in-time view of a member, as returned by snapshots and lookups
#[derive(Debug, Clone)]
pub struct MemberInfo {
    /// Participant identifier
    pub id: ParticipantId,
    /// Display name
    pub name: String,
    /// Connection state at snapshot time
    pub state: MemberState,
    /// Messages buffered in the delivery queue at snapshot time
    pub queued: usize,
    /// Messages evicted from the delivery queue so far
    pub evicted: u64,
    /// How long the member has been connected
    pub connected_for: std::time::Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_member_is_active() {
        let entry = MemberEntry::new(ParticipantId::new("alice"), "Alice".into(), 8);
        assert_eq!(entry.state(), MemberState::Active);
        assert!(entry.is_active());
        assert_eq!(entry.queue().capacity(), 8);
    }

    #[test]
    fn test_state_transitions_forward_only() {
        let entry = MemberEntry::new(ParticipantId::new("alice"), "Alice".into(), 8);

        entry.begin_drain();
        assert_eq!(entry.state(), MemberState::Draining);

        // Draining members accept no new inbound
        assert!(!entry.is_active());

        entry.close();
        assert_eq!(entry.state(), MemberState::Closed);
        assert!(entry.queue().is_closed());

        // No resurrection
        entry.begin_drain();
        assert_eq!(entry.state(), MemberState::Closed);
    }

    #[test]
    fn test_close_is_idempotent() {
        let entry = MemberEntry::new(ParticipantId::new("alice"), "Alice".into(), 8);
        entry.close();
        entry.close();
        assert_eq!(entry.state(), MemberState::Closed);
    }

    #[test]
    fn test_info_snapshot() {
        let entry = MemberEntry::new(ParticipantId::new("alice"), "Alice".into(), 8);
        let info = entry.info();
        assert_eq!(info.id.as_str(), "alice");
        assert_eq!(info.name, "Alice");
        assert_eq!(info.state, MemberState::Active);
        assert_eq!(info.queued, 0);
        // Freshly joined, so the clock has barely moved
        assert!(info.connected_for < std::time::Duration::from_secs(5));
    }
}
