//! Room implementation
//!
//! The central structure that registers participants and routes published
//! messages to every other member's delivery queue.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::RwLock;

use crate::delivery::{DeliveryQueue, PushError};
use crate::stats::{RoomCounters, RoomStats};

use super::config::{OverflowPolicy, RoomConfig};
use super::entry::{MemberEntry, MemberInfo};
use super::error::RoomError;
use super::message::{ChatMessage, ParticipantId};

/// A single broadcast domain
///
/// Registry and router in one structure, guarded by one `RwLock`: `publish`
/// takes the write lock so its snapshot-and-fanout runs as a single critical
/// section, serialized against membership changes and other publishes. That
/// one lock is what gives per-sender FIFO and keeps a broadcast from
/// straddling two membership views.
///
/// Rooms are independent instances; share one with `Arc<Room>`, never through
/// global state.
pub struct Room {
    /// Map of participant id to member entry
    members: RwLock<HashMap<ParticipantId, Arc<MemberEntry>>>,

    /// Closed members whose queues still hold undelivered messages
    ///
    /// Lets [`Room::next_outbound`] keep flushing a departed member's queue;
    /// each tombstone is dropped once its queue yields end-of-stream.
    draining: Mutex<HashMap<ParticipantId, Arc<DeliveryQueue>>>,

    /// Configuration
    config: RoomConfig,

    /// Lifetime counters
    counters: RoomCounters,
}

impl Room {
    /// Create a room with default configuration
    pub fn new() -> Self {
        Self::with_config(RoomConfig::default())
    }

    /// Create a room with custom configuration
    pub fn with_config(config: RoomConfig) -> Self {
        Self {
            members: RwLock::new(HashMap::new()),
            draining: Mutex::new(HashMap::new()),
            config,
            counters: RoomCounters::default(),
        }
    }

    /// Get the room configuration
    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Register a participant
    ///
    /// Fails if the identifier is already registered. On success the new
    /// member is visible to subsequent broadcasts, and a join notice is
    /// fanned out to everyone else in the same critical section.
    pub async fn join(
        &self,
        id: ParticipantId,
        name: impl Into<String>,
    ) -> Result<Arc<MemberEntry>, RoomError> {
        let name = name.into();
        let mut members = self.members.write().await;

        if members.contains_key(&id) {
            return Err(RoomError::DuplicateIdentifier(id));
        }

        let entry = Arc::new(MemberEntry::new(
            id.clone(),
            name.clone(),
            self.config.queue_capacity,
        ));
        members.insert(id.clone(), Arc::clone(&entry));
        self.counters.record_join();

        let notice = Arc::new(ChatMessage::joined(id.clone(), &name));
        self.fanout_locked(&mut members, &notice, Some(&id));

        tracing::info!(
            room = %self.config.name,
            member = %id,
            members = members.len(),
            "Member joined"
        );

        Ok(entry)
    }

    /// Deregister a participant
    ///
    /// Idempotent: removing an absent identifier is a no-op. The member's
    /// queue is closed so its write loop flushes buffered messages and then
    /// observes end-of-stream; a leave notice goes to the remaining members.
    pub async fn leave(&self, id: &ParticipantId) {
        let mut members = self.members.write().await;

        let Some(entry) = members.remove(id) else {
            tracing::debug!(room = %self.config.name, member = %id, "Leave for absent member");
            return;
        };

        entry.begin_drain();
        entry.close();
        self.retain_for_drain(id, entry.queue());

        let notice = Arc::new(ChatMessage::left(id.clone(), entry.name()));
        self.fanout_locked(&mut members, &notice, None);

        tracing::info!(
            room = %self.config.name,
            member = %id,
            members = members.len(),
            "Member left"
        );
    }

    /// Publish a message from a participant to every other member
    ///
    /// Fails with [`RoomError::UnknownSender`] if the sender is not a
    /// registered, active member. The sender never receives its own message.
    /// Enqueues are non-blocking; a full recipient queue is handled by the
    /// configured [`OverflowPolicy`] without stalling the publisher.
    ///
    /// Returns the number of queues the message was enqueued onto.
    pub async fn publish(
        &self,
        sender: &ParticipantId,
        body: impl Into<bytes::Bytes>,
    ) -> Result<usize, RoomError> {
        let mut members = self.members.write().await;

        let known = members.get(sender).map(|e| e.is_active()).unwrap_or(false);
        if !known {
            tracing::debug!(
                room = %self.config.name,
                sender = %sender,
                "Publish from unknown or draining sender"
            );
            return Err(RoomError::UnknownSender(sender.clone()));
        }

        let message = Arc::new(ChatMessage::chat(sender.clone(), body.into()));
        self.counters.record_publish();

        let delivered = self.fanout_locked(&mut members, &message, Some(sender));

        tracing::trace!(
            room = %self.config.name,
            sender = %sender,
            recipients = delivered,
            "Message routed"
        );

        Ok(delivered)
    }

    /// Enqueue a message onto every member's queue except `exclude`'s
    ///
    /// Runs under the write lock held by the caller, so the membership view
    /// cannot change mid-broadcast. Iterates in sorted id order for
    /// deterministic delivery. Members removed by the slow-consumer policy
    /// are closed and taken out of the map before the lock is released.
    fn fanout_locked(
        &self,
        members: &mut HashMap<ParticipantId, Arc<MemberEntry>>,
        message: &Arc<ChatMessage>,
        exclude: Option<&ParticipantId>,
    ) -> usize {
        let mut targets: Vec<ParticipantId> = members
            .keys()
            .filter(|id| Some(*id) != exclude)
            .cloned()
            .collect();
        targets.sort();

        let mut delivered = 0;
        let mut slow: Vec<ParticipantId> = Vec::new();

        for id in &targets {
            let Some(entry) = members.get(id) else {
                continue;
            };

            match self.config.overflow_policy {
                OverflowPolicy::DropOldest => {
                    if entry.queue().push_evicting(Arc::clone(message)).is_some() {
                        self.counters.record_drop();
                        tracing::debug!(
                            room = %self.config.name,
                            member = %id,
                            "Delivery queue full, dropped oldest message"
                        );
                    }
                    if !entry.queue().is_closed() {
                        delivered += 1;
                    }
                }
                OverflowPolicy::DisconnectSlowConsumer => {
                    match entry.queue().try_push(Arc::clone(message)) {
                        Ok(()) => delivered += 1,
                        Err(PushError::Full(_)) => {
                            entry.begin_drain();
                            slow.push(id.clone());
                        }
                        // Queue closed under us: a just-removed recipient is
                        // a no-op target.
                        Err(PushError::Closed) => {}
                    }
                }
            }
        }

        for id in slow {
            if let Some(entry) = members.remove(&id) {
                entry.close();
                self.retain_for_drain(&id, entry.queue());
                self.counters.record_slow_disconnect();
                tracing::warn!(
                    room = %self.config.name,
                    member = %id,
                    queued = entry.queue().len(),
                    "Slow consumer disconnected"
                );
            }
        }

        delivered
    }

    /// Keep a departed member's queue reachable until it is drained
    fn retain_for_drain(&self, id: &ParticipantId, queue: &Arc<DeliveryQueue>) {
        if !queue.is_empty() {
            self.draining
                .lock()
                .unwrap()
                .insert(id.clone(), Arc::clone(queue));
        }
    }

    /// Await the next outbound message for a participant
    ///
    /// Blocking pull for the transport's write loop. Returns `None` once the
    /// participant's queue is closed and drained (session reached Closed), or
    /// if the identifier was never registered. A member that has left still
    /// yields its buffered messages here before end-of-stream.
    pub async fn next_outbound(&self, id: &ParticipantId) -> Option<Arc<ChatMessage>> {
        let live = {
            let members = self.members.read().await;
            members.get(id).map(|entry| Arc::clone(entry.queue()))
        };
        let queue = match live {
            Some(queue) => queue,
            None => Arc::clone(self.draining.lock().unwrap().get(id)?),
        };

        match queue.pop().await {
            Some(message) => Some(message),
            None => {
                self.draining.lock().unwrap().remove(id);
                None
            }
        }
    }

    /// Consistent point-in-time view of membership, sorted by id
    pub async fn snapshot(&self) -> Vec<MemberInfo> {
        let members = self.members.read().await;
        let mut infos: Vec<MemberInfo> = members.values().map(|entry| entry.info()).collect();
        infos.sort_by(|a, b| a.id.cmp(&b.id));
        infos
    }

    /// Look up a single member
    pub async fn lookup(&self, id: &ParticipantId) -> Option<MemberInfo> {
        let members = self.members.read().await;
        members.get(id).map(|entry| entry.info())
    }

    /// Number of registered members
    pub async fn member_count(&self) -> usize {
        self.members.read().await.len()
    }

    /// Whether the room has no members
    pub async fn is_empty(&self) -> bool {
        self.members.read().await.is_empty()
    }

    /// Room statistics
    pub async fn stats(&self) -> RoomStats {
        let active = self.member_count().await;
        self.counters.snapshot(active)
    }
}

impl Default for Room {
    fn default() -> Self {
        Self::new()
    }
}
