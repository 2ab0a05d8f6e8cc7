//! Per-connection session handle
//!
//! A `Session` is what the transport layer holds for one connected client:
//! it joins the room on construction, publishes inbound messages, yields
//! outbound messages for the write loop, and tears the membership down
//! exactly once on close or disconnect.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;

use crate::room::{ChatMessage, MemberEntry, ParticipantId, Room, RoomError};

use super::state::{PhaseCell, SessionPhase};

/// Handle for one connected participant
///
/// Intended usage is one read task calling [`Session::send`] and one write
/// task calling [`Session::recv`], sharing the session behind an `Arc`.
/// Sessions communicate only through their own delivery queue and the shared
/// room; they never touch another session's state.
pub struct Session {
    room: Arc<Room>,
    entry: Arc<MemberEntry>,
    phase: PhaseCell,
    deregistered: AtomicBool,
}

impl Session {
    /// Join the room and open a session
    ///
    /// Fails with [`RoomError::DuplicateIdentifier`] if the id is taken; the
    /// would-be session goes straight from Connecting to Closed and nothing
    /// is registered.
    pub async fn connect(
        room: Arc<Room>,
        id: ParticipantId,
        name: impl Into<String>,
    ) -> Result<Self, RoomError> {
        let phase = PhaseCell::new();
        let entry = match room.join(id, name).await {
            Ok(entry) => entry,
            Err(err) => {
                phase.finish_close();
                return Err(err);
            }
        };
        phase.activate();

        Ok(Self {
            room,
            entry,
            phase,
            deregistered: AtomicBool::new(false),
        })
    }

    /// Participant identifier
    pub fn id(&self) -> &ParticipantId {
        self.entry.id()
    }

    /// Display name
    pub fn name(&self) -> &str {
        self.entry.name()
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> SessionPhase {
        self.phase.phase()
    }

    /// Publish an inbound message to the room
    ///
    /// Returns the number of recipients. Fails with
    /// [`RoomError::UnknownSender`] once the session has left the room, for
    /// example after the slow-consumer policy removed it; the transport drops
    /// the message and carries on.
    pub async fn send(&self, body: impl Into<Bytes>) -> Result<usize, RoomError> {
        self.room.publish(self.entry.id(), body).await
    }

    /// Await the next outbound message
    ///
    /// Blocking pull for the transport's write loop. Returns `None` at
    /// end-of-stream: the queue was closed (local close, disconnect, or
    /// slow-consumer removal) and every buffered message has been yielded.
    /// Observing end-of-stream finalizes the phase machine.
    pub async fn recv(&self) -> Option<Arc<ChatMessage>> {
        match self.entry.queue().pop().await {
            Some(message) => Some(message),
            None => {
                self.finish_close().await;
                None
            }
        }
    }

    /// Close the session
    ///
    /// Idempotent. Leaves the room immediately (no new inbound, absent from
    /// subsequent broadcasts) while the write loop drains whatever is already
    /// queued; once it observes end-of-stream the phase reaches Closed.
    pub async fn close(&self) {
        self.phase.begin_drain();
        self.deregister_once().await;
    }

    /// Whether the session has reached its terminal phase
    pub fn is_closed(&self) -> bool {
        self.phase().is_terminal()
    }

    async fn finish_close(&self) {
        self.phase.finish_close();
        // Covers the paths where the room side closed us first (slow-consumer
        // removal); the registry treats a repeat leave as a no-op.
        self.deregister_once().await;
    }

    async fn deregister_once(&self) {
        if !self.deregistered.swap(true, Ordering::AcqRel) {
            self.room.leave(self.entry.id()).await;
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", self.entry.id())
            .field("name", &self.entry.name())
            .field("phase", &self.phase())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::{MessageKind, OverflowPolicy, RoomConfig};
    use tokio_test::assert_ok;

    fn id(s: &str) -> ParticipantId {
        ParticipantId::new(s)
    }

    #[tokio::test]
    async fn test_connect_send_recv() {
        let room = Arc::new(Room::new());
        let alice = Session::connect(Arc::clone(&room), id("alice"), "Alice")
            .await
            .unwrap();
        let bob = Session::connect(Arc::clone(&room), id("bob"), "Bob")
            .await
            .unwrap();

        assert_eq!(alice.phase(), SessionPhase::Active);

        // Alice sees Bob's join notice first
        let notice = alice.recv().await.unwrap();
        assert_eq!(notice.kind, MessageKind::Joined);

        assert_ok!(alice.send("hello bob").await);

        let received = bob.recv().await.unwrap();
        assert_eq!(received.kind, MessageKind::Chat);
        assert_eq!(received.sender, id("alice"));
        assert_eq!(received.body_text(), "hello bob");
    }

    #[tokio::test]
    async fn test_connect_duplicate_identifier() {
        let room = Arc::new(Room::new());
        let _alice = Session::connect(Arc::clone(&room), id("alice"), "Alice")
            .await
            .unwrap();

        let result = Session::connect(Arc::clone(&room), id("alice"), "Imposter").await;
        assert!(matches!(result, Err(RoomError::DuplicateIdentifier(_))));
        assert_eq!(room.member_count().await, 1);
    }

    #[tokio::test]
    async fn test_close_drains_then_ends() {
        let room = Arc::new(Room::new());
        let alice = Session::connect(Arc::clone(&room), id("alice"), "Alice")
            .await
            .unwrap();
        let bob = Session::connect(Arc::clone(&room), id("bob"), "Bob")
            .await
            .unwrap();

        assert_ok!(alice.send("parting words").await);
        bob.close().await;
        assert_eq!(bob.phase(), SessionPhase::Draining);

        // Queued messages still flush, then end-of-stream
        let msg = bob.recv().await.unwrap();
        assert_eq!(msg.body_text(), "parting words");
        assert!(bob.recv().await.is_none());
        assert_eq!(bob.phase(), SessionPhase::Closed);

        // Closed sessions cannot publish
        let result = bob.send("too late").await;
        assert!(matches!(result, Err(RoomError::UnknownSender(_))));

        // close is idempotent
        bob.close().await;
        assert!(bob.is_closed());
    }

    #[tokio::test]
    async fn test_recv_none_after_slow_consumer_removal() {
        let config = RoomConfig::default()
            .queue_capacity(1)
            .overflow_policy(OverflowPolicy::DisconnectSlowConsumer);
        let room = Arc::new(Room::with_config(config));

        let alice = Session::connect(Arc::clone(&room), id("alice"), "Alice")
            .await
            .unwrap();
        let bob = Session::connect(Arc::clone(&room), id("bob"), "Bob")
            .await
            .unwrap();

        // Bob never drains: second publish overflows and removes him
        assert_ok!(alice.send("m1").await);
        assert_ok!(alice.send("m2").await);
        assert!(room.lookup(bob.id()).await.is_none());

        // Bob's write loop flushes m1, then observes end-of-stream and the
        // session finalizes itself.
        assert_eq!(bob.recv().await.unwrap().body_text(), "m1");
        assert!(bob.recv().await.is_none());
        assert_eq!(bob.phase(), SessionPhase::Closed);
    }

    #[tokio::test]
    async fn test_concurrent_read_write_tasks() {
        let room = Arc::new(Room::new());
        let alice = Arc::new(
            Session::connect(Arc::clone(&room), id("alice"), "Alice")
                .await
                .unwrap(),
        );
        let bob = Arc::new(
            Session::connect(Arc::clone(&room), id("bob"), "Bob")
                .await
                .unwrap(),
        );

        let writer = {
            let bob = Arc::clone(&bob);
            tokio::spawn(async move {
                let mut chats = Vec::new();
                while let Some(msg) = bob.recv().await {
                    if msg.kind == MessageKind::Chat {
                        chats.push(msg.body_text().into_owned());
                    }
                }
                chats
            })
        };

        for n in 1..=10 {
            assert_ok!(alice.send(format!("m{n}")).await);
        }
        bob.close().await;

        let chats = writer.await.unwrap();
        assert_eq!(chats.len(), 10);
        assert_eq!(chats.first().unwrap(), "m1");
        assert_eq!(chats.last().unwrap(), "m10");
    }
}
