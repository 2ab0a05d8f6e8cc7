//! Message and identifier types for room routing
//!
//! This module defines the key types for identifying participants and the
//! messages that are fanned out to them.

use std::time::SystemTime;

use bytes::Bytes;

/// Unique identifier for a connected participant
///
/// Opaque to the core; the transport layer picks it (connection id, user id,
/// whatever is unique per connection). Ordering is used only to make registry
/// snapshots deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Create a new participant id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ParticipantId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Kind of routed message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Ordinary chat text published by a participant
    Chat,
    /// Membership notice: a participant joined the room
    Joined,
    /// Membership notice: a participant left the room
    Left,
}

/// A message routed to room members
///
/// Immutable once created; shared across delivery queues as
/// `Arc<ChatMessage>`, with the body reference-counted via `Bytes`.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    /// Kind of message
    pub kind: MessageKind,
    /// Who published it (for notices, the participant the notice is about)
    pub sender: ParticipantId,
    /// Wall-clock time at router receipt
    pub sent_at: SystemTime,
    /// Payload (zero-copy via reference counting)
    pub body: Bytes,
}

impl ChatMessage {
    /// Create a chat message stamped with the current time
    pub fn chat(sender: ParticipantId, body: impl Into<Bytes>) -> Self {
        Self {
            kind: MessageKind::Chat,
            sender,
            sent_at: SystemTime::now(),
            body: body.into(),
        }
    }

    /// Create a join notice for a participant
    pub fn joined(id: ParticipantId, name: &str) -> Self {
        Self {
            kind: MessageKind::Joined,
            sender: id,
            sent_at: SystemTime::now(),
            body: Bytes::copy_from_slice(name.as_bytes()),
        }
    }

    /// Create a leave notice for a participant
    pub fn left(id: ParticipantId, name: &str) -> Self {
        Self {
            kind: MessageKind::Left,
            sender: id,
            sent_at: SystemTime::now(),
            body: Bytes::copy_from_slice(name.as_bytes()),
        }
    }

    /// Body decoded as UTF-8, lossily
    pub fn body_text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}
