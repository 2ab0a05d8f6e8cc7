//! Room error types
//!
//! Error types for registry and router operations. None of these are fatal:
//! each failure is scoped to a single join attempt or a single message.

use super::message::ParticipantId;

/// Error type for room operations
#[derive(Debug, Clone)]
pub enum RoomError {
    /// A participant with this identifier is already registered
    DuplicateIdentifier(ParticipantId),
    /// The sender is not a registered, active participant
    UnknownSender(ParticipantId),
}

impl std::fmt::Display for RoomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoomError::DuplicateIdentifier(id) => {
                write!(f, "Participant already registered: {}", id)
            }
            RoomError::UnknownSender(id) => write!(f, "Unknown sender: {}", id),
        }
    }
}

impl std::error::Error for RoomError {}
