//! Participant registry and broadcast router
//!
//! The room tracks connected participants and routes every published message
//! to all other members' delivery queues. Registry and router deliberately
//! share one lock: a publish snapshots membership and enqueues to every
//! recipient as a single critical section, so a broadcast can never straddle
//! two membership views and per-sender ordering falls out of the lock
//! discipline.
//!
//! # Architecture
//!
//! ```text
//!                            Arc<Room>
//!                  ┌──────────────────────────┐
//!                  │ members: HashMap<        │
//!                  │   ParticipantId,         │
//!                  │   Arc<MemberEntry> {     │
//!                  │     name, state,         │
//!                  │     queue: DeliveryQueue │
//!                  │   }                      │
//!                  │ >                        │
//!                  └────────────┬─────────────┘
//!                               │
//!        ┌──────────────────────┼──────────────────────┐
//!        │                      │                      │
//!        ▼                      ▼                      ▼
//!   [member read loop]    [member write loop]    [member write loop]
//!   room.publish()        queue.pop().await      queue.pop().await
//! ```
//!
//! A full recipient queue never blocks the publisher: the configured
//! [`OverflowPolicy`] either evicts that recipient's oldest message or
//! removes the recipient from the room.

pub mod config;
pub mod entry;
pub mod error;
pub mod message;
pub mod store;

pub use config::{OverflowPolicy, RoomConfig};
pub use entry::{MemberEntry, MemberInfo, MemberState};
pub use error::RoomError;
pub use message::{ChatMessage, MessageKind, ParticipantId};
pub use store::Room;
