//! Chat room broadcast core
//!
//! `roomcast` implements the in-memory heart of a chat server: a registry of
//! connected participants, a router that fans published messages out to every
//! other participant, bounded per-participant delivery queues, and a
//! per-connection session lifecycle. The transport layer (RPC framing, socket
//! handling) lives outside this crate and drives it through [`Session`] and
//! [`Room`].
//!
//! # Architecture
//!
//! ```text
//!                             Arc<Room>
//!                  ┌────────────────────────────┐
//!                  │ members: HashMap<          │
//!                  │   ParticipantId,           │
//!                  │   Arc<MemberEntry> {       │
//!                  │     state, queue,          │
//!                  │   }                        │
//!                  │ >                          │
//!                  └──────────────┬─────────────┘
//!                                 │
//!          ┌──────────────────────┼──────────────────────┐
//!          │                      │                      │
//!          ▼                      ▼                      ▼
//!     [Session A]            [Session B]            [Session C]
//!     send("hi")             recv().await           recv().await
//!          │                      ▲                      ▲
//!          └──► room.publish() ───┴──────────────────────┘
//!               (snapshot + fan-out, one critical section)
//! ```
//!
//! Each connection runs two independent tasks: a read loop calling
//! [`Session::send`] and a write loop calling [`Session::recv`]. Sessions
//! never touch each other's state; the only shared structure is the `Room`,
//! and the only per-session channel is the member's own delivery queue.
//!
//! # Zero-copy fan-out
//!
//! Message bodies are `bytes::Bytes` and whole messages are shared as
//! `Arc<ChatMessage>`, so fanning a message out to N recipients clones two
//! reference counts per recipient, never the payload.

pub mod delivery;
pub mod room;
pub mod session;
pub mod stats;

pub use delivery::{DeliveryQueue, PushError};
pub use room::{
    ChatMessage, MemberInfo, MemberState, MessageKind, OverflowPolicy, ParticipantId, Room,
    RoomConfig, RoomError,
};
pub use session::{Session, SessionPhase};
pub use stats::RoomStats;
