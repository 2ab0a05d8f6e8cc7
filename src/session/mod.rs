//! Per-connection session lifecycle
//!
//! Each connection is modeled as a [`Session`] moving through a one-way
//! phase machine: `Connecting -> Active -> Draining -> Closed`. The
//! transport layer runs two tasks per connection, a read loop feeding
//! [`Session::send`] and a write loop pulling from [`Session::recv`]; both
//! stop promptly once the session closes, and deregistration from the room
//! happens exactly once no matter which side initiated the teardown.

pub mod handle;
pub mod state;

pub use handle::Session;
pub use state::SessionPhase;
