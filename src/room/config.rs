//! Room configuration

/// Backpressure policy applied when a recipient's delivery queue is full
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Evict the oldest undelivered message to admit the new one.
    ///
    /// Recipients are guaranteed the most recent `queue_capacity` messages;
    /// a drop counter on the queue records the discontinuity.
    DropOldest,
    /// Close the slow recipient's session.
    ///
    /// No message is silently dropped, but a consumer that cannot keep up is
    /// removed from the room. Buffered messages are still flushed before the
    /// outbound stream ends.
    DisconnectSlowConsumer,
}

/// Room configuration options
#[derive(Debug, Clone)]
pub struct RoomConfig {
    /// Room name, used for logging and diagnostics
    pub name: String,

    /// Capacity of each participant's delivery queue
    pub queue_capacity: usize,

    /// Policy applied when a delivery queue is full
    pub overflow_policy: OverflowPolicy,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            name: "main".to_string(),
            queue_capacity: 64,
            overflow_policy: OverflowPolicy::DropOldest,
        }
    }
}

impl RoomConfig {
    /// Create a config with a custom room name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the room name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the per-participant delivery queue capacity
    ///
    /// A capacity of zero is bumped to one; a queue that can hold nothing
    /// would close every recipient on the first publish.
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Set the overflow policy
    pub fn overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.overflow_policy = policy;
        self
    }
}
