//! Bounded per-participant delivery queue
//!
//! Each room member owns exactly one `DeliveryQueue`: the router pushes into
//! it (non-blocking, from inside the room's critical section) and the
//! member's outbound write loop pops from it (async, awaiting the next item).
//! Capacity is fixed at creation; the overflow decision belongs to the
//! caller, which picks between [`DeliveryQueue::try_push`] and
//! [`DeliveryQueue::push_evicting`].
//!
//! Closing the queue is how a session's write loop learns it is done:
//! buffered items are still yielded after close, then [`DeliveryQueue::pop`]
//! returns `None`.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use crate::room::ChatMessage;

/// Error returned by a non-blocking push
#[derive(Debug)]
pub enum PushError {
    /// The queue is at capacity; the rejected message is returned
    Full(Arc<ChatMessage>),
    /// The queue was closed; the message is a no-op target
    Closed,
}

#[derive(Debug)]
struct Inner {
    items: VecDeque<Arc<ChatMessage>>,
    closed: bool,
    evicted: u64,
}

/// Bounded FIFO of messages awaiting delivery to one participant
///
/// Producer side is synchronous and never blocks; consumer side is async and
/// intended for a single consumer (the member's write loop).
#[derive(Debug)]
pub struct DeliveryQueue {
    capacity: usize,
    inner: Mutex<Inner>,
    notify: Notify,
}

impl DeliveryQueue {
    /// Create a queue with the given fixed capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(Inner {
                items: VecDeque::with_capacity(capacity.max(1)),
                closed: false,
                evicted: 0,
            }),
            notify: Notify::new(),
        }
    }

    /// The fixed capacity chosen at creation
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of messages currently buffered
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().items.len()
    }

    /// Whether the queue holds no messages
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the queue has been closed
    pub fn is_closed(&self) -> bool {
        self.inner.lock().unwrap().closed
    }

    /// Number of messages evicted by [`DeliveryQueue::push_evicting`]
    pub fn evicted(&self) -> u64 {
        self.inner.lock().unwrap().evicted
    }

    /// Push a message, failing if the queue is full or closed
    pub fn try_push(&self, msg: Arc<ChatMessage>) -> Result<(), PushError> {
        {
            let mut inner = self.inner.lock().unwrap();
            if inner.closed {
                return Err(PushError::Closed);
            }
            if inner.items.len() >= self.capacity {
                return Err(PushError::Full(msg));
            }
            inner.items.push_back(msg);
        }
        self.notify.notify_one();
        Ok(())
    }

    /// Push a message, evicting the oldest buffered one if the queue is full
    ///
    /// Returns the evicted message, if any. Pushing to a closed queue is a
    /// no-op and returns `None`.
    pub fn push_evicting(&self, msg: Arc<ChatMessage>) -> Option<Arc<ChatMessage>> {
        let evicted = {
            let mut inner = self.inner.lock().unwrap();
            if inner.closed {
                return None;
            }
            let evicted = if inner.items.len() >= self.capacity {
                inner.evicted += 1;
                inner.items.pop_front()
            } else {
                None
            };
            inner.items.push_back(msg);
            evicted
        };
        self.notify.notify_one();
        evicted
    }

    /// Await the next message
    ///
    /// Returns `None` once the queue is closed and fully drained. Buffered
    /// messages pushed before the close are still yielded.
    pub async fn pop(&self) -> Option<Arc<ChatMessage>> {
        loop {
            let notified = self.notify.notified();
            {
                let mut inner = self.inner.lock().unwrap();
                if let Some(msg) = inner.items.pop_front() {
                    return Some(msg);
                }
                if inner.closed {
                    return None;
                }
            }
            notified.await;
        }
    }

    /// Take whatever is buffered right now, without waiting
    pub fn drain(&self) -> Vec<Arc<ChatMessage>> {
        let mut inner = self.inner.lock().unwrap();
        inner.items.drain(..).collect()
    }

    /// Close the queue
    ///
    /// Idempotent. Wakes any pending [`DeliveryQueue::pop`]; subsequent
    /// pushes become no-ops.
    pub fn close(&self) {
        {
            let mut inner = self.inner.lock().unwrap();
            if inner.closed {
                return;
            }
            inner.closed = true;
        }
        self.notify.notify_waiters();
    }
}
