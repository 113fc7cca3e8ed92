//! Broadcast-channel event publisher.
//!
//! Wraps a `tokio::sync::broadcast` channel so any number of consumers
//! (status projection, dashboard push feeds) can subscribe to assignment
//! state changes without the engine tracking them individually.

use tokio::sync::broadcast;

use crate::assignment::{domain::AssignmentEvent, ports::EventPublisher};

/// Event publisher backed by a broadcast channel.
#[derive(Debug, Clone)]
pub struct BroadcastEventPublisher {
    sender: broadcast::Sender<AssignmentEvent>,
}

impl BroadcastEventPublisher {
    /// Creates a publisher whose channel buffers up to `capacity` events.
    ///
    /// Slow subscribers that fall more than `capacity` events behind
    /// observe a lag error on their receiver and should fall back to a
    /// full refresh.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Opens a new subscription to the event feed.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AssignmentEvent> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastEventPublisher {
    fn default() -> Self {
        Self::new(64)
    }
}

impl EventPublisher for BroadcastEventPublisher {
    fn publish(&self, event: &AssignmentEvent) {
        if self.sender.send(event.clone()).is_err() {
            tracing::trace!(kind = event.kind(), "no event subscribers; change feed dropped");
        }
    }
}
