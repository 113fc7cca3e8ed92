//! Publishing port for assignment domain events.

use crate::assignment::domain::AssignmentEvent;

/// Fan-out contract for assignment state changes.
///
/// Publication is fire-and-forget: the engine's correctness never depends
/// on a consumer observing an event, so implementations absorb delivery
/// failures (typically by logging) instead of surfacing them.
pub trait EventPublisher: Send + Sync {
    /// Publishes one event to all current subscribers.
    fn publish(&self, event: &AssignmentEvent);
}
