//! Recording event publisher for tests.

use std::sync::{Arc, Mutex};

use crate::assignment::{domain::AssignmentEvent, ports::EventPublisher};

/// Publisher that records every event it sees.
#[derive(Debug, Clone, Default)]
pub struct RecordingEventPublisher {
    events: Arc<Mutex<Vec<AssignmentEvent>>>,
}

impl RecordingEventPublisher {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all recorded events in publication order.
    #[must_use]
    pub fn events(&self) -> Vec<AssignmentEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl EventPublisher for RecordingEventPublisher {
    fn publish(&self, event: &AssignmentEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
