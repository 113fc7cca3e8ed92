//! Recording delivery channel for tests.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::notify::{
    domain::EmailMessage,
    ports::{DeliveryError, NotificationChannel},
};

/// Channel that records deliveries and can fail on demand.
///
/// Configure a number of leading failures to exercise the dispatcher's
/// retry path; every delivery after that succeeds and is recorded.
#[derive(Debug, Clone, Default)]
pub struct RecordingChannel {
    state: Arc<Mutex<RecordingChannelState>>,
}

#[derive(Debug, Default)]
struct RecordingChannelState {
    deliveries: Vec<EmailMessage>,
    failures_remaining: u32,
    attempts: u32,
}

impl RecordingChannel {
    /// Creates a channel that accepts every delivery.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a channel that rejects the first `failures` deliveries.
    #[must_use]
    pub fn failing(failures: u32) -> Self {
        let channel = Self::default();
        if let Ok(mut state) = channel.state.lock() {
            state.failures_remaining = failures;
        }
        channel
    }

    /// Returns every message delivered so far, in order.
    #[must_use]
    pub fn deliveries(&self) -> Vec<EmailMessage> {
        self.state
            .lock()
            .map(|state| state.deliveries.clone())
            .unwrap_or_default()
    }

    /// Returns the number of delivery attempts, failed ones included.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.state.lock().map(|state| state.attempts).unwrap_or(0)
    }
}

#[async_trait]
impl NotificationChannel for RecordingChannel {
    async fn deliver(&self, message: &EmailMessage) -> Result<(), DeliveryError> {
        let mut state = self
            .state
            .lock()
            .map_err(|err| DeliveryError::new(err.to_string()))?;
        state.attempts += 1;
        if state.failures_remaining > 0 {
            state.failures_remaining -= 1;
            return Err(DeliveryError::new("injected channel failure"));
        }
        state.deliveries.push(message.clone());
        Ok(())
    }
}
