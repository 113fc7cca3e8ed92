//! Delivery channel port for outbound notifications.

use crate::notify::domain::EmailMessage;
use async_trait::async_trait;
use thiserror::Error;

/// A transport failure while delivering a notification.
///
/// Delivery errors are retried with backoff by the dispatcher; the
/// assignment stays `pending` until a delivery succeeds, so no state is
/// lost when a channel is unreachable.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("delivery failed: {reason}")]
pub struct DeliveryError {
    /// Description of the transport failure.
    pub reason: String,
}

impl DeliveryError {
    /// Creates a delivery error.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Outbound delivery contract.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Delivers one message.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError`] when the transport is unreachable or
    /// rejects the message.
    async fn deliver(&self, message: &EmailMessage) -> Result<(), DeliveryError>;
}
