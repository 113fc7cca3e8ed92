//! Volunteer-facing notification inbox.

use crate::assignment::domain::VolunteerId;
use crate::notify::{
    domain::{NotificationId, NotificationRecord},
    ports::{NotificationLog, NotificationLogError},
};
use mockable::Clock;
use std::sync::Arc;

/// Read/acknowledge surface over the notification log.
#[derive(Clone)]
pub struct NotificationInbox<L, C>
where
    L: NotificationLog,
    C: Clock + Send + Sync,
{
    log: Arc<L>,
    clock: Arc<C>,
}

impl<L, C> NotificationInbox<L, C>
where
    L: NotificationLog,
    C: Clock + Send + Sync,
{
    /// Creates a new inbox.
    #[must_use]
    pub const fn new(log: Arc<L>, clock: Arc<C>) -> Self {
        Self { log, clock }
    }

    /// Lists a volunteer's notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationLogError`] when the lookup fails.
    pub async fn list(
        &self,
        volunteer_id: VolunteerId,
    ) -> Result<Vec<NotificationRecord>, NotificationLogError> {
        self.log.list_by_volunteer(volunteer_id).await
    }

    /// Marks one notification read; idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationLogError::NotFound`] when the record does not
    /// exist.
    pub async fn mark_read(
        &self,
        id: NotificationId,
    ) -> Result<NotificationRecord, NotificationLogError> {
        self.log.mark_read(id, self.clock.utc()).await
    }
}
