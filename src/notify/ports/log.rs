//! Persistence port for notification records.

use crate::assignment::domain::{AssignmentId, VolunteerId};
use crate::notify::domain::{NotificationId, NotificationRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for notification log operations.
pub type NotificationLogResult<T> = Result<T, NotificationLogError>;

/// Durable record of every delivery attempt.
#[async_trait]
pub trait NotificationLog: Send + Sync {
    /// Appends one delivery record.
    async fn append(&self, record: &NotificationRecord) -> NotificationLogResult<()>;

    /// Finds a record by identifier.
    ///
    /// Returns `None` when the record does not exist.
    async fn find_by_id(
        &self,
        id: NotificationId,
    ) -> NotificationLogResult<Option<NotificationRecord>>;

    /// Returns all records for an assignment, newest first.
    async fn list_by_assignment(
        &self,
        assignment_id: AssignmentId,
    ) -> NotificationLogResult<Vec<NotificationRecord>>;

    /// Returns a volunteer's records, newest first.
    async fn list_by_volunteer(
        &self,
        volunteer_id: VolunteerId,
    ) -> NotificationLogResult<Vec<NotificationRecord>>;

    /// Marks a record read; idempotent, the first read time wins.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationLogError::NotFound`] when the record does not
    /// exist.
    async fn mark_read(
        &self,
        id: NotificationId,
        at: DateTime<Utc>,
    ) -> NotificationLogResult<NotificationRecord>;
}

/// Errors returned by notification log implementations.
#[derive(Debug, Clone, Error)]
pub enum NotificationLogError {
    /// The record was not found.
    #[error("notification record not found: {0}")]
    NotFound(NotificationId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl NotificationLogError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
