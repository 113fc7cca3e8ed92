//! In-memory notification log for tests and embedding.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::assignment::domain::{AssignmentId, VolunteerId};
use crate::notify::{
    domain::{NotificationId, NotificationRecord},
    ports::{NotificationLog, NotificationLogError, NotificationLogResult},
};

/// Thread-safe in-memory notification log.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotificationLog {
    state: Arc<RwLock<HashMap<NotificationId, NotificationRecord>>>,
}

impl InMemoryNotificationLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(mut records: Vec<NotificationRecord>) -> Vec<NotificationRecord> {
    records.sort_by_key(|record| Reverse(record.delivered_at()));
    records
}

#[async_trait]
impl NotificationLog for InMemoryNotificationLog {
    async fn append(&self, record: &NotificationRecord) -> NotificationLogResult<()> {
        let mut state = self.state.write().map_err(|err| {
            NotificationLogError::persistence(std::io::Error::other(err.to_string()))
        })?;
        state.insert(record.id(), record.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: NotificationId,
    ) -> NotificationLogResult<Option<NotificationRecord>> {
        let state = self.state.read().map_err(|err| {
            NotificationLogError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state.get(&id).cloned())
    }

    async fn list_by_assignment(
        &self,
        assignment_id: AssignmentId,
    ) -> NotificationLogResult<Vec<NotificationRecord>> {
        let state = self.state.read().map_err(|err| {
            NotificationLogError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let records = state
            .values()
            .filter(|record| record.assignment_id() == assignment_id)
            .cloned()
            .collect();
        Ok(newest_first(records))
    }

    async fn list_by_volunteer(
        &self,
        volunteer_id: VolunteerId,
    ) -> NotificationLogResult<Vec<NotificationRecord>> {
        let state = self.state.read().map_err(|err| {
            NotificationLogError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let records = state
            .values()
            .filter(|record| record.volunteer_id() == volunteer_id)
            .cloned()
            .collect();
        Ok(newest_first(records))
    }

    async fn mark_read(
        &self,
        id: NotificationId,
        at: DateTime<Utc>,
    ) -> NotificationLogResult<NotificationRecord> {
        let mut state = self.state.write().map_err(|err| {
            NotificationLogError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let record = state
            .get_mut(&id)
            .ok_or(NotificationLogError::NotFound(id))?;
        record.mark_read(at);
        Ok(record.clone())
    }
}
