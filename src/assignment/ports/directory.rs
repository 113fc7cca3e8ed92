//! Directory port for task and volunteer master data.
//!
//! Events, tasks, and volunteers are owned by the surrounding system; the
//! engine only reads them, for capacity checks, notification content, and
//! roster projection.

use crate::assignment::domain::{TaskId, TaskRecord, Volunteer, VolunteerId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for directory lookups.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Read-only task/volunteer lookup contract.
#[async_trait]
pub trait OrgDirectory: Send + Sync {
    /// Finds a task record by identifier.
    ///
    /// Returns `None` when the task is unknown.
    async fn task(&self, id: TaskId) -> DirectoryResult<Option<TaskRecord>>;

    /// Finds a volunteer record by identifier.
    ///
    /// Returns `None` when the volunteer is unknown.
    async fn volunteer(&self, id: VolunteerId) -> DirectoryResult<Option<Volunteer>>;
}

/// Errors returned by directory implementations.
#[derive(Debug, Clone, Error)]
pub enum DirectoryError {
    /// Lookup-layer failure.
    #[error("directory error: {0}")]
    Lookup(Arc<dyn std::error::Error + Send + Sync>),
}

impl DirectoryError {
    /// Wraps a lookup error.
    pub fn lookup(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Lookup(Arc::new(err))
    }
}
