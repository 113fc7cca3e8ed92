//! Repository port for assignment persistence and race-safe transitions.

use crate::assignment::domain::{
    AssignmentDomainError, AssignmentId, NotificationStatus, TaskAssignment, TaskId, VolunteerId,
    WorkStatus,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for assignment repository operations.
pub type AssignmentRepositoryResult<T> = Result<T, AssignmentRepositoryError>;

/// Assignment persistence contract.
///
/// The assignment row is the single serialization point of the engine:
/// every status mutation goes through a compare-and-swap keyed on the
/// status the caller observed, never an unconditional overwrite.
#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    /// Stores a batch of new assignments atomically.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentRepositoryError::DuplicateAssignment`] when any
    /// volunteer in the batch already holds a non-rejected assignment for
    /// the same task; no row is written in that case.
    async fn create(&self, assignments: &[TaskAssignment]) -> AssignmentRepositoryResult<()>;

    /// Finds an assignment by identifier.
    ///
    /// Returns `None` when the assignment does not exist.
    async fn find_by_id(&self, id: AssignmentId)
    -> AssignmentRepositoryResult<Option<TaskAssignment>>;

    /// Returns all assignments for a task, oldest first.
    async fn list_by_task(&self, task_id: TaskId) -> AssignmentRepositoryResult<Vec<TaskAssignment>>;

    /// Returns all assignments held by a volunteer, oldest first.
    async fn list_by_volunteer(
        &self,
        volunteer_id: VolunteerId,
    ) -> AssignmentRepositoryResult<Vec<TaskAssignment>>;

    /// Returns every assignment, oldest first. Read-side projection only.
    async fn list_all(&self) -> AssignmentRepositoryResult<Vec<TaskAssignment>>;

    /// Returns `sent` assignments dispatched at or before `due_before`.
    async fn list_sent_due(
        &self,
        due_before: DateTime<Utc>,
    ) -> AssignmentRepositoryResult<Vec<TaskAssignment>>;

    /// Compare-and-swap on the notification status.
    ///
    /// Succeeds only when the stored status still equals `from`; the swap
    /// stamps `sent_at`/`responded_at` as appropriate for `to` using `at`.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentRepositoryError::StaleTransition`] when another
    /// writer got there first (callers re-read and re-evaluate rather than
    /// surfacing this), [`AssignmentRepositoryError::Domain`] when the
    /// `from -> to` pair is off the monotonic chain, and
    /// [`AssignmentRepositoryError::NotFound`] when the row is missing.
    async fn cas_notification_status(
        &self,
        id: AssignmentId,
        from: NotificationStatus,
        to: NotificationStatus,
        at: DateTime<Utc>,
    ) -> AssignmentRepositoryResult<TaskAssignment>;

    /// Moves the work status under the aggregate's transition guards.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentRepositoryError::Domain`] when the transition is
    /// rejected (terminal work status, or `completed` without acceptance)
    /// and [`AssignmentRepositoryError::NotFound`] when the row is missing.
    async fn set_work_status(
        &self,
        id: AssignmentId,
        to: WorkStatus,
        at: DateTime<Utc>,
    ) -> AssignmentRepositoryResult<TaskAssignment>;
}

/// Errors returned by assignment repository implementations.
#[derive(Debug, Clone, Error)]
pub enum AssignmentRepositoryError {
    /// The assignment was not found.
    #[error("assignment not found: {0}")]
    NotFound(AssignmentId),

    /// The volunteer already holds a live assignment for the task.
    #[error("volunteer {volunteer_id} already assigned to task {task_id}")]
    DuplicateAssignment {
        /// Task the duplicate was attempted on.
        task_id: TaskId,
        /// Volunteer already holding an assignment.
        volunteer_id: VolunteerId,
    },

    /// The compare-and-swap lost a race to another writer.
    #[error("stale transition on assignment {id}: expected {expected}, found {actual}")]
    StaleTransition {
        /// Assignment the swap was attempted on.
        id: AssignmentId,
        /// Status the caller observed before the swap.
        expected: NotificationStatus,
        /// Status actually stored at swap time.
        actual: NotificationStatus,
    },

    /// A transition guard rejected the mutation.
    #[error(transparent)]
    Domain(#[from] AssignmentDomainError),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl AssignmentRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
