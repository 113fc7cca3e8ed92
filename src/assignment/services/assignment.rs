//! Service layer for creating assignments and advancing work status.

use crate::assignment::{
    domain::{
        AssignmentDomainError, AssignmentEvent, AssignmentId, TaskAssignment, TaskId, VolunteerId,
        WorkStatus,
    },
    ports::{
        AssignmentRepository, AssignmentRepositoryError, DirectoryError, EventPublisher,
        OrgDirectory,
    },
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Service-level errors for assignment operations.
#[derive(Debug, Error)]
pub enum AssignmentServiceError {
    /// The task is not known to the directory.
    #[error("unknown task: {0}")]
    UnknownTask(TaskId),

    /// The batch would exceed the task's volunteer capacity.
    #[error(
        "capacity exceeded for task {task_id}: capacity {capacity}, \
         {occupied} occupied, {requested} requested"
    )]
    CapacityExceeded {
        /// Task whose capacity would be exceeded.
        task_id: TaskId,
        /// Configured maximum number of volunteers.
        capacity: u32,
        /// Slots already occupied by non-rejected assignments.
        occupied: usize,
        /// Size of the rejected batch.
        requested: usize,
    },

    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] AssignmentDomainError),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] AssignmentRepositoryError),

    /// Directory lookup failed.
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

/// Result type for assignment service operations.
pub type AssignmentServiceResult<T> = Result<T, AssignmentServiceError>;

/// Orchestrates assignment creation and work-status changes.
#[derive(Clone)]
pub struct AssignmentService<R, D, P, C>
where
    R: AssignmentRepository,
    D: OrgDirectory,
    P: EventPublisher,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    directory: Arc<D>,
    publisher: Arc<P>,
    clock: Arc<C>,
}

impl<R, D, P, C> AssignmentService<R, D, P, C>
where
    R: AssignmentRepository,
    D: OrgDirectory,
    P: EventPublisher,
    C: Clock + Send + Sync,
{
    /// Creates a new assignment service.
    #[must_use]
    pub const fn new(
        repository: Arc<R>,
        directory: Arc<D>,
        publisher: Arc<P>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            repository,
            directory,
            publisher,
            clock,
        }
    }

    /// Assigns a batch of volunteers to a task.
    ///
    /// All assignments are created in `pending`/`todo`; one `Created` event
    /// is published per row. The batch is atomic: a capacity or duplicate
    /// failure writes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentServiceError::UnknownTask`] when the directory
    /// has no such task, [`AssignmentServiceError::CapacityExceeded`] when
    /// the batch does not fit the remaining capacity, and
    /// [`AssignmentRepositoryError::DuplicateAssignment`] (wrapped) when a
    /// volunteer already holds a live assignment for the task.
    pub async fn create_assignments(
        &self,
        task_id: TaskId,
        volunteer_ids: &[VolunteerId],
    ) -> AssignmentServiceResult<Vec<TaskAssignment>> {
        let task = self
            .directory
            .task(task_id)
            .await?
            .ok_or(AssignmentServiceError::UnknownTask(task_id))?;

        let occupied = self
            .repository
            .list_by_task(task_id)
            .await?
            .iter()
            .filter(|assignment| assignment.occupies_capacity())
            .count();
        let capacity = task.max_volunteers();
        let remaining = usize::try_from(capacity)
            .unwrap_or(usize::MAX)
            .saturating_sub(occupied);
        if volunteer_ids.len() > remaining {
            return Err(AssignmentServiceError::CapacityExceeded {
                task_id,
                capacity,
                occupied,
                requested: volunteer_ids.len(),
            });
        }

        let assignments: Vec<TaskAssignment> = volunteer_ids
            .iter()
            .map(|volunteer_id| TaskAssignment::new(task_id, *volunteer_id, &*self.clock))
            .collect();
        self.repository.create(&assignments).await?;

        for assignment in &assignments {
            self.publisher.publish(&AssignmentEvent::Created {
                assignment_id: assignment.id(),
                task_id: assignment.task_id(),
                volunteer_id: assignment.volunteer_id(),
                occurred_at: assignment.created_at(),
            });
        }
        tracing::info!(
            task = %task_id,
            created = assignments.len(),
            "assignments created"
        );
        Ok(assignments)
    }

    /// Fetches one assignment.
    ///
    /// Returns `None` when the assignment does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentServiceError::Repository`] when the lookup fails.
    pub async fn get_assignment(
        &self,
        id: AssignmentId,
    ) -> AssignmentServiceResult<Option<TaskAssignment>> {
        Ok(self.repository.find_by_id(id).await?)
    }

    /// Lists a task's assignments, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentServiceError::Repository`] when the lookup fails.
    pub async fn list_by_task(
        &self,
        task_id: TaskId,
    ) -> AssignmentServiceResult<Vec<TaskAssignment>> {
        Ok(self.repository.list_by_task(task_id).await?)
    }

    /// Lists a volunteer's assignments, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentServiceError::Repository`] when the lookup fails.
    pub async fn list_by_volunteer(
        &self,
        volunteer_id: VolunteerId,
    ) -> AssignmentServiceResult<Vec<TaskAssignment>> {
        Ok(self.repository.list_by_volunteer(volunteer_id).await?)
    }

    /// Moves an assignment's work status.
    ///
    /// Entering `completed` requires the invitation to have been accepted
    /// and stamps `completed_at`; completion credit is granted separately
    /// by the points ledger.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentDomainError::InvalidWorkTransition`] (wrapped)
    /// when the transition guards reject the move and
    /// [`AssignmentRepositoryError::NotFound`] (wrapped) when the
    /// assignment does not exist.
    pub async fn transition_work_status(
        &self,
        id: AssignmentId,
        to: WorkStatus,
    ) -> AssignmentServiceResult<TaskAssignment> {
        let updated = self
            .repository
            .set_work_status(id, to, self.clock.utc())
            .await?;
        tracing::info!(assignment = %id, work_status = %to, "work status changed");
        Ok(updated)
    }
}
