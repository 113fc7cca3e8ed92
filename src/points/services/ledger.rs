//! Completion credit grants.

use crate::assignment::{
    domain::{AssignmentId, VolunteerId, WorkStatus},
    ports::{AssignmentRepository, AssignmentRepositoryError, DirectoryError, OrgDirectory},
};
use crate::points::{
    domain::{PointsEntry, PointsSource},
    ports::{PointsRepository, PointsRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Errors returned by ledger operations.
#[derive(Debug, Error)]
pub enum GrantError {
    /// No such assignment exists.
    #[error("assignment not found: {0}")]
    AssignmentNotFound(AssignmentId),

    /// The assignment's work is not completed.
    #[error("assignment {assignment_id} is not completed (work status {work_status})")]
    NotCompleted {
        /// Assignment the grant was requested for.
        assignment_id: AssignmentId,
        /// Work status observed at request time.
        work_status: WorkStatus,
    },

    /// Completion credit was already granted for this assignment.
    #[error("completion credit already granted for assignment {0}")]
    AlreadyGranted(AssignmentId),

    /// Assignment repository operation failed.
    #[error(transparent)]
    Assignments(#[from] AssignmentRepositoryError),

    /// Points repository operation failed.
    #[error(transparent)]
    Points(PointsRepositoryError),

    /// Directory lookup failed.
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

impl From<PointsRepositoryError> for GrantError {
    fn from(err: PointsRepositoryError) -> Self {
        match err {
            PointsRepositoryError::AlreadyGranted(assignment_id) => {
                Self::AlreadyGranted(assignment_id)
            }
            other => Self::Points(other),
        }
    }
}

/// Result type for ledger operations.
pub type GrantResult<T> = Result<T, GrantError>;

/// Awards completion credit exactly once per assignment.
#[derive(Clone)]
pub struct PointsLedger<P, A, D, C>
where
    P: PointsRepository,
    A: AssignmentRepository,
    D: OrgDirectory,
    C: Clock + Send + Sync,
{
    points: Arc<P>,
    assignments: Arc<A>,
    directory: Arc<D>,
    clock: Arc<C>,
    completion_points: u32,
}

impl<P, A, D, C> PointsLedger<P, A, D, C>
where
    P: PointsRepository,
    A: AssignmentRepository,
    D: OrgDirectory,
    C: Clock + Send + Sync,
{
    /// Creates a ledger granting `completion_points` per completion.
    #[must_use]
    pub const fn new(
        points: Arc<P>,
        assignments: Arc<A>,
        directory: Arc<D>,
        clock: Arc<C>,
        completion_points: u32,
    ) -> Self {
        Self {
            points,
            assignments,
            directory,
            clock,
            completion_points,
        }
    }

    /// Grants completion credit for one completed assignment.
    ///
    /// The completion must already have been recorded through the
    /// assignment store's work-status transition; the ledger only reads
    /// assignment state. Double grants are refused by the repository's
    /// uniqueness constraint, so two concurrent calls store exactly one
    /// entry.
    ///
    /// # Errors
    ///
    /// Returns [`GrantError::NotCompleted`] when the work is not finished
    /// and [`GrantError::AlreadyGranted`] when credit exists already.
    pub async fn grant_completion(&self, assignment_id: AssignmentId) -> GrantResult<PointsEntry> {
        let assignment = self
            .assignments
            .find_by_id(assignment_id)
            .await?
            .ok_or(GrantError::AssignmentNotFound(assignment_id))?;
        if assignment.work_status() != WorkStatus::Completed {
            return Err(GrantError::NotCompleted {
                assignment_id,
                work_status: assignment.work_status(),
            });
        }

        let task_title = self
            .directory
            .task(assignment.task_id())
            .await?
            .map_or_else(|| "assigned task".to_owned(), |task| task.title().to_owned());

        let entry = PointsEntry::new(
            assignment.volunteer_id(),
            self.completion_points,
            format!("Completed task \"{task_title}\""),
            PointsSource::Completion {
                assignment_id,
                task_id: assignment.task_id(),
            },
            self.clock.utc(),
        );
        self.points.append(&entry).await?;
        tracing::info!(
            assignment = %assignment_id,
            volunteer = %entry.volunteer_id(),
            points = entry.points(),
            "completion credit granted"
        );
        Ok(entry)
    }

    /// Returns the sum of a volunteer's grants.
    ///
    /// # Errors
    ///
    /// Returns [`GrantError::Points`] when the lookup fails.
    pub async fn volunteer_total(&self, volunteer_id: VolunteerId) -> GrantResult<u64> {
        let entries = self.points.list_by_volunteer(volunteer_id).await?;
        Ok(entries
            .iter()
            .map(|entry| u64::from(entry.points()))
            .sum())
    }
}
