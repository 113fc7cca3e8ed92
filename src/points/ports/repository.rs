//! Repository port for the append-only points ledger.

use crate::assignment::domain::{AssignmentId, VolunteerId};
use crate::points::domain::PointsEntry;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for points repository operations.
pub type PointsRepositoryResult<T> = Result<T, PointsRepositoryError>;

/// Append-only points persistence contract.
///
/// Completion uniqueness lives here, not in callers: two concurrent grant
/// requests for the same assignment must collapse to one stored entry, so
/// the constraint is a storage-layer invariant (a unique index in the
/// `PostgreSQL` adapter).
#[async_trait]
pub trait PointsRepository: Send + Sync {
    /// Appends one grant.
    ///
    /// # Errors
    ///
    /// Returns [`PointsRepositoryError::AlreadyGranted`] when a completion
    /// entry for the same assignment already exists.
    async fn append(&self, entry: &PointsEntry) -> PointsRepositoryResult<()>;

    /// Finds the completion grant for an assignment, if one exists.
    async fn find_completion(
        &self,
        assignment_id: AssignmentId,
    ) -> PointsRepositoryResult<Option<PointsEntry>>;

    /// Returns a volunteer's grants, oldest first.
    async fn list_by_volunteer(
        &self,
        volunteer_id: VolunteerId,
    ) -> PointsRepositoryResult<Vec<PointsEntry>>;
}

/// Errors returned by points repository implementations.
#[derive(Debug, Clone, Error)]
pub enum PointsRepositoryError {
    /// A completion entry already exists for the assignment.
    #[error("completion credit already granted for assignment {0}")]
    AlreadyGranted(AssignmentId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl PointsRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
