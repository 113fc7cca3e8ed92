//! Read-only status projection for dashboard consumption.

use crate::assignment::{
    domain::{
        AssignmentEvent, AssignmentId, NotificationStatus, TaskAssignment, TaskId, VolunteerId,
        WorkStatus,
    },
    ports::{AssignmentRepository, AssignmentRepositoryError, DirectoryError, OrgDirectory},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tokio::sync::broadcast;

/// Per-status assignment counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StatusCounts {
    /// Assignments awaiting dispatch.
    pub pending: usize,
    /// Assignments awaiting a response.
    pub sent: usize,
    /// Accepted assignments.
    pub accept: usize,
    /// Rejected assignments.
    pub reject: usize,
    /// Expired assignments.
    pub expired: usize,
}

impl StatusCounts {
    /// Returns the count for one status.
    #[must_use]
    pub const fn get(&self, status: NotificationStatus) -> usize {
        match status {
            NotificationStatus::Pending => self.pending,
            NotificationStatus::Sent => self.sent,
            NotificationStatus::Accept => self.accept,
            NotificationStatus::Reject => self.reject,
            NotificationStatus::Expired => self.expired,
        }
    }

    /// Returns the total number of counted assignments.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.pending + self.sent + self.accept + self.reject + self.expired
    }

    fn bump(&mut self, status: NotificationStatus) {
        match status {
            NotificationStatus::Pending => self.pending += 1,
            NotificationStatus::Sent => self.sent += 1,
            NotificationStatus::Accept => self.accept += 1,
            NotificationStatus::Reject => self.reject += 1,
            NotificationStatus::Expired => self.expired += 1,
        }
    }
}

/// One roster line: an assignment with display data attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterEntry {
    /// Assignment identifier.
    pub assignment_id: AssignmentId,
    /// Volunteer identifier.
    pub volunteer_id: VolunteerId,
    /// Volunteer display name, when the directory knows them.
    pub volunteer_name: Option<String>,
    /// Volunteer email, when the directory knows them.
    pub volunteer_email: Option<String>,
    /// Task identifier.
    pub task_id: TaskId,
    /// Task display title.
    pub task_title: String,
    /// Owning event display title.
    pub event_title: String,
    /// Invitation lifecycle status.
    pub notification_status: NotificationStatus,
    /// Work execution status.
    pub work_status: WorkStatus,
    /// Dispatch timestamp.
    pub sent_at: Option<DateTime<Utc>>,
    /// Response timestamp.
    pub responded_at: Option<DateTime<Utc>>,
}

/// Errors returned by projection reads.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// The task is not known to the directory.
    #[error("unknown task: {0}")]
    UnknownTask(TaskId),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] AssignmentRepositoryError),

    /// Directory lookup failed.
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

/// Result type for projection operations.
pub type ProjectionResult<T> = Result<T, ProjectionError>;

/// Derives aggregate counts and per-task rosters from the store.
///
/// The projector holds no business rules and never mutates the store; it
/// either follows the event feed or recomputes on demand.
#[derive(Clone)]
pub struct StatusProjector<R, D>
where
    R: AssignmentRepository,
    D: OrgDirectory,
{
    repository: Arc<R>,
    directory: Arc<D>,
    counts: Arc<RwLock<StatusCounts>>,
}

impl<R, D> StatusProjector<R, D>
where
    R: AssignmentRepository,
    D: OrgDirectory,
{
    /// Creates a projector with empty counts.
    #[must_use]
    pub fn new(repository: Arc<R>, directory: Arc<D>) -> Self {
        Self {
            repository,
            directory,
            counts: Arc::new(RwLock::new(StatusCounts::default())),
        }
    }

    /// Returns the most recently projected counts.
    ///
    /// Call [`Self::refresh`] first (or run the event loop) to populate
    /// them.
    #[must_use]
    pub fn counts_by_status(&self) -> StatusCounts {
        self.counts
            .read()
            .map(|counts| *counts)
            .unwrap_or_default()
    }

    /// Recomputes the counts from the store.
    ///
    /// This is the polling fallback and also the event handler: a full
    /// recomputation can never drift, whereas incremental updates would
    /// need every event to carry its predecessor state.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::Repository`] when the scan fails.
    pub async fn refresh(&self) -> ProjectionResult<StatusCounts> {
        let assignments = self.repository.list_all().await?;
        let mut fresh = StatusCounts::default();
        for assignment in &assignments {
            fresh.bump(assignment.notification_status());
        }
        if let Ok(mut counts) = self.counts.write() {
            *counts = fresh;
        }
        Ok(fresh)
    }

    /// Builds the roster for one task, oldest assignment first.
    ///
    /// Volunteer display data is denormalized at read time; assignments
    /// whose volunteer the directory no longer knows still appear, with
    /// empty display fields.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::UnknownTask`] when the directory has no
    /// such task.
    pub async fn roster_for_task(&self, task_id: TaskId) -> ProjectionResult<Vec<RosterEntry>> {
        let task = self
            .directory
            .task(task_id)
            .await?
            .ok_or(ProjectionError::UnknownTask(task_id))?;

        let assignments = self.repository.list_by_task(task_id).await?;
        let mut roster = Vec::with_capacity(assignments.len());
        for assignment in assignments {
            let volunteer = self.directory.volunteer(assignment.volunteer_id()).await?;
            roster.push(to_roster_entry(
                &assignment,
                task.title(),
                task.event_title(),
                volunteer.as_ref().map(|v| (v.name(), v.email())),
            ));
        }
        Ok(roster)
    }

    /// Follows the event feed, refreshing the counts on every change.
    ///
    /// Returns when the feed closes. A lagged receiver triggers a refresh
    /// as well, so missed events cannot leave the projection stale.
    pub async fn run(&self, mut receiver: broadcast::Receiver<AssignmentEvent>) {
        loop {
            match receiver.recv().await {
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {
                    if let Err(err) = self.refresh().await {
                        tracing::warn!(error = %err, "status projection refresh failed");
                    }
                }
                Err(broadcast::error::RecvError::Closed) => return,
            }
        }
    }
}

fn to_roster_entry(
    assignment: &TaskAssignment,
    task_title: &str,
    event_title: &str,
    volunteer: Option<(&str, &str)>,
) -> RosterEntry {
    RosterEntry {
        assignment_id: assignment.id(),
        volunteer_id: assignment.volunteer_id(),
        volunteer_name: volunteer.map(|(name, _)| name.to_owned()),
        volunteer_email: volunteer.map(|(_, email)| email.to_owned()),
        task_id: assignment.task_id(),
        task_title: task_title.to_owned(),
        event_title: event_title.to_owned(),
        notification_status: assignment.notification_status(),
        work_status: assignment.work_status(),
        sent_at: assignment.sent_at(),
        responded_at: assignment.responded_at(),
    }
}
