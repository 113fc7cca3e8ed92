//! Task assignment aggregate root.

use super::{
    AssignmentDomainError, AssignmentId, NotificationStatus, ResponseAction, TaskId, VolunteerId,
    WorkStatus,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// One volunteer's assignment to one task.
///
/// The aggregate owns both status axes and all lifecycle timestamps.
/// Transition guards live here; the repository's compare-and-swap supplies
/// the concurrency guarantee on top of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskAssignment {
    id: AssignmentId,
    task_id: TaskId,
    volunteer_id: VolunteerId,
    notification_status: NotificationStatus,
    work_status: WorkStatus,
    sent_at: Option<DateTime<Utc>>,
    responded_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedAssignmentData {
    /// Persisted assignment identifier.
    pub id: AssignmentId,
    /// Persisted task reference.
    pub task_id: TaskId,
    /// Persisted volunteer reference.
    pub volunteer_id: VolunteerId,
    /// Persisted notification status.
    pub notification_status: NotificationStatus,
    /// Persisted work status.
    pub work_status: WorkStatus,
    /// Persisted dispatch timestamp, if any.
    pub sent_at: Option<DateTime<Utc>>,
    /// Persisted response timestamp, if any.
    pub responded_at: Option<DateTime<Utc>>,
    /// Persisted completion timestamp, if any.
    pub completed_at: Option<DateTime<Utc>>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl TaskAssignment {
    /// Creates a fresh assignment in `pending`/`todo`.
    #[must_use]
    pub fn new(task_id: TaskId, volunteer_id: VolunteerId, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: AssignmentId::new(),
            task_id,
            volunteer_id,
            notification_status: NotificationStatus::Pending,
            work_status: WorkStatus::Todo,
            sent_at: None,
            responded_at: None,
            completed_at: None,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs an assignment from persisted storage.
    #[must_use]
    pub const fn from_persisted(data: PersistedAssignmentData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            volunteer_id: data.volunteer_id,
            notification_status: data.notification_status,
            work_status: data.work_status,
            sent_at: data.sent_at,
            responded_at: data.responded_at,
            completed_at: data.completed_at,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the assignment identifier.
    #[must_use]
    pub const fn id(&self) -> AssignmentId {
        self.id
    }

    /// Returns the task reference.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the volunteer reference.
    #[must_use]
    pub const fn volunteer_id(&self) -> VolunteerId {
        self.volunteer_id
    }

    /// Returns the invitation lifecycle status.
    #[must_use]
    pub const fn notification_status(&self) -> NotificationStatus {
        self.notification_status
    }

    /// Returns the work execution status.
    #[must_use]
    pub const fn work_status(&self) -> WorkStatus {
        self.work_status
    }

    /// Returns when the notification was dispatched, if it was.
    #[must_use]
    pub const fn sent_at(&self) -> Option<DateTime<Utc>> {
        self.sent_at
    }

    /// Returns when the volunteer responded, if they did.
    #[must_use]
    pub const fn responded_at(&self) -> Option<DateTime<Utc>> {
        self.responded_at
    }

    /// Returns when the work was completed, if it was.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest lifecycle timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns whether this assignment still occupies a capacity slot.
    ///
    /// Only a rejected assignment frees its slot; an expired invitation is
    /// unanswered, not declined, and keeps blocking re-assignment until an
    /// organizer intervenes.
    #[must_use]
    pub const fn occupies_capacity(&self) -> bool {
        !matches!(self.notification_status, NotificationStatus::Reject)
    }

    /// Records that the invitation was delivered.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentDomainError::InvalidNotificationTransition`] when
    /// the assignment is not `pending`.
    pub fn record_notification_sent(
        &mut self,
        at: DateTime<Utc>,
    ) -> Result<(), AssignmentDomainError> {
        self.guard_notification_transition(NotificationStatus::Sent)?;
        self.notification_status = NotificationStatus::Sent;
        self.sent_at = Some(at);
        self.updated_at = at;
        Ok(())
    }

    /// Records the volunteer's response.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentDomainError::InvalidNotificationTransition`] when
    /// the assignment already carries a terminal status.
    pub fn record_response(
        &mut self,
        action: ResponseAction,
        at: DateTime<Utc>,
    ) -> Result<(), AssignmentDomainError> {
        self.guard_notification_transition(action.status())?;
        self.notification_status = action.status();
        self.responded_at = Some(at);
        self.updated_at = at;
        Ok(())
    }

    /// Records expiry of an unanswered invitation.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentDomainError::InvalidNotificationTransition`] when
    /// the assignment is not `sent`.
    pub fn record_expiry(&mut self, at: DateTime<Utc>) -> Result<(), AssignmentDomainError> {
        self.guard_notification_transition(NotificationStatus::Expired)?;
        self.notification_status = NotificationStatus::Expired;
        self.updated_at = at;
        Ok(())
    }

    /// Moves the work status, enforcing the completion invariant.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentDomainError::InvalidWorkTransition`] when the
    /// current work status is terminal, when the target equals the current
    /// status, or when `completed` is requested on an assignment that was
    /// never accepted.
    pub fn transition_work(
        &mut self,
        to: WorkStatus,
        at: DateTime<Utc>,
    ) -> Result<(), AssignmentDomainError> {
        let permitted = !self.work_status.is_terminal()
            && to != self.work_status
            && (to != WorkStatus::Completed
                || self.notification_status == NotificationStatus::Accept);
        if !permitted {
            return Err(AssignmentDomainError::InvalidWorkTransition {
                assignment_id: self.id,
                from: self.work_status,
                to,
                notification_status: self.notification_status,
            });
        }
        self.work_status = to;
        if to == WorkStatus::Completed {
            self.completed_at = Some(at);
        }
        self.updated_at = at;
        Ok(())
    }

    fn guard_notification_transition(
        &self,
        to: NotificationStatus,
    ) -> Result<(), AssignmentDomainError> {
        if self.notification_status.can_transition_to(to) {
            return Ok(());
        }
        Err(AssignmentDomainError::InvalidNotificationTransition {
            assignment_id: self.id,
            from: self.notification_status,
            to,
        })
    }
}
