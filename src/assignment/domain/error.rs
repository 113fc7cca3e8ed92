//! Error types for assignment domain validation and parsing.

use super::{AssignmentId, NotificationStatus, WorkStatus};
use thiserror::Error;

/// Errors returned while mutating or constructing assignment domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssignmentDomainError {
    /// The requested notification transition is not on the monotonic chain.
    #[error("invalid notification transition {from} -> {to} for assignment {assignment_id}")]
    InvalidNotificationTransition {
        /// Assignment the transition was attempted on.
        assignment_id: AssignmentId,
        /// Status observed at the time of the attempt.
        from: NotificationStatus,
        /// Status the caller tried to move to.
        to: NotificationStatus,
    },

    /// The requested work transition is not permitted.
    #[error(
        "invalid work transition {from} -> {to} for assignment {assignment_id} \
         (notification status {notification_status})"
    )]
    InvalidWorkTransition {
        /// Assignment the transition was attempted on.
        assignment_id: AssignmentId,
        /// Work status observed at the time of the attempt.
        from: WorkStatus,
        /// Work status the caller tried to move to.
        to: WorkStatus,
        /// Notification status at the time of the attempt.
        notification_status: NotificationStatus,
    },

    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTaskTitle,

    /// The task capacity is zero.
    #[error("task capacity must admit at least one volunteer")]
    InvalidCapacity,
}

/// Error returned while parsing notification statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown notification status: {0}")]
pub struct ParseNotificationStatusError(pub String);

/// Error returned while parsing work statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown work status: {0}")]
pub struct ParseWorkStatusError(pub String);

/// Error returned while parsing response actions from request input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown response action: {0}")]
pub struct ParseResponseActionError(pub String);

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);
