//! Notification and work status state machines for task assignments.
//!
//! The two axes are independent: `NotificationStatus` tracks the
//! invitation lifecycle, `WorkStatus` tracks execution of the task itself.
//! The single cross-axis rule (work may only complete on an accepted
//! assignment) is enforced by the aggregate, not here.

use super::{ParseNotificationStatusError, ParseResponseActionError, ParseWorkStatusError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Invitation lifecycle state of a task assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    /// Assignment created, no notification delivered yet.
    Pending,
    /// Notification delivered, awaiting the volunteer's response.
    Sent,
    /// The volunteer accepted the assignment.
    Accept,
    /// The volunteer rejected the assignment.
    Reject,
    /// The response window elapsed without an answer.
    Expired,
}

impl NotificationStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
            Self::Accept => "accept",
            Self::Reject => "reject",
            Self::Expired => "expired",
        }
    }

    /// Returns `true` for states that admit no further transition.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Accept | Self::Reject | Self::Expired)
    }

    /// Returns whether the monotonic invitation chain permits `self -> to`.
    ///
    /// A response may overtake dispatch, so `pending` admits `accept` and
    /// `reject` directly. Expiry only applies to invitations that were
    /// actually delivered.
    #[must_use]
    pub const fn can_transition_to(self, to: Self) -> bool {
        match self {
            Self::Pending => matches!(to, Self::Sent | Self::Accept | Self::Reject),
            Self::Sent => matches!(to, Self::Accept | Self::Reject | Self::Expired),
            Self::Accept | Self::Reject | Self::Expired => false,
        }
    }
}

impl TryFrom<&str> for NotificationStatus {
    type Error = ParseNotificationStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "sent" => Ok(Self::Sent),
            "accept" => Ok(Self::Accept),
            "reject" => Ok(Self::Reject),
            "expired" => Ok(Self::Expired),
            _ => Err(ParseNotificationStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for NotificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Execution state of the assigned work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkStatus {
    /// Work has not started.
    Todo,
    /// Work is underway.
    InProgress,
    /// Work is awaiting organizer review.
    Review,
    /// Work is finished; terminal.
    Completed,
}

impl WorkStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Review => "review",
            Self::Completed => "completed",
        }
    }

    /// Returns `true` once the work can no longer change state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl TryFrom<&str> for WorkStatus {
    type Error = ParseWorkStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "todo" => Ok(Self::Todo),
            "in_progress" => Ok(Self::InProgress),
            "review" => Ok(Self::Review),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseWorkStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for WorkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A volunteer's answer to an invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseAction {
    /// Accept the assignment.
    Accept,
    /// Decline the assignment.
    Reject,
}

impl ResponseAction {
    /// Returns the query-parameter representation used in response links.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Reject => "reject",
        }
    }

    /// Returns the notification status this action resolves to.
    #[must_use]
    pub const fn status(self) -> NotificationStatus {
        match self {
            Self::Accept => NotificationStatus::Accept,
            Self::Reject => NotificationStatus::Reject,
        }
    }

    /// Returns whether a recorded terminal status matches this action.
    #[must_use]
    pub const fn matches(self, status: NotificationStatus) -> bool {
        match self {
            Self::Accept => matches!(status, NotificationStatus::Accept),
            Self::Reject => matches!(status, NotificationStatus::Reject),
        }
    }
}

impl TryFrom<&str> for ResponseAction {
    type Error = ParseResponseActionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "accept" => Ok(Self::Accept),
            "reject" => Ok(Self::Reject),
            _ => Err(ParseResponseActionError(value.to_owned())),
        }
    }
}

impl fmt::Display for ResponseAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
