//! Domain events emitted on assignment state changes.
//!
//! Every mutation of an assignment's notification status publishes one
//! event so that read-side consumers (status projection, dashboards)
//! refresh without polling.

use super::{AssignmentId, ResponseAction, TaskId, VolunteerId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A state change on a task assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssignmentEvent {
    /// An assignment was created in `pending`.
    Created {
        /// Assignment that was created.
        assignment_id: AssignmentId,
        /// Task the assignment belongs to.
        task_id: TaskId,
        /// Volunteer the task was assigned to.
        volunteer_id: VolunteerId,
        /// When the creation happened.
        occurred_at: DateTime<Utc>,
    },
    /// An invitation was delivered and the assignment moved to `sent`.
    Dispatched {
        /// Assignment that was dispatched.
        assignment_id: AssignmentId,
        /// When the dispatch happened.
        occurred_at: DateTime<Utc>,
    },
    /// The volunteer answered the invitation.
    Responded {
        /// Assignment that was answered.
        assignment_id: AssignmentId,
        /// The recorded answer.
        action: ResponseAction,
        /// When the response was recorded.
        occurred_at: DateTime<Utc>,
    },
    /// The response window elapsed and the assignment moved to `expired`.
    Expired {
        /// Assignment that expired.
        assignment_id: AssignmentId,
        /// When the expiry was recorded.
        occurred_at: DateTime<Utc>,
    },
}

impl AssignmentEvent {
    /// Returns the assignment the event refers to.
    #[must_use]
    pub const fn assignment_id(&self) -> AssignmentId {
        match self {
            Self::Created { assignment_id, .. }
            | Self::Dispatched { assignment_id, .. }
            | Self::Responded { assignment_id, .. }
            | Self::Expired { assignment_id, .. } => *assignment_id,
        }
    }

    /// Returns when the underlying state change happened.
    #[must_use]
    pub const fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            Self::Created { occurred_at, .. }
            | Self::Dispatched { occurred_at, .. }
            | Self::Responded { occurred_at, .. }
            | Self::Expired { occurred_at, .. } => *occurred_at,
        }
    }

    /// Returns a stable label for logging and metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Created { .. } => "created",
            Self::Dispatched { .. } => "dispatched",
            Self::Responded { .. } => "responded",
            Self::Expired { .. } => "expired",
        }
    }
}
