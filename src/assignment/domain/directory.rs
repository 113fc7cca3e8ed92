//! Read-side records for tasks and volunteers.
//!
//! Task and volunteer master data is owned by the surrounding organization
//! system; the engine consumes these records through the directory port for
//! capacity checks, notification content, and roster projection.

use super::{AssignmentDomainError, EventId, ParseTaskStatusError, TaskId, VolunteerId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Workboard status of a task, as reported by the owning system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started.
    Todo,
    /// In progress.
    InProgress,
    /// Under review.
    Review,
    /// Done.
    Done,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Review => "review",
            Self::Done => "done",
        }
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "todo" => Ok(Self::Todo),
            "in_progress" => Ok(Self::InProgress),
            "review" => Ok(Self::Review),
            "done" => Ok(Self::Done),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task as seen by the engine: display data plus capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    id: TaskId,
    event_id: EventId,
    title: String,
    description: Option<String>,
    status: TaskStatus,
    deadline: Option<DateTime<Utc>>,
    max_volunteers: u32,
    event_title: String,
}

impl TaskRecord {
    /// Creates a task record with validated title and capacity.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentDomainError::EmptyTaskTitle`] when the title is
    /// blank and [`AssignmentDomainError::InvalidCapacity`] when the
    /// capacity is zero.
    pub fn new(
        id: TaskId,
        event_id: EventId,
        title: impl Into<String>,
        max_volunteers: u32,
    ) -> Result<Self, AssignmentDomainError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(AssignmentDomainError::EmptyTaskTitle);
        }
        if max_volunteers == 0 {
            return Err(AssignmentDomainError::InvalidCapacity);
        }
        Ok(Self {
            id,
            event_id,
            title,
            description: None,
            status: TaskStatus::Todo,
            deadline: None,
            max_volunteers,
            event_title: String::new(),
        })
    }

    /// Sets the task description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the workboard status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the task deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Sets the owning event's display title.
    #[must_use]
    pub fn with_event_title(mut self, event_title: impl Into<String>) -> Self {
        self.event_title = event_title.into();
        self
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning event identifier.
    #[must_use]
    pub const fn event_id(&self) -> EventId {
        self.event_id
    }

    /// Returns the task title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the task description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the workboard status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the deadline, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    /// Returns the maximum number of concurrently assigned volunteers.
    #[must_use]
    pub const fn max_volunteers(&self) -> u32 {
        self.max_volunteers
    }

    /// Returns the owning event's display title.
    #[must_use]
    pub fn event_title(&self) -> &str {
        &self.event_title
    }
}

/// A volunteer's display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volunteer {
    id: VolunteerId,
    name: String,
    email: String,
}

impl Volunteer {
    /// Creates a volunteer record.
    #[must_use]
    pub fn new(id: VolunteerId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
        }
    }

    /// Returns the volunteer identifier.
    #[must_use]
    pub const fn id(&self) -> VolunteerId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }
}
