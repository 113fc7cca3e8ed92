//! Append-only points entries.

use crate::assignment::domain::{AssignmentId, TaskId, VolunteerId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a points entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointsEntryId(Uuid);

impl PointsEntryId {
    /// Creates a new random entry identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an entry identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for PointsEntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PointsEntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a points grant was earned for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PointsSource {
    /// Completion credit for one assignment; at most one grant per
    /// assignment, enforced at the storage layer.
    Completion {
        /// The completed assignment.
        assignment_id: AssignmentId,
        /// The task the assignment belonged to.
        task_id: TaskId,
    },
    /// A manual organizer adjustment.
    Adjustment,
}

/// One immutable credit grant to a volunteer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsEntry {
    id: PointsEntryId,
    volunteer_id: VolunteerId,
    points: u32,
    reason: String,
    source: PointsSource,
    created_at: DateTime<Utc>,
}

impl PointsEntry {
    /// Creates a new grant.
    #[must_use]
    pub fn new(
        volunteer_id: VolunteerId,
        points: u32,
        reason: impl Into<String>,
        source: PointsSource,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: PointsEntryId::new(),
            volunteer_id,
            points,
            reason: reason.into(),
            source,
            created_at,
        }
    }

    /// Reconstructs an entry from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedPointsData) -> Self {
        Self {
            id: data.id,
            volunteer_id: data.volunteer_id,
            points: data.points,
            reason: data.reason,
            source: data.source,
            created_at: data.created_at,
        }
    }

    /// Returns the entry identifier.
    #[must_use]
    pub const fn id(&self) -> PointsEntryId {
        self.id
    }

    /// Returns the credited volunteer.
    #[must_use]
    pub const fn volunteer_id(&self) -> VolunteerId {
        self.volunteer_id
    }

    /// Returns the granted point value.
    #[must_use]
    pub const fn points(&self) -> u32 {
        self.points
    }

    /// Returns the human-readable reason.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Returns what the grant was earned for.
    #[must_use]
    pub const fn source(&self) -> &PointsSource {
        &self.source
    }

    /// Returns the assignment reference for completion grants.
    #[must_use]
    pub const fn completion_assignment(&self) -> Option<AssignmentId> {
        match self.source {
            PointsSource::Completion { assignment_id, .. } => Some(assignment_id),
            PointsSource::Adjustment => None,
        }
    }

    /// Returns the grant timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Parameter object for reconstructing a persisted points entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedPointsData {
    /// Persisted entry identifier.
    pub id: PointsEntryId,
    /// Persisted volunteer reference.
    pub volunteer_id: VolunteerId,
    /// Persisted point value.
    pub points: u32,
    /// Persisted reason text.
    pub reason: String,
    /// Persisted grant source.
    pub source: PointsSource,
    /// Persisted grant timestamp.
    pub created_at: DateTime<Utc>,
}
