//! Diesel row models for assignment persistence.

use super::schema::task_assignments;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for assignment records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_assignments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AssignmentRow {
    /// Assignment identifier.
    pub id: uuid::Uuid,
    /// Task reference.
    pub task_id: uuid::Uuid,
    /// Volunteer reference.
    pub volunteer_id: uuid::Uuid,
    /// Invitation lifecycle status.
    pub notification_status: String,
    /// Work execution status.
    pub work_status: String,
    /// Dispatch timestamp.
    pub sent_at: Option<DateTime<Utc>>,
    /// Response timestamp.
    pub responded_at: Option<DateTime<Utc>>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for assignment records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_assignments)]
pub struct NewAssignmentRow {
    /// Assignment identifier.
    pub id: uuid::Uuid,
    /// Task reference.
    pub task_id: uuid::Uuid,
    /// Volunteer reference.
    pub volunteer_id: uuid::Uuid,
    /// Invitation lifecycle status.
    pub notification_status: String,
    /// Work execution status.
    pub work_status: String,
    /// Dispatch timestamp.
    pub sent_at: Option<DateTime<Utc>>,
    /// Response timestamp.
    pub responded_at: Option<DateTime<Utc>>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
