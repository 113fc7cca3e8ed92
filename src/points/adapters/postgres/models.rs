//! Diesel row models for points persistence.

use super::schema::points_entries;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for points entries.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = points_entries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PointsRow {
    /// Entry identifier.
    pub id: uuid::Uuid,
    /// Credited volunteer.
    pub volunteer_id: uuid::Uuid,
    /// Granted point value.
    pub points: i32,
    /// Human-readable reason.
    pub reason: String,
    /// Grant source kind.
    pub source: String,
    /// Assignment reference for completion grants.
    pub assignment_id: Option<uuid::Uuid>,
    /// Task reference for completion grants.
    pub task_id: Option<uuid::Uuid>,
    /// Grant timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for points entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = points_entries)]
pub struct NewPointsRow {
    /// Entry identifier.
    pub id: uuid::Uuid,
    /// Credited volunteer.
    pub volunteer_id: uuid::Uuid,
    /// Granted point value.
    pub points: i32,
    /// Human-readable reason.
    pub reason: String,
    /// Grant source kind.
    pub source: String,
    /// Assignment reference for completion grants.
    pub assignment_id: Option<uuid::Uuid>,
    /// Task reference for completion grants.
    pub task_id: Option<uuid::Uuid>,
    /// Grant timestamp.
    pub created_at: DateTime<Utc>,
}
