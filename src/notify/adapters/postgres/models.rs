//! Diesel row models for notification record persistence.

use super::schema::notification_records;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for notification records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = notification_records)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NotificationRow {
    /// Record identifier.
    pub id: uuid::Uuid,
    /// Assignment reference.
    pub assignment_id: uuid::Uuid,
    /// Addressee.
    pub volunteer_id: uuid::Uuid,
    /// Delivery channel.
    pub channel: String,
    /// Subject line.
    pub subject: String,
    /// Rendered body.
    pub body: String,
    /// Embedded response token, when present.
    pub response_token: Option<String>,
    /// Delivery timestamp.
    pub delivered_at: DateTime<Utc>,
    /// Read timestamp.
    pub read_at: Option<DateTime<Utc>>,
}

/// Insert model for notification records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notification_records)]
pub struct NewNotificationRow {
    /// Record identifier.
    pub id: uuid::Uuid,
    /// Assignment reference.
    pub assignment_id: uuid::Uuid,
    /// Addressee.
    pub volunteer_id: uuid::Uuid,
    /// Delivery channel.
    pub channel: String,
    /// Subject line.
    pub subject: String,
    /// Rendered body.
    pub body: String,
    /// Embedded response token, when present.
    pub response_token: Option<String>,
    /// Delivery timestamp.
    pub delivered_at: DateTime<Utc>,
    /// Read timestamp.
    pub read_at: Option<DateTime<Utc>>,
}
