//! Notification delivery records.

use crate::assignment::domain::{AssignmentId, VolunteerId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a notification record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(Uuid);

impl NotificationId {
    /// Creates a new random notification identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a notification identifier from an existing UUID.
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

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Channel a notification was delivered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryChannel {
    /// In-app notification center entry.
    InApp,
    /// Outbound email.
    Email,
}

impl DeliveryChannel {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InApp => "in_app",
            Self::Email => "email",
        }
    }
}

impl TryFrom<&str> for DeliveryChannel {
    type Error = ParseDeliveryChannelError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "in_app" => Ok(Self::InApp),
            "email" => Ok(Self::Email),
            _ => Err(ParseDeliveryChannelError(value.to_owned())),
        }
    }
}

/// Error returned while parsing delivery channels from persistence.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("unknown delivery channel: {0}")]
pub struct ParseDeliveryChannelError(pub String);

/// One outbound delivery attempt for an assignment.
///
/// Multiple records may exist per assignment (resends, one per channel);
/// response reconciliation always keys off the assignment, never the
/// record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRecord {
    id: NotificationId,
    assignment_id: AssignmentId,
    volunteer_id: VolunteerId,
    channel: DeliveryChannel,
    subject: String,
    body: String,
    response_token: Option<String>,
    delivered_at: DateTime<Utc>,
    read_at: Option<DateTime<Utc>>,
}

impl NotificationRecord {
    /// Creates a record of one delivery.
    #[must_use]
    pub fn new(
        assignment_id: AssignmentId,
        volunteer_id: VolunteerId,
        channel: DeliveryChannel,
        subject: impl Into<String>,
        body: impl Into<String>,
        delivered_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: NotificationId::new(),
            assignment_id,
            volunteer_id,
            channel,
            subject: subject.into(),
            body: body.into(),
            response_token: None,
            delivered_at,
            read_at: None,
        }
    }

    /// Attaches the response token embedded in the delivered links.
    #[must_use]
    pub fn with_response_token(mut self, token: impl Into<String>) -> Self {
        self.response_token = Some(token.into());
        self
    }

    /// Returns the record identifier.
    #[must_use]
    pub const fn id(&self) -> NotificationId {
        self.id
    }

    /// Returns the assignment this delivery refers to.
    #[must_use]
    pub const fn assignment_id(&self) -> AssignmentId {
        self.assignment_id
    }

    /// Returns the addressee.
    #[must_use]
    pub const fn volunteer_id(&self) -> VolunteerId {
        self.volunteer_id
    }

    /// Returns the delivery channel.
    #[must_use]
    pub const fn channel(&self) -> DeliveryChannel {
        self.channel
    }

    /// Returns the subject line.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Returns the rendered body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns the embedded response token, if the channel carries one.
    #[must_use]
    pub fn response_token(&self) -> Option<&str> {
        self.response_token.as_deref()
    }

    /// Returns when the delivery happened.
    #[must_use]
    pub const fn delivered_at(&self) -> DateTime<Utc> {
        self.delivered_at
    }

    /// Returns when the record was read, if it was.
    #[must_use]
    pub const fn read_at(&self) -> Option<DateTime<Utc>> {
        self.read_at
    }

    /// Returns whether the record has been read.
    #[must_use]
    pub const fn is_read(&self) -> bool {
        self.read_at.is_some()
    }

    /// Marks the record read; idempotent, the first read time wins.
    pub fn mark_read(&mut self, at: DateTime<Utc>) {
        if self.read_at.is_none() {
            self.read_at = Some(at);
        }
    }

    /// Reconstructs a record from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedNotificationData) -> Self {
        Self {
            id: data.id,
            assignment_id: data.assignment_id,
            volunteer_id: data.volunteer_id,
            channel: data.channel,
            subject: data.subject,
            body: data.body,
            response_token: data.response_token,
            delivered_at: data.delivered_at,
            read_at: data.read_at,
        }
    }
}

/// Parameter object for reconstructing a persisted notification record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedNotificationData {
    /// Persisted record identifier.
    pub id: NotificationId,
    /// Persisted assignment reference.
    pub assignment_id: AssignmentId,
    /// Persisted addressee.
    pub volunteer_id: VolunteerId,
    /// Persisted delivery channel.
    pub channel: DeliveryChannel,
    /// Persisted subject line.
    pub subject: String,
    /// Persisted rendered body.
    pub body: String,
    /// Persisted response token, if any.
    pub response_token: Option<String>,
    /// Persisted delivery timestamp.
    pub delivered_at: DateTime<Utc>,
    /// Persisted read timestamp, if any.
    pub read_at: Option<DateTime<Utc>>,
}
