//! Response-link tokens.
//!
//! The emailed accept/reject links carry no authentication, only a token
//! naming the assignment and the intended volunteer. The token is
//! tamper-evident: a digest over the payload and a deployment secret is
//! appended, so an edited volunteer id fails verification before the
//! reconciler ever sees it.

use crate::assignment::domain::{AssignmentId, VolunteerId};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, TimeZone, Utc};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

/// Errors returned while decoding a response token.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    /// The token is not a well-formed payload.digest pair.
    #[error("malformed response token")]
    Malformed,

    /// The digest does not match the payload; the token was altered.
    #[error("response token digest mismatch")]
    DigestMismatch,
}

/// The identity claim embedded in a response link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseToken {
    assignment_id: AssignmentId,
    volunteer_id: VolunteerId,
    issued_at: DateTime<Utc>,
}

impl ResponseToken {
    /// Creates a token for one assignment and its addressee.
    #[must_use]
    pub const fn new(
        assignment_id: AssignmentId,
        volunteer_id: VolunteerId,
        issued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            assignment_id,
            volunteer_id,
            issued_at,
        }
    }

    /// Returns the assignment the token refers to.
    #[must_use]
    pub const fn assignment_id(&self) -> AssignmentId {
        self.assignment_id
    }

    /// Returns the intended volunteer.
    #[must_use]
    pub const fn volunteer_id(&self) -> VolunteerId {
        self.volunteer_id
    }

    /// Returns when the token was issued.
    #[must_use]
    pub const fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// Encodes the token as `base64(payload).base64(digest)`.
    #[must_use]
    pub fn encode(&self, secret: &str) -> String {
        let payload = self.payload();
        let digest = digest_for(&payload, secret);
        format!("{}.{digest}", URL_SAFE_NO_PAD.encode(payload.as_bytes()))
    }

    /// Decodes and verifies a token.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Malformed`] when the structure cannot be
    /// parsed and [`TokenError::DigestMismatch`] when the payload was
    /// altered after issue.
    pub fn decode(value: &str, secret: &str) -> Result<Self, TokenError> {
        let (encoded_payload, digest) = value.split_once('.').ok_or(TokenError::Malformed)?;
        let payload_bytes = URL_SAFE_NO_PAD
            .decode(encoded_payload)
            .map_err(|_| TokenError::Malformed)?;
        let payload = String::from_utf8(payload_bytes).map_err(|_| TokenError::Malformed)?;

        if digest_for(&payload, secret) != digest {
            return Err(TokenError::DigestMismatch);
        }

        let mut parts = payload.split(':');
        let assignment_id = parse_uuid(parts.next())?;
        let volunteer_id = parse_uuid(parts.next())?;
        let issued_ts: i64 = parts
            .next()
            .ok_or(TokenError::Malformed)?
            .parse()
            .map_err(|_| TokenError::Malformed)?;
        if parts.next().is_some() {
            return Err(TokenError::Malformed);
        }
        let issued_at = Utc
            .timestamp_opt(issued_ts, 0)
            .single()
            .ok_or(TokenError::Malformed)?;

        Ok(Self {
            assignment_id: AssignmentId::from_uuid(assignment_id),
            volunteer_id: VolunteerId::from_uuid(volunteer_id),
            issued_at,
        })
    }

    fn payload(&self) -> String {
        format!(
            "{}:{}:{}",
            self.assignment_id,
            self.volunteer_id,
            self.issued_at.timestamp()
        )
    }
}

fn digest_for(payload: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    hasher.update(b":");
    hasher.update(secret.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

fn parse_uuid(part: Option<&str>) -> Result<Uuid, TokenError> {
    part.ok_or(TokenError::Malformed)?
        .parse()
        .map_err(|_| TokenError::Malformed)
}

/// The accept and reject links delivered in an invitation email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseLinks {
    accept: String,
    reject: String,
}

impl ResponseLinks {
    /// Builds the canonical response links for an assignment.
    #[must_use]
    pub fn build(
        base_url: &str,
        assignment_id: AssignmentId,
        volunteer_id: VolunteerId,
        token: &str,
    ) -> Self {
        let base = base_url.trim_end_matches('/');
        let link = |action: &str| {
            format!(
                "{base}/volunteer/task-response?action={action}&id={assignment_id}&volunteerId={volunteer_id}&token={token}"
            )
        };
        Self {
            accept: link("accept"),
            reject: link("reject"),
        }
    }

    /// Returns the accept link.
    #[must_use]
    pub fn accept(&self) -> &str {
        &self.accept
    }

    /// Returns the reject link.
    #[must_use]
    pub fn reject(&self) -> &str {
        &self.reject
    }
}
