//! Engine configuration.
//!
//! Every knob has a default, so an empty TOML document yields a working
//! configuration; deployments override only what they need.

use chrono::Duration;
use serde::Deserialize;
use thiserror::Error;

/// Error returned while parsing a configuration document.
#[derive(Debug, Error)]
#[error("invalid configuration: {0}")]
pub struct ConfigError(#[from] toml::de::Error);

/// Tunable parameters of the assignment engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Public base URL that response links are built against.
    pub base_url: String,
    /// Sender address for outbound notification email.
    pub sender: String,
    /// Organizer address that receives response notices.
    pub organizer_email: String,
    /// Deployment secret mixed into response-token digests.
    pub token_secret: String,
    /// Seconds a volunteer has to answer an invitation before it expires.
    pub response_window_secs: i64,
    /// Seconds between expiration sweep passes.
    pub sweep_interval_secs: u64,
    /// Maximum delivery attempts per dispatch before giving up.
    pub delivery_max_attempts: u32,
    /// Initial backoff between delivery attempts; doubles per retry.
    pub delivery_backoff_ms: u64,
    /// Points granted for completing an assignment.
    pub completion_points: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5173".to_owned(),
            sender: "notifications@example.org".to_owned(),
            organizer_email: "organizers@example.org".to_owned(),
            token_secret: String::new(),
            response_window_secs: 24 * 60 * 60,
            sweep_interval_secs: 300,
            delivery_max_attempts: 3,
            delivery_backoff_ms: 500,
            completion_points: 50,
        }
    }
}

impl EngineConfig {
    /// Parses a TOML configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the document is not valid TOML or
    /// contains unknown fields.
    pub fn from_toml_str(document: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(document)?)
    }

    /// Returns the response window as a duration.
    #[must_use]
    pub fn response_window(&self) -> Duration {
        Duration::seconds(self.response_window_secs)
    }

    /// Returns the sweep interval as a std duration.
    #[must_use]
    pub const fn sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.sweep_interval_secs)
    }

    /// Returns the initial delivery backoff as a std duration.
    #[must_use]
    pub const fn delivery_backoff(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.delivery_backoff_ms)
    }
}
