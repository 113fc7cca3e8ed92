//! In-memory adapters for the notification context.

mod channel;
mod log;

pub use channel::RecordingChannel;
pub use log::InMemoryNotificationLog;
