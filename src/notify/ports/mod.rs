//! Port contracts for the notification context.

mod channel;
mod log;

pub use channel::{DeliveryError, NotificationChannel};
pub use log::{NotificationLog, NotificationLogError, NotificationLogResult};
