//! `PostgreSQL` adapters for notification persistence.

mod log;
mod models;
mod schema;

pub use log::{NotificationPgPool, PostgresNotificationLog};
