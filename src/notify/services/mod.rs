//! Application services for the notification context.

mod dispatcher;
mod inbox;

pub use dispatcher::{DispatchError, DispatchOutcome, DispatchResult, NotificationDispatcher};
pub use inbox::NotificationInbox;
