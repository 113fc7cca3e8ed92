//! Domain model for notification delivery.

mod email;
mod record;
mod token;

pub use email::{ComposeError, EmailMessage, compose_invitation, compose_response_notice};
pub use record::{
    DeliveryChannel, NotificationId, NotificationRecord, ParseDeliveryChannelError,
    PersistedNotificationData,
};
pub use token::{ResponseLinks, ResponseToken, TokenError};
