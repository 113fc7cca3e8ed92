//! SES-backed delivery channel.

use async_trait::async_trait;
use aws_sdk_sesv2::Client as SesClient;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};

use crate::notify::{
    domain::EmailMessage,
    ports::{DeliveryError, NotificationChannel},
};

/// Delivery channel sending through Amazon SES v2.
#[derive(Debug, Clone)]
pub struct SesChannel {
    client: SesClient,
    sender: String,
}

impl SesChannel {
    /// Creates a channel sending from the given verified address.
    #[must_use]
    pub fn new(client: SesClient, sender: impl Into<String>) -> Self {
        Self {
            client,
            sender: sender.into(),
        }
    }
}

#[async_trait]
impl NotificationChannel for SesChannel {
    async fn deliver(&self, message: &EmailMessage) -> Result<(), DeliveryError> {
        let subject = Content::builder()
            .data(message.subject())
            .charset("UTF-8")
            .build()
            .map_err(|err| DeliveryError::new(err.to_string()))?;
        let body_text = Content::builder()
            .data(message.body())
            .charset("UTF-8")
            .build()
            .map_err(|err| DeliveryError::new(err.to_string()))?;
        let email = Message::builder()
            .subject(subject)
            .body(Body::builder().text(body_text).build())
            .build();

        self.client
            .send_email()
            .from_email_address(&self.sender)
            .destination(
                Destination::builder()
                    .to_addresses(message.recipient())
                    .build(),
            )
            .content(EmailContent::builder().simple(email).build())
            .send()
            .await
            .map_err(|err| DeliveryError::new(err.to_string()))?;

        tracing::debug!(recipient = message.recipient(), "email handed to SES");
        Ok(())
    }
}
