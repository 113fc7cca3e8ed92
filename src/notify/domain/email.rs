//! Email composition for assignment notifications.
//!
//! Bodies are rendered from embedded templates with a JSON context, the
//! same way the rest of the system renders parameterised text.

use super::ResponseLinks;
use crate::assignment::domain::{ResponseAction, TaskRecord, Volunteer};
use chrono::{DateTime, Utc};
use minijinja::Environment;
use serde_json::{Map, Value};
use thiserror::Error;

/// Text template for the invitation email sent to the volunteer.
const INVITATION_TEMPLATE: &str = "\
Hello {{ volunteer_name }},

You have been assigned to the task \"{{ task_title }}\" for the event \
\"{{ event_title }}\".

{{ task_description }}

Deadline: {{ deadline }}
Please respond by {{ response_deadline }}.

Accept: {{ accept_url }}
Decline: {{ reject_url }}
";

/// Text template for the response notice sent to an organizer.
const RESPONSE_NOTICE_TEMPLATE: &str = "\
Hello,

{{ volunteer_name }} has {{ decision }} the task \"{{ task_title }}\" for \
the event \"{{ event_title }}\".

Responded at: {{ responded_at }}
";

/// Errors returned while composing an email.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ComposeError {
    /// Template rendering failed.
    #[error("template render failed: {reason}")]
    TemplateRender {
        /// Description of the rendering failure.
        reason: String,
    },
}

/// A fully rendered outbound email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    recipient: String,
    subject: String,
    body: String,
}

impl EmailMessage {
    /// Creates an email message.
    #[must_use]
    pub fn new(
        recipient: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            recipient: recipient.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }

    /// Returns the recipient address.
    #[must_use]
    pub fn recipient(&self) -> &str {
        &self.recipient
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
}

/// Composes the invitation email for a freshly assigned task.
///
/// # Errors
///
/// Returns [`ComposeError::TemplateRender`] when the template context
/// cannot be rendered.
pub fn compose_invitation(
    task: &TaskRecord,
    volunteer: &Volunteer,
    links: &ResponseLinks,
    response_deadline: DateTime<Utc>,
) -> Result<EmailMessage, ComposeError> {
    let mut context = Map::new();
    context.insert(
        "volunteer_name".to_owned(),
        Value::String(volunteer.name().to_owned()),
    );
    context.insert(
        "task_title".to_owned(),
        Value::String(task.title().to_owned()),
    );
    context.insert(
        "event_title".to_owned(),
        Value::String(task.event_title().to_owned()),
    );
    context.insert(
        "task_description".to_owned(),
        Value::String(
            task.description()
                .unwrap_or("No description provided.")
                .to_owned(),
        ),
    );
    context.insert(
        "deadline".to_owned(),
        Value::String(task.deadline().map_or_else(
            || "not specified".to_owned(),
            |deadline| format_timestamp(deadline),
        )),
    );
    context.insert(
        "response_deadline".to_owned(),
        Value::String(format_timestamp(response_deadline)),
    );
    context.insert(
        "accept_url".to_owned(),
        Value::String(links.accept().to_owned()),
    );
    context.insert(
        "reject_url".to_owned(),
        Value::String(links.reject().to_owned()),
    );

    let body = render(INVITATION_TEMPLATE, &context)?;
    Ok(EmailMessage::new(
        volunteer.email(),
        format!("New task assignment: {}", task.title()),
        body,
    ))
}

/// Composes the notice informing an organizer of a volunteer's response.
///
/// # Errors
///
/// Returns [`ComposeError::TemplateRender`] when the template context
/// cannot be rendered.
pub fn compose_response_notice(
    task: &TaskRecord,
    volunteer: &Volunteer,
    action: ResponseAction,
    responded_at: DateTime<Utc>,
    recipient: &str,
) -> Result<EmailMessage, ComposeError> {
    let decision = match action {
        ResponseAction::Accept => "accepted",
        ResponseAction::Reject => "declined",
    };

    let mut context = Map::new();
    context.insert(
        "volunteer_name".to_owned(),
        Value::String(volunteer.name().to_owned()),
    );
    context.insert("decision".to_owned(), Value::String(decision.to_owned()));
    context.insert(
        "task_title".to_owned(),
        Value::String(task.title().to_owned()),
    );
    context.insert(
        "event_title".to_owned(),
        Value::String(task.event_title().to_owned()),
    );
    context.insert(
        "responded_at".to_owned(),
        Value::String(format_timestamp(responded_at)),
    );

    let body = render(RESPONSE_NOTICE_TEMPLATE, &context)?;
    Ok(EmailMessage::new(
        recipient,
        format!("Task response: {}", task.title()),
        body,
    ))
}

fn render(template: &str, context: &Map<String, Value>) -> Result<String, ComposeError> {
    let environment = Environment::new();
    environment
        .render_str(template, context)
        .map_err(|error| ComposeError::TemplateRender {
            reason: error.to_string(),
        })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M UTC").to_string()
}
