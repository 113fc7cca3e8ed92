//! Invitation dispatch: render, deliver, record, flip to `sent`.

use crate::assignment::{
    domain::{
        AssignmentEvent, AssignmentId, NotificationStatus, TaskAssignment, TaskId, VolunteerId,
    },
    ports::{
        AssignmentRepository, AssignmentRepositoryError, DirectoryError, EventPublisher,
        OrgDirectory,
    },
};
use crate::config::EngineConfig;
use crate::notify::{
    domain::{
        ComposeError, DeliveryChannel, EmailMessage, NotificationRecord, ResponseLinks,
        ResponseToken, compose_invitation, compose_response_notice,
    },
    ports::{DeliveryError, NotificationChannel, NotificationLog, NotificationLogError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Successful outcomes of a dispatch request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The invitation was delivered and the assignment moved to `sent`.
    Sent(TaskAssignment),
    /// Another dispatch (or a response) got there first; nothing was done.
    ///
    /// The outbound message may still have been delivered more than once
    /// across racing dispatchers, but the `sent` transition happened
    /// exactly once.
    Skipped {
        /// Status observed when the dispatch was discarded.
        current: NotificationStatus,
    },
}

/// Errors returned by dispatch operations.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No such assignment exists.
    #[error("assignment not found: {0}")]
    AssignmentNotFound(AssignmentId),

    /// The task is not known to the directory.
    #[error("unknown task: {0}")]
    UnknownTask(TaskId),

    /// The volunteer is not known to the directory.
    #[error("unknown volunteer: {0}")]
    UnknownVolunteer(VolunteerId),

    /// A response notice was requested before any response was recorded.
    #[error("assignment {assignment_id} has not been responded to (status {status})")]
    NotYetResponded {
        /// Assignment the notice was requested for.
        assignment_id: AssignmentId,
        /// Status observed at request time.
        status: NotificationStatus,
    },

    /// Email composition failed.
    #[error(transparent)]
    Compose(#[from] ComposeError),

    /// Every delivery attempt failed; the assignment remains `pending`.
    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] AssignmentRepositoryError),

    /// Directory lookup failed.
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// Notification log operation failed.
    #[error(transparent)]
    Log(#[from] NotificationLogError),
}

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Delivers invitations for `pending` assignments.
#[derive(Clone)]
pub struct NotificationDispatcher<R, D, L, Ch, P, C>
where
    R: AssignmentRepository,
    D: OrgDirectory,
    L: NotificationLog,
    Ch: NotificationChannel,
    P: EventPublisher,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    directory: Arc<D>,
    log: Arc<L>,
    channel: Arc<Ch>,
    publisher: Arc<P>,
    clock: Arc<C>,
    config: EngineConfig,
}

impl<R, D, L, Ch, P, C> NotificationDispatcher<R, D, L, Ch, P, C>
where
    R: AssignmentRepository,
    D: OrgDirectory,
    L: NotificationLog,
    Ch: NotificationChannel,
    P: EventPublisher,
    C: Clock + Send + Sync,
{
    /// Creates a new dispatcher.
    #[must_use]
    pub const fn new(
        repository: Arc<R>,
        directory: Arc<D>,
        log: Arc<L>,
        channel: Arc<Ch>,
        publisher: Arc<P>,
        clock: Arc<C>,
        config: EngineConfig,
    ) -> Self {
        Self {
            repository,
            directory,
            log,
            channel,
            publisher,
            clock,
            config,
        }
    }

    /// Dispatches the invitation for one `pending` assignment.
    ///
    /// Delivery happens before the status flip, so a crash between the two
    /// re-delivers rather than losing the invitation: at-least-once
    /// delivery, exactly-once `sent` transition. A lost swap is discarded
    /// silently as [`DispatchOutcome::Skipped`].
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Delivery`] when every attempt fails (the
    /// assignment stays `pending`), plus the lookup and persistence errors
    /// documented on [`DispatchError`].
    pub async fn dispatch(&self, assignment_id: AssignmentId) -> DispatchResult<DispatchOutcome> {
        let assignment = self
            .repository
            .find_by_id(assignment_id)
            .await?
            .ok_or(DispatchError::AssignmentNotFound(assignment_id))?;
        if assignment.notification_status() != NotificationStatus::Pending {
            return Ok(DispatchOutcome::Skipped {
                current: assignment.notification_status(),
            });
        }

        let task = self
            .directory
            .task(assignment.task_id())
            .await?
            .ok_or(DispatchError::UnknownTask(assignment.task_id()))?;
        let volunteer = self
            .directory
            .volunteer(assignment.volunteer_id())
            .await?
            .ok_or(DispatchError::UnknownVolunteer(assignment.volunteer_id()))?;

        let now = self.clock.utc();
        let token = ResponseToken::new(assignment_id, assignment.volunteer_id(), now)
            .encode(&self.config.token_secret);
        let links = ResponseLinks::build(
            &self.config.base_url,
            assignment_id,
            assignment.volunteer_id(),
            &token,
        );
        let response_deadline = now + self.config.response_window();
        let email = compose_invitation(&task, &volunteer, &links, response_deadline)?;

        self.deliver_with_retry(&email).await?;

        let delivered_at = self.clock.utc();
        let email_record = NotificationRecord::new(
            assignment_id,
            assignment.volunteer_id(),
            DeliveryChannel::Email,
            email.subject(),
            email.body(),
            delivered_at,
        )
        .with_response_token(&token);
        self.log.append(&email_record).await?;

        let in_app_record = NotificationRecord::new(
            assignment_id,
            assignment.volunteer_id(),
            DeliveryChannel::InApp,
            email.subject(),
            format!(
                "You have been assigned to task \"{}\" for event \"{}\".",
                task.title(),
                task.event_title()
            ),
            delivered_at,
        );
        self.log.append(&in_app_record).await?;

        match self
            .repository
            .cas_notification_status(
                assignment_id,
                NotificationStatus::Pending,
                NotificationStatus::Sent,
                delivered_at,
            )
            .await
        {
            Ok(updated) => {
                self.publisher.publish(&AssignmentEvent::Dispatched {
                    assignment_id,
                    occurred_at: updated.sent_at().unwrap_or(delivered_at),
                });
                tracing::info!(assignment = %assignment_id, "invitation dispatched");
                Ok(DispatchOutcome::Sent(updated))
            }
            Err(AssignmentRepositoryError::StaleTransition { actual, .. }) => {
                tracing::debug!(
                    assignment = %assignment_id,
                    current = %actual,
                    "dispatch lost the sent race; discarding"
                );
                Ok(DispatchOutcome::Skipped { current: actual })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Dispatches a batch of assignments independently.
    ///
    /// One assignment's failure never blocks the others; each outcome is
    /// reported alongside its assignment id.
    pub async fn dispatch_batch(
        &self,
        assignment_ids: &[AssignmentId],
    ) -> Vec<(AssignmentId, DispatchResult<DispatchOutcome>)> {
        let mut outcomes = Vec::with_capacity(assignment_ids.len());
        for id in assignment_ids {
            let outcome = self.dispatch(*id).await;
            if let Err(err) = &outcome {
                tracing::warn!(assignment = %id, error = %err, "batch dispatch entry failed");
            }
            outcomes.push((*id, outcome));
        }
        outcomes
    }

    /// Sends the organizer a notice that a volunteer responded.
    ///
    /// Best effort: a single delivery attempt, no state transition and no
    /// notification record.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::NotYetResponded`] when the assignment
    /// carries no response yet, plus lookup and delivery errors.
    pub async fn send_response_notice(
        &self,
        assignment_id: AssignmentId,
    ) -> DispatchResult<()> {
        let assignment = self
            .repository
            .find_by_id(assignment_id)
            .await?
            .ok_or(DispatchError::AssignmentNotFound(assignment_id))?;
        let action = match assignment.notification_status() {
            NotificationStatus::Accept => crate::assignment::domain::ResponseAction::Accept,
            NotificationStatus::Reject => crate::assignment::domain::ResponseAction::Reject,
            status => {
                return Err(DispatchError::NotYetResponded {
                    assignment_id,
                    status,
                });
            }
        };

        let task = self
            .directory
            .task(assignment.task_id())
            .await?
            .ok_or(DispatchError::UnknownTask(assignment.task_id()))?;
        let volunteer = self
            .directory
            .volunteer(assignment.volunteer_id())
            .await?
            .ok_or(DispatchError::UnknownVolunteer(assignment.volunteer_id()))?;

        let responded_at = assignment.responded_at().unwrap_or_else(|| self.clock.utc());
        let notice = compose_response_notice(
            &task,
            &volunteer,
            action,
            responded_at,
            &self.config.organizer_email,
        )?;
        self.channel.deliver(&notice).await?;
        tracing::info!(assignment = %assignment_id, action = %action, "response notice sent");
        Ok(())
    }

    /// Delivers with bounded retry and doubling backoff.
    async fn deliver_with_retry(&self, email: &EmailMessage) -> Result<(), DeliveryError> {
        let max_attempts = self.config.delivery_max_attempts.max(1);
        let mut backoff = self.config.delivery_backoff();
        let mut attempt = 1_u32;
        loop {
            match self.channel.deliver(email).await {
                Ok(()) => return Ok(()),
                Err(err) if attempt < max_attempts => {
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        error = %err,
                        "delivery attempt failed; backing off"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = backoff.saturating_mul(2);
                    attempt += 1;
                }
                Err(err) => {
                    tracing::error!(
                        attempts = max_attempts,
                        error = %err,
                        "delivery failed; assignment stays pending"
                    );
                    return Err(err);
                }
            }
        }
    }
}
