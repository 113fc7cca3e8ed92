//! Reconciliation of volunteer responses arriving from two trust domains.
//!
//! A response can come from an authenticated in-app session or from an
//! anonymous click on an emailed link that embeds the *intended* volunteer
//! id. The reconciler validates identity, applies the status transition
//! through the repository's compare-and-swap, and absorbs benign races
//! (duplicate clicks, concurrent tabs) instead of surfacing them.

use crate::assignment::{
    domain::{
        AssignmentEvent, AssignmentId, NotificationStatus, ResponseAction, TaskAssignment,
        VolunteerId,
    },
    ports::{AssignmentRepository, AssignmentRepositoryError, EventPublisher},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// A response request, with identity passed explicitly.
///
/// `authenticated` distinguishes a logged-in session (whose
/// `acting_volunteer_id` is the session's real identity) from a bare email
/// link click (whose `acting_volunteer_id` is the id embedded in the link).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RespondRequest {
    /// Assignment being answered.
    pub assignment_id: AssignmentId,
    /// Identity the response claims to act for.
    pub acting_volunteer_id: VolunteerId,
    /// The volunteer's answer.
    pub action: ResponseAction,
    /// Whether the caller holds an authenticated session.
    pub authenticated: bool,
}

/// Successful outcomes of a response request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RespondOutcome {
    /// The transition was applied by this call.
    Applied(TaskAssignment),
    /// The same answer was already recorded; nothing changed.
    AlreadyRecorded(TaskAssignment),
    /// The acting volunteer is not the addressee but holds their own
    /// assignment for the same task; the caller must confirm before the
    /// response is re-targeted at that assignment.
    RetargetAvailable {
        /// The acting volunteer's own assignment for the task.
        session_assignment_id: AssignmentId,
    },
}

/// Failures surfaced to the caller for user-facing messaging.
///
/// None of these are retried automatically.
#[derive(Debug, Error)]
pub enum RespondError {
    /// No such assignment exists.
    #[error("assignment not found: {0}")]
    AssignmentNotFound(AssignmentId),

    /// The assignment already carries a different terminal status.
    #[error("assignment {assignment_id} already resolved as {status}")]
    AlreadyResolved {
        /// Assignment that was already resolved.
        assignment_id: AssignmentId,
        /// The recorded terminal status.
        status: NotificationStatus,
    },

    /// The acting volunteer is neither the addressee nor the holder of an
    /// assignment for the same task.
    #[error(
        "volunteer {acting_volunteer_id} is not the addressee of assignment {assignment_id}"
    )]
    IdentityMismatch {
        /// Assignment the response was aimed at.
        assignment_id: AssignmentId,
        /// Identity the response claimed to act for.
        acting_volunteer_id: VolunteerId,
    },

    /// An anonymous link click could not be matched to the addressee; the
    /// caller must authenticate and retry.
    #[error("authentication required to answer assignment {0}")]
    AuthenticationRequired(AssignmentId),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] AssignmentRepositoryError),
}

/// Result type for response reconciliation.
pub type RespondResult = Result<RespondOutcome, RespondError>;

/// The state-machine authority for volunteer responses.
#[derive(Clone)]
pub struct ResponseReconciler<R, P, C>
where
    R: AssignmentRepository,
    P: EventPublisher,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    publisher: Arc<P>,
    clock: Arc<C>,
}

impl<R, P, C> ResponseReconciler<R, P, C>
where
    R: AssignmentRepository,
    P: EventPublisher,
    C: Clock + Send + Sync,
{
    /// Creates a new reconciler.
    #[must_use]
    pub const fn new(repository: Arc<R>, publisher: Arc<P>, clock: Arc<C>) -> Self {
        Self {
            repository,
            publisher,
            clock,
        }
    }

    /// Records a volunteer's answer to an invitation.
    ///
    /// Duplicate answers are idempotent successes; a lost race against a
    /// concurrent responder is resolved by re-reading rather than erroring
    /// when the winning answer matches the requested one.
    ///
    /// # Errors
    ///
    /// Returns the failure taxonomy documented on [`RespondError`].
    pub async fn respond(&self, request: RespondRequest) -> RespondResult {
        // The CAS chain is monotonic with at most two hops left from
        // `pending`, so this loop re-reads at most twice before every
        // branch is terminal.
        loop {
            let assignment = self
                .repository
                .find_by_id(request.assignment_id)
                .await?
                .ok_or(RespondError::AssignmentNotFound(request.assignment_id))?;

            let status = assignment.notification_status();
            if status.is_terminal() {
                return resolve_terminal(assignment, request.action);
            }

            if assignment.volunteer_id() != request.acting_volunteer_id {
                return self.reconcile_identity(&assignment, &request).await;
            }

            match self
                .repository
                .cas_notification_status(
                    request.assignment_id,
                    status,
                    request.action.status(),
                    self.clock.utc(),
                )
                .await
            {
                Ok(updated) => {
                    self.publisher.publish(&AssignmentEvent::Responded {
                        assignment_id: updated.id(),
                        action: request.action,
                        occurred_at: updated
                            .responded_at()
                            .unwrap_or_else(|| updated.updated_at()),
                    });
                    tracing::info!(
                        assignment = %updated.id(),
                        action = %request.action,
                        "response recorded"
                    );
                    return Ok(RespondOutcome::Applied(updated));
                }
                Err(AssignmentRepositoryError::StaleTransition { actual, .. }) => {
                    tracing::debug!(
                        assignment = %request.assignment_id,
                        observed = %status,
                        actual = %actual,
                        "lost response race; re-reading"
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Handles a response whose acting identity is not the addressee.
    async fn reconcile_identity(
        &self,
        assignment: &TaskAssignment,
        request: &RespondRequest,
    ) -> RespondResult {
        if !request.authenticated {
            // An anonymous click with a mismatched embedded id: defer until
            // the caller logs in and retries with a session identity.
            return Err(RespondError::AuthenticationRequired(request.assignment_id));
        }

        let own_assignment = self
            .repository
            .list_by_volunteer(request.acting_volunteer_id)
            .await?
            .into_iter()
            .find(|candidate| candidate.task_id() == assignment.task_id());

        own_assignment.map_or_else(
            || {
                Err(RespondError::IdentityMismatch {
                    assignment_id: request.assignment_id,
                    acting_volunteer_id: request.acting_volunteer_id,
                })
            },
            |own| {
                Ok(RespondOutcome::RetargetAvailable {
                    session_assignment_id: own.id(),
                })
            },
        )
    }
}

/// Evaluates a response against an already-terminal assignment.
fn resolve_terminal(assignment: TaskAssignment, action: ResponseAction) -> RespondResult {
    let status = assignment.notification_status();
    if action.matches(status) {
        return Ok(RespondOutcome::AlreadyRecorded(assignment));
    }
    Err(RespondError::AlreadyResolved {
        assignment_id: assignment.id(),
        status,
    })
}
