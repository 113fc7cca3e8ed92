//! Periodic expiry of unanswered invitations.

use crate::assignment::{
    domain::{AssignmentEvent, NotificationStatus},
    ports::{AssignmentRepository, AssignmentRepositoryError, EventPublisher},
};
use chrono::Duration;
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Outcome summary of one sweep pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SweepReport {
    /// Number of due assignments the pass considered.
    pub scanned: usize,
    /// Number of assignments this pass moved to `expired`.
    pub expired: usize,
    /// Number of swaps lost to a concurrent response; skipped silently.
    pub lost_races: usize,
}

/// Errors returned by sweep passes.
#[derive(Debug, Error)]
pub enum SweepError {
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] AssignmentRepositoryError),
}

/// Ages out `sent` assignments whose response window has elapsed.
///
/// Sweeps are idempotent and safe to run with arbitrary overlap: the
/// per-row compare-and-swap is the only serialization point, so a
/// volunteer responding inside the scan window always wins over expiry.
#[derive(Clone)]
pub struct ExpirationSweeper<R, P, C>
where
    R: AssignmentRepository,
    P: EventPublisher,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    publisher: Arc<P>,
    clock: Arc<C>,
    response_window: Duration,
}

impl<R, P, C> ExpirationSweeper<R, P, C>
where
    R: AssignmentRepository,
    P: EventPublisher,
    C: Clock + Send + Sync,
{
    /// Creates a sweeper with the given response window.
    #[must_use]
    pub const fn new(
        repository: Arc<R>,
        publisher: Arc<P>,
        clock: Arc<C>,
        response_window: Duration,
    ) -> Self {
        Self {
            repository,
            publisher,
            clock,
            response_window,
        }
    }

    /// Runs one sweep pass.
    ///
    /// # Errors
    ///
    /// Returns [`SweepError::Repository`] when the due-assignment scan
    /// fails; individual lost swaps are counted, not errors.
    pub async fn sweep_once(&self) -> Result<SweepReport, SweepError> {
        let now = self.clock.utc();
        let due_before = now - self.response_window;
        let due = self.repository.list_sent_due(due_before).await?;

        let mut report = SweepReport {
            scanned: due.len(),
            ..SweepReport::default()
        };
        for assignment in due {
            let swapped = self
                .repository
                .cas_notification_status(
                    assignment.id(),
                    NotificationStatus::Sent,
                    NotificationStatus::Expired,
                    now,
                )
                .await;
            match swapped {
                Ok(expired) => {
                    report.expired += 1;
                    self.publisher.publish(&AssignmentEvent::Expired {
                        assignment_id: expired.id(),
                        occurred_at: now,
                    });
                }
                Err(AssignmentRepositoryError::StaleTransition { .. }) => {
                    // The volunteer answered between scan and swap;
                    // expiration never overrides a real response.
                    report.lost_races += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }

        if report.scanned > 0 {
            tracing::info!(
                scanned = report.scanned,
                expired = report.expired,
                lost_races = report.lost_races,
                "expiration sweep finished"
            );
        }
        Ok(report)
    }

    /// Drives sweep passes on a fixed interval; never returns.
    ///
    /// Callers spawn this on the runtime and abort the handle to stop it.
    /// Pass failures are logged and the loop continues at the next tick.
    pub async fn run(&self, every: std::time::Duration) {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(err) = self.sweep_once().await {
                tracing::error!(error = %err, "expiration sweep failed");
            }
        }
    }
}
