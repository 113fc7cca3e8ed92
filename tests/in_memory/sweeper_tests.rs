//! Expiry window tests.

use super::helpers::EngineHarness;
use chrono::Duration;
use muster::assignment::{
    domain::{AssignmentEvent, AssignmentId, NotificationStatus, ResponseAction},
    ports::AssignmentRepository,
    services::{RespondError, RespondRequest},
};

#[tokio::test(flavor = "multi_thread")]
async fn unanswered_invitations_expire_only_after_the_window() {
    let harness = EngineHarness::new();
    let service = harness.assignment_service();
    let dispatcher = harness.dispatcher();
    let reconciler = harness.reconciler();
    let sweeper = harness.sweeper();

    let task_id = harness.seed_task("Registration desk", 2);
    let first = harness.seed_volunteer("Asha Rao", "asha@example.org");
    let second = harness.seed_volunteer("Ben Ito", "ben@example.org");
    let created = service
        .create_assignments(task_id, &[first, second])
        .await
        .expect("creation should succeed");
    let first_assignment = created[0].id();
    let second_assignment = created[1].id();

    for assignment in &created {
        dispatcher
            .dispatch(assignment.id())
            .await
            .expect("dispatch should succeed");
    }

    reconciler
        .respond(RespondRequest {
            assignment_id: first_assignment,
            acting_volunteer_id: first,
            action: ResponseAction::Accept,
            authenticated: true,
        })
        .await
        .expect("acceptance should succeed");

    // Inside the window nothing is due.
    harness.clock.advance(Duration::hours(1));
    let early = sweeper.sweep_once().await.expect("sweep should succeed");
    assert_eq!(early.scanned, 0);
    assert_eq!(early.expired, 0);
    assert_eq!(
        status_of(&harness, second_assignment).await,
        NotificationStatus::Sent
    );

    // Past the window the unanswered invitation expires; the accepted one
    // is untouched.
    harness.clock.advance(Duration::hours(24));
    let late = sweeper.sweep_once().await.expect("sweep should succeed");
    assert_eq!(late.scanned, 1);
    assert_eq!(late.expired, 1);
    assert_eq!(late.lost_races, 0);
    assert_eq!(
        status_of(&harness, second_assignment).await,
        NotificationStatus::Expired
    );
    assert_eq!(
        status_of(&harness, first_assignment).await,
        NotificationStatus::Accept
    );

    let expired_events: Vec<_> = harness
        .publisher
        .events()
        .into_iter()
        .filter(|event| matches!(event, AssignmentEvent::Expired { .. }))
        .collect();
    assert_eq!(expired_events.len(), 1);
    assert_eq!(expired_events[0].assignment_id(), second_assignment);
}

#[tokio::test(flavor = "multi_thread")]
async fn pending_assignments_never_expire() {
    let harness = EngineHarness::new();
    let service = harness.assignment_service();
    let sweeper = harness.sweeper();
    let task_id = harness.seed_task("Registration desk", 1);
    let volunteer = harness.seed_volunteer("Asha Rao", "asha@example.org");
    let created = service
        .create_assignments(task_id, &[volunteer])
        .await
        .expect("creation should succeed");

    harness.clock.advance(Duration::days(7));
    let report = sweeper.sweep_once().await.expect("sweep should succeed");
    assert_eq!(report.scanned, 0);
    assert_eq!(
        status_of(&harness, created[0].id()).await,
        NotificationStatus::Pending
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn overlapping_sweeps_expire_each_row_once() {
    let harness = EngineHarness::new();
    let service = harness.assignment_service();
    let dispatcher = harness.dispatcher();
    let sweeper = harness.sweeper();
    let task_id = harness.seed_task("Registration desk", 1);
    let volunteer = harness.seed_volunteer("Asha Rao", "asha@example.org");
    let created = service
        .create_assignments(task_id, &[volunteer])
        .await
        .expect("creation should succeed");
    dispatcher
        .dispatch(created[0].id())
        .await
        .expect("dispatch should succeed");

    harness.clock.advance(Duration::hours(25));
    let (first, second) = tokio::join!(sweeper.sweep_once(), sweeper.sweep_once());
    let first = first.expect("first sweep should succeed");
    let second = second.expect("second sweep should succeed");

    assert_eq!(first.expired + second.expired, 1);
    let expired_events = harness
        .publisher
        .events()
        .into_iter()
        .filter(|event| matches!(event, AssignmentEvent::Expired { .. }))
        .count();
    assert_eq!(expired_events, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn responses_to_expired_assignments_report_the_expiry() {
    let harness = EngineHarness::new();
    let service = harness.assignment_service();
    let dispatcher = harness.dispatcher();
    let reconciler = harness.reconciler();
    let sweeper = harness.sweeper();
    let task_id = harness.seed_task("Registration desk", 1);
    let volunteer = harness.seed_volunteer("Asha Rao", "asha@example.org");
    let created = service
        .create_assignments(task_id, &[volunteer])
        .await
        .expect("creation should succeed");
    let assignment_id = created[0].id();
    dispatcher
        .dispatch(assignment_id)
        .await
        .expect("dispatch should succeed");

    harness.clock.advance(Duration::hours(25));
    sweeper.sweep_once().await.expect("sweep should succeed");

    let late_click = reconciler
        .respond(RespondRequest {
            assignment_id,
            acting_volunteer_id: volunteer,
            action: ResponseAction::Accept,
            authenticated: true,
        })
        .await;
    assert!(matches!(
        late_click,
        Err(RespondError::AlreadyResolved {
            status: NotificationStatus::Expired,
            ..
        })
    ));
}

async fn status_of(harness: &EngineHarness, id: AssignmentId) -> NotificationStatus {
    harness
        .repository
        .find_by_id(id)
        .await
        .expect("lookup should succeed")
        .expect("assignment must exist")
        .notification_status()
}
