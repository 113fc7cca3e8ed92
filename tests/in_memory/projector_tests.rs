//! Status projection tests.

use super::helpers::EngineHarness;
use chrono::Duration;
use muster::assignment::{
    adapters::BroadcastEventPublisher,
    domain::{AssignmentEvent, NotificationStatus, ResponseAction, WorkStatus},
    ports::EventPublisher,
    services::{ProjectionError, RespondRequest, StatusProjector},
};
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread")]
async fn refresh_counts_every_notification_status() {
    let harness = EngineHarness::new();
    let service = harness.assignment_service();
    let dispatcher = harness.dispatcher();
    let reconciler = harness.reconciler();
    let sweeper = harness.sweeper();
    let projector = harness.projector();

    let task_id = harness.seed_task("Registration desk", 4);
    let volunteers: Vec<_> = [
        ("Asha Rao", "asha@example.org"),
        ("Ben Ito", "ben@example.org"),
        ("Cleo Mun", "cleo@example.org"),
        ("Dia Sen", "dia@example.org"),
    ]
    .into_iter()
    .map(|(name, email)| harness.seed_volunteer(name, email))
    .collect();

    let created = service
        .create_assignments(task_id, &volunteers)
        .await
        .expect("creation should succeed");

    // One stays pending; three are dispatched.
    for assignment in created.iter().skip(1) {
        dispatcher
            .dispatch(assignment.id())
            .await
            .expect("dispatch should succeed");
    }
    // One accepts, one rejects, one is left to expire.
    reconciler
        .respond(RespondRequest {
            assignment_id: created[1].id(),
            acting_volunteer_id: created[1].volunteer_id(),
            action: ResponseAction::Accept,
            authenticated: true,
        })
        .await
        .expect("acceptance should succeed");
    reconciler
        .respond(RespondRequest {
            assignment_id: created[2].id(),
            acting_volunteer_id: created[2].volunteer_id(),
            action: ResponseAction::Reject,
            authenticated: true,
        })
        .await
        .expect("rejection should succeed");
    harness.clock.advance(Duration::hours(25));
    sweeper.sweep_once().await.expect("sweep should succeed");

    let counts = projector.refresh().await.expect("refresh should succeed");
    assert_eq!(counts.pending, 1);
    assert_eq!(counts.sent, 0);
    assert_eq!(counts.accept, 1);
    assert_eq!(counts.reject, 1);
    assert_eq!(counts.expired, 1);
    assert_eq!(counts.total(), 4);
    assert_eq!(projector.counts_by_status(), counts);
    assert_eq!(counts.get(NotificationStatus::Accept), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn roster_attaches_display_data_in_creation_order() {
    let harness = EngineHarness::new();
    let service = harness.assignment_service();
    let dispatcher = harness.dispatcher();
    let projector = harness.projector();

    let task_id = harness.seed_task("Registration desk", 2);
    let first = harness.seed_volunteer("Asha Rao", "asha@example.org");
    let second = harness.seed_volunteer("Ben Ito", "ben@example.org");
    let created = service
        .create_assignments(task_id, &[first, second])
        .await
        .expect("creation should succeed");
    dispatcher
        .dispatch(created[0].id())
        .await
        .expect("dispatch should succeed");

    let roster = projector
        .roster_for_task(task_id)
        .await
        .expect("roster should build");

    assert_eq!(roster.len(), 2);
    assert_eq!(roster[0].volunteer_name.as_deref(), Some("Asha Rao"));
    assert_eq!(
        roster[0].volunteer_email.as_deref(),
        Some("asha@example.org")
    );
    assert_eq!(roster[0].task_title, "Registration desk");
    assert_eq!(roster[0].event_title, "Spring Marathon");
    assert_eq!(roster[0].notification_status, NotificationStatus::Sent);
    assert!(roster[0].sent_at.is_some());
    assert_eq!(roster[0].work_status, WorkStatus::Todo);
    assert_eq!(roster[1].volunteer_name.as_deref(), Some("Ben Ito"));
    assert_eq!(roster[1].notification_status, NotificationStatus::Pending);
    assert!(roster[1].sent_at.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn roster_for_unknown_task_is_an_error() {
    let harness = EngineHarness::new();
    let projector = harness.projector();
    let result = projector
        .roster_for_task(muster::assignment::domain::TaskId::new())
        .await;
    assert!(matches!(result, Err(ProjectionError::UnknownTask(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn event_feed_refreshes_the_projection() {
    let harness = EngineHarness::new();
    let service = harness.assignment_service();
    let task_id = harness.seed_task("Registration desk", 1);
    let volunteer = harness.seed_volunteer("Asha Rao", "asha@example.org");
    let created = service
        .create_assignments(task_id, &[volunteer])
        .await
        .expect("creation should succeed");

    let publisher = BroadcastEventPublisher::new(8);
    let receiver = publisher.subscribe();
    let projector = Arc::new(StatusProjector::new(
        Arc::clone(&harness.repository),
        Arc::clone(&harness.directory),
    ));
    let follower = {
        let projector = Arc::clone(&projector);
        tokio::spawn(async move { projector.run(receiver).await })
    };

    // Replay the creation on the feed, then close it; run() drains the
    // event, refreshes, and returns on close.
    publisher.publish(&AssignmentEvent::Created {
        assignment_id: created[0].id(),
        task_id,
        volunteer_id: volunteer,
        occurred_at: created[0].created_at(),
    });
    drop(publisher);
    follower.await.expect("the follower task should finish");

    assert_eq!(projector.counts_by_status().pending, 1);
}
