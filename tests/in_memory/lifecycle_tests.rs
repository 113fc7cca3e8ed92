//! Creation, capacity, duplicate, and work-completion tests.

use super::helpers::EngineHarness;
use muster::assignment::{
    domain::{AssignmentEvent, NotificationStatus, ResponseAction, WorkStatus},
    ports::AssignmentRepositoryError,
    services::{AssignmentServiceError, RespondOutcome, RespondRequest},
};

#[tokio::test(flavor = "multi_thread")]
async fn created_assignments_start_pending_and_publish_events() {
    let harness = EngineHarness::new();
    let service = harness.assignment_service();
    let task_id = harness.seed_task("Registration desk", 2);
    let first = harness.seed_volunteer("Asha Rao", "asha@example.org");
    let second = harness.seed_volunteer("Ben Ito", "ben@example.org");

    let created = service
        .create_assignments(task_id, &[first, second])
        .await
        .expect("creation should succeed");

    assert_eq!(created.len(), 2);
    for assignment in &created {
        assert_eq!(
            assignment.notification_status(),
            NotificationStatus::Pending
        );
        assert_eq!(assignment.work_status(), WorkStatus::Todo);
    }
    let events = harness.publisher.events();
    assert_eq!(events.len(), 2);
    assert!(
        events
            .iter()
            .all(|event| matches!(event, AssignmentEvent::Created { .. }))
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn third_volunteer_exceeds_capacity_and_changes_nothing() {
    let harness = EngineHarness::new();
    let service = harness.assignment_service();
    let task_id = harness.seed_task("Registration desk", 2);
    let first = harness.seed_volunteer("Asha Rao", "asha@example.org");
    let second = harness.seed_volunteer("Ben Ito", "ben@example.org");
    let third = harness.seed_volunteer("Cleo Mun", "cleo@example.org");

    service
        .create_assignments(task_id, &[first, second])
        .await
        .expect("first batch should succeed");
    let overflow = service.create_assignments(task_id, &[third]).await;

    assert!(matches!(
        overflow,
        Err(AssignmentServiceError::CapacityExceeded {
            capacity: 2,
            occupied: 2,
            requested: 1,
            ..
        })
    ));
    let stored = service
        .list_by_task(task_id)
        .await
        .expect("listing should succeed");
    assert_eq!(stored.len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn duplicate_volunteer_is_rejected_atomically() {
    let harness = EngineHarness::new();
    let service = harness.assignment_service();
    let task_id = harness.seed_task("Registration desk", 3);
    let repeat = harness.seed_volunteer("Asha Rao", "asha@example.org");
    let fresh = harness.seed_volunteer("Ben Ito", "ben@example.org");

    service
        .create_assignments(task_id, &[repeat])
        .await
        .expect("first assignment should succeed");
    let duplicate = service.create_assignments(task_id, &[fresh, repeat]).await;

    assert!(matches!(
        duplicate,
        Err(AssignmentServiceError::Repository(
            AssignmentRepositoryError::DuplicateAssignment { .. }
        ))
    ));
    // The valid half of the batch must not have been written either.
    let stored = service
        .list_by_task(task_id)
        .await
        .expect("listing should succeed");
    assert_eq!(stored.len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn rejection_frees_the_slot_for_reassignment() {
    let harness = EngineHarness::new();
    let service = harness.assignment_service();
    let dispatcher = harness.dispatcher();
    let reconciler = harness.reconciler();
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
    reconciler
        .respond(RespondRequest {
            assignment_id,
            acting_volunteer_id: volunteer,
            action: ResponseAction::Reject,
            authenticated: true,
        })
        .await
        .expect("rejection should succeed");

    let again = service
        .create_assignments(task_id, &[volunteer])
        .await
        .expect("re-assignment after rejection should succeed");
    assert_eq!(again.len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_task_is_reported() {
    let harness = EngineHarness::new();
    let service = harness.assignment_service();
    let volunteer = harness.seed_volunteer("Asha Rao", "asha@example.org");

    let result = service
        .create_assignments(muster::assignment::domain::TaskId::new(), &[volunteer])
        .await;
    assert!(matches!(
        result,
        Err(AssignmentServiceError::UnknownTask(_))
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn completion_requires_acceptance_and_is_terminal() {
    let harness = EngineHarness::new();
    let service = harness.assignment_service();
    let dispatcher = harness.dispatcher();
    let reconciler = harness.reconciler();
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

    // Completing before acceptance must be refused.
    let premature = service
        .transition_work_status(assignment_id, WorkStatus::Completed)
        .await;
    assert!(premature.is_err());

    reconciler
        .respond(RespondRequest {
            assignment_id,
            acting_volunteer_id: volunteer,
            action: ResponseAction::Accept,
            authenticated: true,
        })
        .await
        .expect("acceptance should succeed");

    let completed = service
        .transition_work_status(assignment_id, WorkStatus::Completed)
        .await
        .expect("completion should succeed after acceptance");
    assert_eq!(completed.work_status(), WorkStatus::Completed);
    assert!(completed.completed_at().is_some());

    // Terminal: no further work transitions.
    let after = service
        .transition_work_status(assignment_id, WorkStatus::Review)
        .await;
    assert!(after.is_err());
}

#[tokio::test(flavor = "multi_thread")]
async fn respond_before_dispatch_overtakes_and_dispatch_skips() {
    let harness = EngineHarness::new();
    let service = harness.assignment_service();
    let dispatcher = harness.dispatcher();
    let reconciler = harness.reconciler();
    let task_id = harness.seed_task("Registration desk", 1);
    let volunteer = harness.seed_volunteer("Asha Rao", "asha@example.org");

    let created = service
        .create_assignments(task_id, &[volunteer])
        .await
        .expect("creation should succeed");
    let assignment_id = created[0].id();

    let outcome = reconciler
        .respond(RespondRequest {
            assignment_id,
            acting_volunteer_id: volunteer,
            action: ResponseAction::Accept,
            authenticated: true,
        })
        .await
        .expect("responding to a pending assignment should succeed");
    assert!(matches!(outcome, RespondOutcome::Applied(_)));

    let dispatch = dispatcher
        .dispatch(assignment_id)
        .await
        .expect("late dispatch should be discarded, not fail");
    assert!(matches!(
        dispatch,
        muster::notify::services::DispatchOutcome::Skipped {
            current: NotificationStatus::Accept
        }
    ));
}
