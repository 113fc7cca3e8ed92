//! Exactly-once completion credit tests.

use super::helpers::EngineHarness;
use muster::assignment::{
    domain::{AssignmentId, ResponseAction, VolunteerId, WorkStatus},
    services::RespondRequest,
};
use muster::points::ports::PointsRepository;
use muster::points::services::GrantError;

struct CompletedAssignment {
    assignment_id: AssignmentId,
    volunteer: VolunteerId,
}

/// Runs one assignment through accept and completion.
async fn completed_assignment(harness: &EngineHarness) -> CompletedAssignment {
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
            action: ResponseAction::Accept,
            authenticated: true,
        })
        .await
        .expect("acceptance should succeed");
    service
        .transition_work_status(assignment_id, WorkStatus::Completed)
        .await
        .expect("completion should succeed");
    CompletedAssignment {
        assignment_id,
        volunteer,
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn completion_grant_names_the_task_and_uses_configured_value() {
    let harness = EngineHarness::new();
    let ledger = harness.ledger();
    let completed = completed_assignment(&harness).await;

    let entry = ledger
        .grant_completion(completed.assignment_id)
        .await
        .expect("grant should succeed");

    assert_eq!(entry.volunteer_id(), completed.volunteer);
    assert_eq!(entry.points(), harness.config.completion_points);
    assert_eq!(entry.reason(), "Completed task \"Registration desk\"");
    assert_eq!(
        entry.completion_assignment(),
        Some(completed.assignment_id)
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn grant_before_completion_is_refused() {
    let harness = EngineHarness::new();
    let service = harness.assignment_service();
    let ledger = harness.ledger();
    let task_id = harness.seed_task("Registration desk", 1);
    let volunteer = harness.seed_volunteer("Asha Rao", "asha@example.org");
    let created = service
        .create_assignments(task_id, &[volunteer])
        .await
        .expect("creation should succeed");

    let premature = ledger.grant_completion(created[0].id()).await;
    assert!(matches!(
        premature,
        Err(GrantError::NotCompleted {
            work_status: WorkStatus::Todo,
            ..
        })
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn second_grant_is_refused_and_nothing_is_appended() {
    let harness = EngineHarness::new();
    let ledger = harness.ledger();
    let completed = completed_assignment(&harness).await;

    ledger
        .grant_completion(completed.assignment_id)
        .await
        .expect("first grant should succeed");
    let second = ledger.grant_completion(completed.assignment_id).await;
    assert!(matches!(second, Err(GrantError::AlreadyGranted(_))));

    let total = ledger
        .volunteer_total(completed.volunteer)
        .await
        .expect("total should compute");
    assert_eq!(total, u64::from(harness.config.completion_points));
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_grants_store_exactly_one_entry() {
    let harness = EngineHarness::new();
    let ledger = harness.ledger();
    let completed = completed_assignment(&harness).await;

    let (first, second) = tokio::join!(
        ledger.grant_completion(completed.assignment_id),
        ledger.grant_completion(completed.assignment_id)
    );

    let granted = [&first, &second].iter().filter(|r| r.is_ok()).count();
    assert_eq!(granted, 1, "exactly one concurrent grant wins");

    let entries = harness
        .points
        .list_by_volunteer(completed.volunteer)
        .await
        .expect("listing should succeed");
    assert_eq!(entries.len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn totals_sum_only_the_volunteers_entries() {
    let harness = EngineHarness::new();
    let ledger = harness.ledger();
    let completed = completed_assignment(&harness).await;
    ledger
        .grant_completion(completed.assignment_id)
        .await
        .expect("grant should succeed");

    let other = harness.seed_volunteer("Ben Ito", "ben@example.org");
    let other_total = ledger
        .volunteer_total(other)
        .await
        .expect("total should compute");
    assert_eq!(other_total, 0);
}
