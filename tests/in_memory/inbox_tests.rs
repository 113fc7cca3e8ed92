//! Volunteer notification inbox tests.

use super::helpers::EngineHarness;
use chrono::Duration;
use muster::notify::ports::NotificationLogError;

#[tokio::test(flavor = "multi_thread")]
async fn inbox_lists_newest_first_and_marks_read_idempotently() {
    let harness = EngineHarness::new();
    let service = harness.assignment_service();
    let dispatcher = harness.dispatcher();
    let inbox = harness.inbox();

    let task_id = harness.seed_task("Registration desk", 2);
    let volunteer = harness.seed_volunteer("Asha Rao", "asha@example.org");
    let other_task = harness.seed_task("Cleanup crew", 2);

    let first = service
        .create_assignments(task_id, &[volunteer])
        .await
        .expect("creation should succeed");
    dispatcher
        .dispatch(first[0].id())
        .await
        .expect("dispatch should succeed");

    harness.clock.advance(Duration::hours(2));
    let second = service
        .create_assignments(other_task, &[volunteer])
        .await
        .expect("creation should succeed");
    dispatcher
        .dispatch(second[0].id())
        .await
        .expect("dispatch should succeed");

    let records = inbox.list(volunteer).await.expect("listing should succeed");
    // Two channels per dispatch.
    assert_eq!(records.len(), 4);
    assert!(records[0].delivered_at() >= records[records.len() - 1].delivered_at());
    assert!(records.iter().all(|record| !record.is_read()));

    let target = records[0].id();
    let read = inbox.mark_read(target).await.expect("mark_read should succeed");
    assert!(read.is_read());
    let first_read_at = read.read_at();

    harness.clock.advance(Duration::minutes(30));
    let again = inbox
        .mark_read(target)
        .await
        .expect("repeated mark_read should succeed");
    assert_eq!(again.read_at(), first_read_at);

    // Only the targeted record changed.
    let after = inbox.list(volunteer).await.expect("listing should succeed");
    assert_eq!(after.iter().filter(|record| record.is_read()).count(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn marking_a_missing_record_reports_not_found() {
    let harness = EngineHarness::new();
    let inbox = harness.inbox();
    let result = inbox
        .mark_read(muster::notify::domain::NotificationId::new())
        .await;
    assert!(matches!(result, Err(NotificationLogError::NotFound(_))));
}
