//! Invitation dispatch, retry, and notification record tests.

use super::helpers::EngineHarness;
use muster::assignment::domain::{AssignmentEvent, NotificationStatus};
use muster::assignment::ports::AssignmentRepository;
use muster::notify::{
    domain::{DeliveryChannel, EmailMessage, ResponseToken},
    ports::{DeliveryError, NotificationChannel, NotificationLog},
    services::{DispatchError, DispatchOutcome, NotificationDispatcher},
};
use std::sync::Arc;

async fn seeded_assignment(
    harness: &EngineHarness,
) -> (
    muster::assignment::domain::AssignmentId,
    muster::assignment::domain::VolunteerId,
) {
    let service = harness.assignment_service();
    let task_id = harness.seed_task("Registration desk", 2);
    let volunteer = harness.seed_volunteer("Asha Rao", "asha@example.org");
    let created = service
        .create_assignments(task_id, &[volunteer])
        .await
        .expect("creation should succeed");
    (created[0].id(), volunteer)
}

#[tokio::test(flavor = "multi_thread")]
async fn dispatch_delivers_email_and_flips_to_sent() {
    let harness = EngineHarness::new();
    let dispatcher = harness.dispatcher();
    let (assignment_id, volunteer) = seeded_assignment(&harness).await;

    let outcome = dispatcher
        .dispatch(assignment_id)
        .await
        .expect("dispatch should succeed");

    let updated = match outcome {
        DispatchOutcome::Sent(assignment) => assignment,
        DispatchOutcome::Skipped { current } => panic!("unexpected skip in {current}"),
    };
    assert_eq!(updated.notification_status(), NotificationStatus::Sent);
    assert!(updated.sent_at().is_some());

    let deliveries = harness.channel.deliveries();
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].recipient(), "asha@example.org");
    assert!(deliveries[0].body().contains("action=accept"));
    assert!(deliveries[0].body().contains("action=reject"));
    assert!(deliveries[0].body().contains(&volunteer.to_string()));

    let events = harness.publisher.events();
    assert!(
        events
            .iter()
            .any(|event| matches!(event, AssignmentEvent::Dispatched { .. }))
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn dispatch_writes_email_and_in_app_records_with_valid_token() {
    let harness = EngineHarness::new();
    let dispatcher = harness.dispatcher();
    let (assignment_id, volunteer) = seeded_assignment(&harness).await;

    dispatcher
        .dispatch(assignment_id)
        .await
        .expect("dispatch should succeed");

    let records = harness
        .log
        .list_by_assignment(assignment_id)
        .await
        .expect("record listing should succeed");
    assert_eq!(records.len(), 2);

    let email_record = records
        .iter()
        .find(|record| record.channel() == DeliveryChannel::Email)
        .expect("an email record must exist");
    let token = email_record
        .response_token()
        .expect("the email record carries the response token");
    let decoded = ResponseToken::decode(token, &harness.config.token_secret)
        .expect("the recorded token must verify");
    assert_eq!(decoded.assignment_id(), assignment_id);
    assert_eq!(decoded.volunteer_id(), volunteer);

    let in_app = records
        .iter()
        .find(|record| record.channel() == DeliveryChannel::InApp)
        .expect("an in-app record must exist");
    assert!(in_app.response_token().is_none());
    assert!(!in_app.is_read());
}

#[tokio::test(flavor = "multi_thread")]
async fn transient_failures_are_retried_to_one_delivery() {
    let harness = EngineHarness::with_failing_channel(2);
    let dispatcher = harness.dispatcher();
    let (assignment_id, _) = seeded_assignment(&harness).await;

    let outcome = dispatcher
        .dispatch(assignment_id)
        .await
        .expect("dispatch should succeed after retries");

    assert!(matches!(outcome, DispatchOutcome::Sent(_)));
    assert_eq!(harness.channel.attempts(), 3);
    assert_eq!(harness.channel.deliveries().len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn exhausted_retries_leave_the_assignment_pending() {
    let harness = EngineHarness::with_failing_channel(5);
    let dispatcher = harness.dispatcher();
    let (assignment_id, _) = seeded_assignment(&harness).await;

    let outcome = dispatcher.dispatch(assignment_id).await;
    assert!(matches!(outcome, Err(DispatchError::Delivery(_))));

    let assignment = harness
        .repository
        .find_by_id(assignment_id)
        .await
        .expect("lookup should succeed")
        .expect("assignment must exist");
    assert_eq!(
        assignment.notification_status(),
        NotificationStatus::Pending
    );
    let records = harness
        .log
        .list_by_assignment(assignment_id)
        .await
        .expect("record listing should succeed");
    assert!(records.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn second_dispatch_is_skipped_not_failed() {
    let harness = EngineHarness::new();
    let dispatcher = harness.dispatcher();
    let (assignment_id, _) = seeded_assignment(&harness).await;

    dispatcher
        .dispatch(assignment_id)
        .await
        .expect("first dispatch should succeed");
    let second = dispatcher
        .dispatch(assignment_id)
        .await
        .expect("second dispatch should be discarded silently");

    assert!(matches!(
        second,
        DispatchOutcome::Skipped {
            current: NotificationStatus::Sent
        }
    ));
    assert_eq!(harness.channel.deliveries().len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn batch_dispatch_isolates_failures() {
    let harness = EngineHarness::new();
    let service = harness.assignment_service();
    let dispatcher = harness.dispatcher();
    let task_id = harness.seed_task("Registration desk", 3);
    let known = harness.seed_volunteer("Asha Rao", "asha@example.org");
    let ghost = muster::assignment::domain::VolunteerId::new();

    let created = service
        .create_assignments(task_id, &[known, ghost])
        .await
        .expect("creation should succeed; the directory is not consulted per volunteer");

    let ids: Vec<_> = created.iter().map(|assignment| assignment.id()).collect();
    let outcomes = dispatcher.dispatch_batch(&ids).await;

    assert_eq!(outcomes.len(), 2);
    let sent = outcomes
        .iter()
        .filter(|(_, outcome)| matches!(outcome, Ok(DispatchOutcome::Sent(_))))
        .count();
    let failed = outcomes
        .iter()
        .filter(|(_, outcome)| matches!(outcome, Err(DispatchError::UnknownVolunteer(_))))
        .count();
    assert_eq!(sent, 1);
    assert_eq!(failed, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn response_notice_reaches_the_organizer() {
    let harness = EngineHarness::new();
    let dispatcher = harness.dispatcher();
    let reconciler = harness.reconciler();
    let (assignment_id, volunteer) = seeded_assignment(&harness).await;
    dispatcher
        .dispatch(assignment_id)
        .await
        .expect("dispatch should succeed");
    reconciler
        .respond(muster::assignment::services::RespondRequest {
            assignment_id,
            acting_volunteer_id: volunteer,
            action: muster::assignment::domain::ResponseAction::Reject,
            authenticated: true,
        })
        .await
        .expect("rejection should succeed");

    dispatcher
        .send_response_notice(assignment_id)
        .await
        .expect("notice should send");

    let deliveries = harness.channel.deliveries();
    let notice = deliveries
        .last()
        .expect("the notice is the latest delivery");
    assert_eq!(notice.recipient(), harness.config.organizer_email);
    assert!(notice.subject().starts_with("Task response:"));
    assert!(notice.body().contains("declined"));
}

#[tokio::test(flavor = "multi_thread")]
async fn response_notice_requires_a_recorded_response() {
    let harness = EngineHarness::new();
    let dispatcher = harness.dispatcher();
    let (assignment_id, _) = seeded_assignment(&harness).await;
    dispatcher
        .dispatch(assignment_id)
        .await
        .expect("dispatch should succeed");

    let premature = dispatcher.send_response_notice(assignment_id).await;
    assert!(matches!(
        premature,
        Err(DispatchError::NotYetResponded {
            status: NotificationStatus::Sent,
            ..
        })
    ));
}

mod mock_channel {
    use super::*;

    mockall::mock! {
        pub Channel {}

        #[async_trait::async_trait]
        impl NotificationChannel for Channel {
            async fn deliver(&self, message: &EmailMessage) -> Result<(), DeliveryError>;
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn dispatcher_stops_after_configured_attempts() {
        let harness = EngineHarness::new();
        let (assignment_id, _) = seeded_assignment(&harness).await;

        let mut channel = MockChannel::new();
        channel
            .expect_deliver()
            .times(usize::try_from(harness.config.delivery_max_attempts).unwrap_or(3))
            .returning(|_| Err(DeliveryError::new("smtp unreachable")));

        let dispatcher = NotificationDispatcher::new(
            Arc::clone(&harness.repository),
            Arc::clone(&harness.directory),
            Arc::clone(&harness.log),
            Arc::new(channel),
            Arc::clone(&harness.publisher),
            Arc::clone(&harness.clock),
            harness.config.clone(),
        );

        let outcome = dispatcher.dispatch(assignment_id).await;
        assert!(matches!(outcome, Err(DispatchError::Delivery(_))));
    }
}
