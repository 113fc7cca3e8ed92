//! Shared test harness for in-memory integration tests.

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;
use once_cell::sync::Lazy;
use std::sync::{Arc, Mutex};

use muster::assignment::{
    adapters::memory::{InMemoryAssignmentRepository, InMemoryDirectory, RecordingEventPublisher},
    domain::{EventId, TaskId, TaskRecord, Volunteer, VolunteerId},
    services::{AssignmentService, ExpirationSweeper, ResponseReconciler, StatusProjector},
};
use muster::config::EngineConfig;
use muster::notify::{
    adapters::memory::{InMemoryNotificationLog, RecordingChannel},
    services::{NotificationDispatcher, NotificationInbox},
};
use muster::points::{adapters::memory::InMemoryPointsRepository, services::PointsLedger};

/// A clock pinned to a settable instant.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    /// Creates a clock pinned to the harness anchor time.
    pub fn anchored() -> Self {
        Self {
            now: Mutex::new(anchor_time()),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }

    fn current(&self) -> DateTime<Utc> {
        self.now.lock().map(|now| *now).unwrap_or_else(|_| Utc::now())
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.current().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.current()
    }
}

static ANCHOR: Lazy<DateTime<Utc>> = Lazy::new(|| {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0)
        .single()
        .expect("anchor time is a valid instant")
});

/// The deterministic base instant shared by all harness tests.
pub fn anchor_time() -> DateTime<Utc> {
    *ANCHOR
}

pub type TestAssignmentService = AssignmentService<
    InMemoryAssignmentRepository,
    InMemoryDirectory,
    RecordingEventPublisher,
    FixedClock,
>;
pub type TestDispatcher = NotificationDispatcher<
    InMemoryAssignmentRepository,
    InMemoryDirectory,
    InMemoryNotificationLog,
    RecordingChannel,
    RecordingEventPublisher,
    FixedClock,
>;
pub type TestReconciler =
    ResponseReconciler<InMemoryAssignmentRepository, RecordingEventPublisher, FixedClock>;
pub type TestSweeper =
    ExpirationSweeper<InMemoryAssignmentRepository, RecordingEventPublisher, FixedClock>;
pub type TestProjector = StatusProjector<InMemoryAssignmentRepository, InMemoryDirectory>;
pub type TestLedger = PointsLedger<
    InMemoryPointsRepository,
    InMemoryAssignmentRepository,
    InMemoryDirectory,
    FixedClock,
>;
pub type TestInbox = NotificationInbox<InMemoryNotificationLog, FixedClock>;

/// All engine collaborators wired over in-memory adapters.
pub struct EngineHarness {
    pub repository: Arc<InMemoryAssignmentRepository>,
    pub directory: Arc<InMemoryDirectory>,
    pub publisher: Arc<RecordingEventPublisher>,
    pub log: Arc<InMemoryNotificationLog>,
    pub channel: Arc<RecordingChannel>,
    pub points: Arc<InMemoryPointsRepository>,
    pub clock: Arc<FixedClock>,
    pub config: EngineConfig,
}

impl EngineHarness {
    /// Creates a harness with a reliable delivery channel.
    pub fn new() -> Self {
        Self::with_channel(RecordingChannel::new())
    }

    /// Creates a harness whose channel fails the first `failures` sends.
    pub fn with_failing_channel(failures: u32) -> Self {
        Self::with_channel(RecordingChannel::failing(failures))
    }

    fn with_channel(channel: RecordingChannel) -> Self {
        let config = EngineConfig {
            base_url: "https://volunteers.example.org".to_owned(),
            token_secret: "harness-secret".to_owned(),
            // Keep retry backoff negligible so failure tests stay fast.
            delivery_backoff_ms: 1,
            ..EngineConfig::default()
        };
        Self {
            repository: Arc::new(InMemoryAssignmentRepository::new()),
            directory: Arc::new(InMemoryDirectory::new()),
            publisher: Arc::new(RecordingEventPublisher::new()),
            log: Arc::new(InMemoryNotificationLog::new()),
            channel: Arc::new(channel),
            points: Arc::new(InMemoryPointsRepository::new()),
            clock: Arc::new(FixedClock::anchored()),
            config,
        }
    }

    pub fn assignment_service(&self) -> TestAssignmentService {
        AssignmentService::new(
            Arc::clone(&self.repository),
            Arc::clone(&self.directory),
            Arc::clone(&self.publisher),
            Arc::clone(&self.clock),
        )
    }

    pub fn dispatcher(&self) -> TestDispatcher {
        NotificationDispatcher::new(
            Arc::clone(&self.repository),
            Arc::clone(&self.directory),
            Arc::clone(&self.log),
            Arc::clone(&self.channel),
            Arc::clone(&self.publisher),
            Arc::clone(&self.clock),
            self.config.clone(),
        )
    }

    pub fn reconciler(&self) -> TestReconciler {
        ResponseReconciler::new(
            Arc::clone(&self.repository),
            Arc::clone(&self.publisher),
            Arc::clone(&self.clock),
        )
    }

    pub fn sweeper(&self) -> TestSweeper {
        ExpirationSweeper::new(
            Arc::clone(&self.repository),
            Arc::clone(&self.publisher),
            Arc::clone(&self.clock),
            self.config.response_window(),
        )
    }

    pub fn projector(&self) -> TestProjector {
        StatusProjector::new(Arc::clone(&self.repository), Arc::clone(&self.directory))
    }

    pub fn ledger(&self) -> TestLedger {
        PointsLedger::new(
            Arc::clone(&self.points),
            Arc::clone(&self.repository),
            Arc::clone(&self.directory),
            Arc::clone(&self.clock),
            self.config.completion_points,
        )
    }

    pub fn inbox(&self) -> TestInbox {
        NotificationInbox::new(Arc::clone(&self.log), Arc::clone(&self.clock))
    }

    /// Seeds a task with the given capacity and returns its id.
    pub fn seed_task(&self, title: &str, max_volunteers: u32) -> TaskId {
        let task_id = TaskId::new();
        let task = TaskRecord::new(task_id, EventId::new(), title, max_volunteers)
            .expect("seed task must be valid")
            .with_description("Harness task description.")
            .with_event_title("Spring Marathon");
        self.directory
            .upsert_task(task)
            .expect("seeding a task should succeed");
        task_id
    }

    /// Seeds a volunteer and returns their id.
    pub fn seed_volunteer(&self, name: &str, email: &str) -> VolunteerId {
        let volunteer_id = VolunteerId::new();
        self.directory
            .upsert_volunteer(Volunteer::new(volunteer_id, name, email))
            .expect("seeding a volunteer should succeed");
        volunteer_id
    }
}

impl Default for EngineHarness {
    fn default() -> Self {
        Self::new()
    }
}
