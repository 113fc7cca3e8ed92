//! In-memory assignment repository for tests and embedding.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::assignment::{
    domain::{
        AssignmentId, NotificationStatus, ResponseAction, TaskAssignment, TaskId, VolunteerId,
        WorkStatus,
    },
    ports::{AssignmentRepository, AssignmentRepositoryError, AssignmentRepositoryResult},
};

/// Thread-safe in-memory assignment repository.
///
/// The compare-and-swap operations take the write lock for the duration of
/// the check-and-mutate, which is what makes two racing responders resolve
/// first-writer-wins exactly as a database row CAS would.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAssignmentRepository {
    state: Arc<RwLock<InMemoryAssignmentState>>,
}

#[derive(Debug, Default)]
struct InMemoryAssignmentState {
    assignments: HashMap<AssignmentId, TaskAssignment>,
    task_index: HashMap<TaskId, Vec<AssignmentId>>,
    volunteer_index: HashMap<VolunteerId, Vec<AssignmentId>>,
}

impl InMemoryAssignmentRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read_state(
        &self,
    ) -> AssignmentRepositoryResult<RwLockReadGuard<'_, InMemoryAssignmentState>> {
        self.state.read().map_err(|err| {
            AssignmentRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write_state(
        &self,
    ) -> AssignmentRepositoryResult<RwLockWriteGuard<'_, InMemoryAssignmentState>> {
        self.state.write().map_err(|err| {
            AssignmentRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

fn sorted_by_age(mut assignments: Vec<TaskAssignment>) -> Vec<TaskAssignment> {
    assignments.sort_by_key(|assignment| (assignment.created_at(), assignment.id()));
    assignments
}

fn collect_index(
    state: &InMemoryAssignmentState,
    ids: Option<&Vec<AssignmentId>>,
) -> Vec<TaskAssignment> {
    let assignments = ids
        .map(|ids| {
            ids.iter()
                .filter_map(|id| state.assignments.get(id).cloned())
                .collect()
        })
        .unwrap_or_default();
    sorted_by_age(assignments)
}

/// Routes a CAS target status to the matching aggregate mutator.
fn apply_notification_transition(
    assignment: &mut TaskAssignment,
    to: NotificationStatus,
    at: DateTime<Utc>,
) -> AssignmentRepositoryResult<()> {
    match to {
        NotificationStatus::Sent => assignment.record_notification_sent(at)?,
        NotificationStatus::Accept => assignment.record_response(ResponseAction::Accept, at)?,
        NotificationStatus::Reject => assignment.record_response(ResponseAction::Reject, at)?,
        NotificationStatus::Expired => assignment.record_expiry(at)?,
        NotificationStatus::Pending => {
            return Err(AssignmentRepositoryError::Domain(
                crate::assignment::domain::AssignmentDomainError::InvalidNotificationTransition {
                    assignment_id: assignment.id(),
                    from: assignment.notification_status(),
                    to,
                },
            ));
        }
    }
    Ok(())
}

#[async_trait]
impl AssignmentRepository for InMemoryAssignmentRepository {
    async fn create(&self, assignments: &[TaskAssignment]) -> AssignmentRepositoryResult<()> {
        let mut state = self.write_state()?;

        // Validate the whole batch before touching the maps so a duplicate
        // in the middle leaves no partial writes behind.
        for (position, assignment) in assignments.iter().enumerate() {
            let stored_duplicate = state
                .task_index
                .get(&assignment.task_id())
                .into_iter()
                .flatten()
                .filter_map(|id| state.assignments.get(id))
                .any(|existing| {
                    existing.volunteer_id() == assignment.volunteer_id()
                        && existing.occupies_capacity()
                });
            let batch_duplicate = assignments.iter().take(position).any(|earlier| {
                earlier.task_id() == assignment.task_id()
                    && earlier.volunteer_id() == assignment.volunteer_id()
            });
            if stored_duplicate || batch_duplicate {
                return Err(AssignmentRepositoryError::DuplicateAssignment {
                    task_id: assignment.task_id(),
                    volunteer_id: assignment.volunteer_id(),
                });
            }
        }

        for assignment in assignments {
            state
                .task_index
                .entry(assignment.task_id())
                .or_default()
                .push(assignment.id());
            state
                .volunteer_index
                .entry(assignment.volunteer_id())
                .or_default()
                .push(assignment.id());
            state.assignments.insert(assignment.id(), assignment.clone());
        }
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: AssignmentId,
    ) -> AssignmentRepositoryResult<Option<TaskAssignment>> {
        let state = self.read_state()?;
        Ok(state.assignments.get(&id).cloned())
    }

    async fn list_by_task(
        &self,
        task_id: TaskId,
    ) -> AssignmentRepositoryResult<Vec<TaskAssignment>> {
        let state = self.read_state()?;
        Ok(collect_index(&state, state.task_index.get(&task_id)))
    }

    async fn list_by_volunteer(
        &self,
        volunteer_id: VolunteerId,
    ) -> AssignmentRepositoryResult<Vec<TaskAssignment>> {
        let state = self.read_state()?;
        Ok(collect_index(&state, state.volunteer_index.get(&volunteer_id)))
    }

    async fn list_all(&self) -> AssignmentRepositoryResult<Vec<TaskAssignment>> {
        let state = self.read_state()?;
        Ok(sorted_by_age(state.assignments.values().cloned().collect()))
    }

    async fn list_sent_due(
        &self,
        due_before: DateTime<Utc>,
    ) -> AssignmentRepositoryResult<Vec<TaskAssignment>> {
        let state = self.read_state()?;
        let due = state
            .assignments
            .values()
            .filter(|assignment| {
                assignment.notification_status() == NotificationStatus::Sent
                    && assignment
                        .sent_at()
                        .is_some_and(|sent_at| sent_at <= due_before)
            })
            .cloned()
            .collect();
        Ok(sorted_by_age(due))
    }

    async fn cas_notification_status(
        &self,
        id: AssignmentId,
        from: NotificationStatus,
        to: NotificationStatus,
        at: DateTime<Utc>,
    ) -> AssignmentRepositoryResult<TaskAssignment> {
        let mut state = self.write_state()?;
        let assignment = state
            .assignments
            .get_mut(&id)
            .ok_or(AssignmentRepositoryError::NotFound(id))?;

        let actual = assignment.notification_status();
        if actual != from {
            return Err(AssignmentRepositoryError::StaleTransition {
                id,
                expected: from,
                actual,
            });
        }

        apply_notification_transition(assignment, to, at)?;
        Ok(assignment.clone())
    }

    async fn set_work_status(
        &self,
        id: AssignmentId,
        to: WorkStatus,
        at: DateTime<Utc>,
    ) -> AssignmentRepositoryResult<TaskAssignment> {
        let mut state = self.write_state()?;
        let assignment = state
            .assignments
            .get_mut(&id)
            .ok_or(AssignmentRepositoryError::NotFound(id))?;
        assignment.transition_work(to, at)?;
        Ok(assignment.clone())
    }
}
