//! `PostgreSQL` repository implementation for assignment storage.
//!
//! Status mutations are expressed as filtered `UPDATE` statements so the
//! compare-and-swap happens inside the database, never in application
//! memory.

use super::{
    models::{AssignmentRow, NewAssignmentRow},
    schema::task_assignments,
};
use crate::assignment::{
    domain::{
        AssignmentId, NotificationStatus, PersistedAssignmentData, TaskAssignment, TaskId,
        VolunteerId, WorkStatus,
    },
    ports::{AssignmentRepository, AssignmentRepositoryError, AssignmentRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by assignment adapters.
pub type AssignmentPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed assignment repository.
#[derive(Debug, Clone)]
pub struct PostgresAssignmentRepository {
    pool: AssignmentPgPool,
}

impl PostgresAssignmentRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: AssignmentPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> AssignmentRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> AssignmentRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(AssignmentRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(AssignmentRepositoryError::persistence)?
    }
}

#[async_trait]
impl AssignmentRepository for PostgresAssignmentRepository {
    async fn create(&self, assignments: &[TaskAssignment]) -> AssignmentRepositoryResult<()> {
        let rows: Vec<NewAssignmentRow> = assignments.iter().map(to_new_row).collect();
        let keys: Vec<(TaskId, VolunteerId)> = assignments
            .iter()
            .map(|assignment| (assignment.task_id(), assignment.volunteer_id()))
            .collect();

        self.run_blocking(move |connection| {
            connection.transaction(|conn| {
                // The partial unique index still enforces integrity in the
                // window between this check and the insert; the pre-check
                // exists to report which pair collided.
                for (task_id, volunteer_id) in &keys {
                    if live_assignment_exists(conn, *task_id, *volunteer_id)? {
                        return Err(duplicate_error(*task_id, *volunteer_id));
                    }
                }

                diesel::insert_into(task_assignments::table)
                    .values(&rows)
                    .execute(conn)
                    .map_err(|err| {
                        let unique_violation = matches!(
                            err,
                            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
                        );
                        match (unique_violation, keys.first()) {
                            (true, Some((task_id, volunteer_id))) => {
                                duplicate_error(*task_id, *volunteer_id)
                            }
                            _ => AssignmentRepositoryError::persistence(err),
                        }
                    })?;
                Ok(())
            })
        })
        .await
    }

    async fn find_by_id(
        &self,
        id: AssignmentId,
    ) -> AssignmentRepositoryResult<Option<TaskAssignment>> {
        self.run_blocking(move |connection| {
            let row = task_assignments::table
                .filter(task_assignments::id.eq(id.into_inner()))
                .select(AssignmentRow::as_select())
                .first::<AssignmentRow>(connection)
                .optional()
                .map_err(AssignmentRepositoryError::persistence)?;
            row.map(row_to_assignment).transpose()
        })
        .await
    }

    async fn list_by_task(
        &self,
        task_id: TaskId,
    ) -> AssignmentRepositoryResult<Vec<TaskAssignment>> {
        self.run_blocking(move |connection| {
            let rows = task_assignments::table
                .filter(task_assignments::task_id.eq(task_id.into_inner()))
                .order(task_assignments::created_at.asc())
                .select(AssignmentRow::as_select())
                .load::<AssignmentRow>(connection)
                .map_err(AssignmentRepositoryError::persistence)?;
            rows.into_iter().map(row_to_assignment).collect()
        })
        .await
    }

    async fn list_by_volunteer(
        &self,
        volunteer_id: VolunteerId,
    ) -> AssignmentRepositoryResult<Vec<TaskAssignment>> {
        self.run_blocking(move |connection| {
            let rows = task_assignments::table
                .filter(task_assignments::volunteer_id.eq(volunteer_id.into_inner()))
                .order(task_assignments::created_at.asc())
                .select(AssignmentRow::as_select())
                .load::<AssignmentRow>(connection)
                .map_err(AssignmentRepositoryError::persistence)?;
            rows.into_iter().map(row_to_assignment).collect()
        })
        .await
    }

    async fn list_all(&self) -> AssignmentRepositoryResult<Vec<TaskAssignment>> {
        self.run_blocking(move |connection| {
            let rows = task_assignments::table
                .order(task_assignments::created_at.asc())
                .select(AssignmentRow::as_select())
                .load::<AssignmentRow>(connection)
                .map_err(AssignmentRepositoryError::persistence)?;
            rows.into_iter().map(row_to_assignment).collect()
        })
        .await
    }

    async fn list_sent_due(
        &self,
        due_before: DateTime<Utc>,
    ) -> AssignmentRepositoryResult<Vec<TaskAssignment>> {
        self.run_blocking(move |connection| {
            let rows = task_assignments::table
                .filter(
                    task_assignments::notification_status
                        .eq(NotificationStatus::Sent.as_str()),
                )
                .filter(task_assignments::sent_at.le(due_before))
                .order(task_assignments::created_at.asc())
                .select(AssignmentRow::as_select())
                .load::<AssignmentRow>(connection)
                .map_err(AssignmentRepositoryError::persistence)?;
            rows.into_iter().map(row_to_assignment).collect()
        })
        .await
    }

    async fn cas_notification_status(
        &self,
        id: AssignmentId,
        from: NotificationStatus,
        to: NotificationStatus,
        at: DateTime<Utc>,
    ) -> AssignmentRepositoryResult<TaskAssignment> {
        if !from.can_transition_to(to) {
            return Err(AssignmentRepositoryError::Domain(
                crate::assignment::domain::AssignmentDomainError::InvalidNotificationTransition {
                    assignment_id: id,
                    from,
                    to,
                },
            ));
        }

        self.run_blocking(move |connection| {
            let affected = execute_notification_cas(connection, id, from, to, at)?;
            if affected == 0 {
                let row = load_row(connection, id)?
                    .ok_or(AssignmentRepositoryError::NotFound(id))?;
                let actual = NotificationStatus::try_from(row.notification_status.as_str())
                    .map_err(AssignmentRepositoryError::persistence)?;
                return Err(AssignmentRepositoryError::StaleTransition {
                    id,
                    expected: from,
                    actual,
                });
            }

            let row =
                load_row(connection, id)?.ok_or(AssignmentRepositoryError::NotFound(id))?;
            row_to_assignment(row)
        })
        .await
    }

    async fn set_work_status(
        &self,
        id: AssignmentId,
        to: WorkStatus,
        at: DateTime<Utc>,
    ) -> AssignmentRepositoryResult<TaskAssignment> {
        self.run_blocking(move |connection| {
            // Each lost race means another writer advanced the row, so the
            // loop re-validates against fresh state and terminates once the
            // guards reject or the swap lands.
            loop {
                let row = load_row(connection, id)?
                    .ok_or(AssignmentRepositoryError::NotFound(id))?;
                let mut assignment = row_to_assignment(row)?;
                let observed = assignment.work_status();
                assignment.transition_work(to, at)?;

                let affected = diesel::update(
                    task_assignments::table
                        .filter(task_assignments::id.eq(id.into_inner()))
                        .filter(task_assignments::work_status.eq(observed.as_str())),
                )
                .set((
                    task_assignments::work_status.eq(to.as_str()),
                    task_assignments::completed_at.eq(assignment.completed_at()),
                    task_assignments::updated_at.eq(at),
                ))
                .execute(connection)
                .map_err(AssignmentRepositoryError::persistence)?;

                if affected > 0 {
                    return Ok(assignment);
                }
            }
        })
        .await
    }
}

fn to_new_row(assignment: &TaskAssignment) -> NewAssignmentRow {
    NewAssignmentRow {
        id: assignment.id().into_inner(),
        task_id: assignment.task_id().into_inner(),
        volunteer_id: assignment.volunteer_id().into_inner(),
        notification_status: assignment.notification_status().as_str().to_owned(),
        work_status: assignment.work_status().as_str().to_owned(),
        sent_at: assignment.sent_at(),
        responded_at: assignment.responded_at(),
        completed_at: assignment.completed_at(),
        created_at: assignment.created_at(),
        updated_at: assignment.updated_at(),
    }
}

/// Converts a stored row back into the domain aggregate.
pub(crate) fn row_to_assignment(row: AssignmentRow) -> AssignmentRepositoryResult<TaskAssignment> {
    let notification_status = NotificationStatus::try_from(row.notification_status.as_str())
        .map_err(AssignmentRepositoryError::persistence)?;
    let work_status = WorkStatus::try_from(row.work_status.as_str())
        .map_err(AssignmentRepositoryError::persistence)?;

    let data = PersistedAssignmentData {
        id: AssignmentId::from_uuid(row.id),
        task_id: TaskId::from_uuid(row.task_id),
        volunteer_id: VolunteerId::from_uuid(row.volunteer_id),
        notification_status,
        work_status,
        sent_at: row.sent_at,
        responded_at: row.responded_at,
        completed_at: row.completed_at,
        created_at: row.created_at,
        updated_at: row.updated_at,
    };
    Ok(TaskAssignment::from_persisted(data))
}

fn load_row(
    connection: &mut PgConnection,
    id: AssignmentId,
) -> AssignmentRepositoryResult<Option<AssignmentRow>> {
    task_assignments::table
        .filter(task_assignments::id.eq(id.into_inner()))
        .select(AssignmentRow::as_select())
        .first::<AssignmentRow>(connection)
        .optional()
        .map_err(AssignmentRepositoryError::persistence)
}

fn live_assignment_exists(
    connection: &mut PgConnection,
    task_id: TaskId,
    volunteer_id: VolunteerId,
) -> AssignmentRepositoryResult<bool> {
    let count: i64 = task_assignments::table
        .filter(task_assignments::task_id.eq(task_id.into_inner()))
        .filter(task_assignments::volunteer_id.eq(volunteer_id.into_inner()))
        .filter(
            task_assignments::notification_status.ne(NotificationStatus::Reject.as_str()),
        )
        .count()
        .get_result(connection)
        .map_err(AssignmentRepositoryError::persistence)?;
    Ok(count > 0)
}

/// Performs the status swap, stamping the timestamp column that `to` owns.
fn execute_notification_cas(
    connection: &mut PgConnection,
    id: AssignmentId,
    from: NotificationStatus,
    to: NotificationStatus,
    at: DateTime<Utc>,
) -> AssignmentRepositoryResult<usize> {
    let target = task_assignments::table
        .filter(task_assignments::id.eq(id.into_inner()))
        .filter(task_assignments::notification_status.eq(from.as_str()));

    let affected = match to {
        NotificationStatus::Sent => diesel::update(target)
            .set((
                task_assignments::notification_status.eq(to.as_str()),
                task_assignments::sent_at.eq(Some(at)),
                task_assignments::updated_at.eq(at),
            ))
            .execute(connection),
        NotificationStatus::Accept | NotificationStatus::Reject => diesel::update(target)
            .set((
                task_assignments::notification_status.eq(to.as_str()),
                task_assignments::responded_at.eq(Some(at)),
                task_assignments::updated_at.eq(at),
            ))
            .execute(connection),
        NotificationStatus::Expired | NotificationStatus::Pending => diesel::update(target)
            .set((
                task_assignments::notification_status.eq(to.as_str()),
                task_assignments::updated_at.eq(at),
            ))
            .execute(connection),
    };
    affected.map_err(AssignmentRepositoryError::persistence)
}

const fn duplicate_error(task_id: TaskId, volunteer_id: VolunteerId) -> AssignmentRepositoryError {
    AssignmentRepositoryError::DuplicateAssignment {
        task_id,
        volunteer_id,
    }
}

impl From<DieselError> for AssignmentRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}
