//! `PostgreSQL` points repository implementation.

use super::{
    models::{NewPointsRow, PointsRow},
    schema::points_entries,
};
use crate::assignment::domain::{AssignmentId, TaskId, VolunteerId};
use crate::points::{
    domain::{PersistedPointsData, PointsEntry, PointsEntryId, PointsSource},
    ports::{PointsRepository, PointsRepositoryError, PointsRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

const SOURCE_COMPLETION: &str = "completion";
const SOURCE_ADJUSTMENT: &str = "adjustment";

/// `PostgreSQL` connection pool type used by points adapters.
pub type PointsPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed points repository.
#[derive(Debug, Clone)]
pub struct PostgresPointsRepository {
    pool: PointsPgPool,
}

impl PostgresPointsRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PointsPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> PointsRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> PointsRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(PointsRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(PointsRepositoryError::persistence)?
    }
}

#[async_trait]
impl PointsRepository for PostgresPointsRepository {
    async fn append(&self, entry: &PointsEntry) -> PointsRepositoryResult<()> {
        let row = to_new_row(entry)?;
        let completion_assignment = entry.completion_assignment();

        self.run_blocking(move |connection| {
            diesel::insert_into(points_entries::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| {
                    let unique_violation = matches!(
                        err,
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
                    );
                    match (unique_violation, completion_assignment) {
                        (true, Some(assignment_id)) => {
                            PointsRepositoryError::AlreadyGranted(assignment_id)
                        }
                        _ => PointsRepositoryError::persistence(err),
                    }
                })?;
            Ok(())
        })
        .await
    }

    async fn find_completion(
        &self,
        assignment_id: AssignmentId,
    ) -> PointsRepositoryResult<Option<PointsEntry>> {
        self.run_blocking(move |connection| {
            let row = points_entries::table
                .filter(points_entries::assignment_id.eq(assignment_id.into_inner()))
                .filter(points_entries::source.eq(SOURCE_COMPLETION))
                .select(PointsRow::as_select())
                .first::<PointsRow>(connection)
                .optional()
                .map_err(PointsRepositoryError::persistence)?;
            row.map(row_to_entry).transpose()
        })
        .await
    }

    async fn list_by_volunteer(
        &self,
        volunteer_id: VolunteerId,
    ) -> PointsRepositoryResult<Vec<PointsEntry>> {
        self.run_blocking(move |connection| {
            let rows = points_entries::table
                .filter(points_entries::volunteer_id.eq(volunteer_id.into_inner()))
                .order(points_entries::created_at.asc())
                .select(PointsRow::as_select())
                .load::<PointsRow>(connection)
                .map_err(PointsRepositoryError::persistence)?;
            rows.into_iter().map(row_to_entry).collect()
        })
        .await
    }
}

fn to_new_row(entry: &PointsEntry) -> PointsRepositoryResult<NewPointsRow> {
    let points = i32::try_from(entry.points()).map_err(PointsRepositoryError::persistence)?;
    let (source, assignment_id, task_id) = match entry.source() {
        PointsSource::Completion {
            assignment_id,
            task_id,
        } => (
            SOURCE_COMPLETION,
            Some(assignment_id.into_inner()),
            Some(task_id.into_inner()),
        ),
        PointsSource::Adjustment => (SOURCE_ADJUSTMENT, None, None),
    };

    Ok(NewPointsRow {
        id: entry.id().into_inner(),
        volunteer_id: entry.volunteer_id().into_inner(),
        points,
        reason: entry.reason().to_owned(),
        source: source.to_owned(),
        assignment_id,
        task_id,
        created_at: entry.created_at(),
    })
}

fn row_to_entry(row: PointsRow) -> PointsRepositoryResult<PointsEntry> {
    let points = u32::try_from(row.points).map_err(PointsRepositoryError::persistence)?;
    let source = match (row.source.as_str(), row.assignment_id, row.task_id) {
        (SOURCE_COMPLETION, Some(assignment_id), Some(task_id)) => PointsSource::Completion {
            assignment_id: AssignmentId::from_uuid(assignment_id),
            task_id: TaskId::from_uuid(task_id),
        },
        (SOURCE_ADJUSTMENT, _, _) => PointsSource::Adjustment,
        _ => {
            return Err(PointsRepositoryError::persistence(std::io::Error::other(
                format!("inconsistent points source row: {}", row.source),
            )));
        }
    };

    Ok(PointsEntry::from_persisted(PersistedPointsData {
        id: PointsEntryId::from_uuid(row.id),
        volunteer_id: VolunteerId::from_uuid(row.volunteer_id),
        points,
        reason: row.reason,
        source,
        created_at: row.created_at,
    }))
}
