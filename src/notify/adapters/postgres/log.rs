//! `PostgreSQL` notification log implementation.

use super::{
    models::{NewNotificationRow, NotificationRow},
    schema::notification_records,
};
use crate::assignment::domain::{AssignmentId, VolunteerId};
use crate::notify::{
    domain::{DeliveryChannel, NotificationId, NotificationRecord, PersistedNotificationData},
    ports::{NotificationLog, NotificationLogError, NotificationLogResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};

/// `PostgreSQL` connection pool type used by notification adapters.
pub type NotificationPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed notification log.
#[derive(Debug, Clone)]
pub struct PostgresNotificationLog {
    pool: NotificationPgPool,
}

impl PostgresNotificationLog {
    /// Creates a new log from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: NotificationPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> NotificationLogResult<T>
    where
        F: FnOnce(&mut PgConnection) -> NotificationLogResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(NotificationLogError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(NotificationLogError::persistence)?
    }
}

#[async_trait]
impl NotificationLog for PostgresNotificationLog {
    async fn append(&self, record: &NotificationRecord) -> NotificationLogResult<()> {
        let row = to_new_row(record);
        self.run_blocking(move |connection| {
            diesel::insert_into(notification_records::table)
                .values(&row)
                .execute(connection)
                .map_err(NotificationLogError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(
        &self,
        id: NotificationId,
    ) -> NotificationLogResult<Option<NotificationRecord>> {
        self.run_blocking(move |connection| {
            let row = notification_records::table
                .filter(notification_records::id.eq(id.into_inner()))
                .select(NotificationRow::as_select())
                .first::<NotificationRow>(connection)
                .optional()
                .map_err(NotificationLogError::persistence)?;
            row.map(row_to_record).transpose()
        })
        .await
    }

    async fn list_by_assignment(
        &self,
        assignment_id: AssignmentId,
    ) -> NotificationLogResult<Vec<NotificationRecord>> {
        self.run_blocking(move |connection| {
            let rows = notification_records::table
                .filter(notification_records::assignment_id.eq(assignment_id.into_inner()))
                .order(notification_records::delivered_at.desc())
                .select(NotificationRow::as_select())
                .load::<NotificationRow>(connection)
                .map_err(NotificationLogError::persistence)?;
            rows.into_iter().map(row_to_record).collect()
        })
        .await
    }

    async fn list_by_volunteer(
        &self,
        volunteer_id: VolunteerId,
    ) -> NotificationLogResult<Vec<NotificationRecord>> {
        self.run_blocking(move |connection| {
            let rows = notification_records::table
                .filter(notification_records::volunteer_id.eq(volunteer_id.into_inner()))
                .order(notification_records::delivered_at.desc())
                .select(NotificationRow::as_select())
                .load::<NotificationRow>(connection)
                .map_err(NotificationLogError::persistence)?;
            rows.into_iter().map(row_to_record).collect()
        })
        .await
    }

    async fn mark_read(
        &self,
        id: NotificationId,
        at: DateTime<Utc>,
    ) -> NotificationLogResult<NotificationRecord> {
        self.run_blocking(move |connection| {
            // Only the first read stamps the column.
            diesel::update(
                notification_records::table
                    .filter(notification_records::id.eq(id.into_inner()))
                    .filter(notification_records::read_at.is_null()),
            )
            .set(notification_records::read_at.eq(Some(at)))
            .execute(connection)
            .map_err(NotificationLogError::persistence)?;

            let row = notification_records::table
                .filter(notification_records::id.eq(id.into_inner()))
                .select(NotificationRow::as_select())
                .first::<NotificationRow>(connection)
                .optional()
                .map_err(NotificationLogError::persistence)?
                .ok_or(NotificationLogError::NotFound(id))?;
            row_to_record(row)
        })
        .await
    }
}

fn to_new_row(record: &NotificationRecord) -> NewNotificationRow {
    NewNotificationRow {
        id: record.id().into_inner(),
        assignment_id: record.assignment_id().into_inner(),
        volunteer_id: record.volunteer_id().into_inner(),
        channel: record.channel().as_str().to_owned(),
        subject: record.subject().to_owned(),
        body: record.body().to_owned(),
        response_token: record.response_token().map(str::to_owned),
        delivered_at: record.delivered_at(),
        read_at: record.read_at(),
    }
}

fn row_to_record(row: NotificationRow) -> NotificationLogResult<NotificationRecord> {
    let channel = DeliveryChannel::try_from(row.channel.as_str())
        .map_err(NotificationLogError::persistence)?;
    Ok(NotificationRecord::from_persisted(
        PersistedNotificationData {
            id: NotificationId::from_uuid(row.id),
            assignment_id: AssignmentId::from_uuid(row.assignment_id),
            volunteer_id: VolunteerId::from_uuid(row.volunteer_id),
            channel,
            subject: row.subject,
            body: row.body,
            response_token: row.response_token,
            delivered_at: row.delivered_at,
            read_at: row.read_at,
        },
    ))
}
