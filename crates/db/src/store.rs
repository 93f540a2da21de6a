//! [`ScheduleStore`] and [`SessionStore`] over PostgreSQL.

use async_trait::async_trait;
use gymdesk_core::error::CoreError;
use gymdesk_core::schedule::{NewSchedule, Schedule};
use gymdesk_core::session::{
    add_teacher, merge_attendance, ClassSession, MarkAttendance, SessionDraft, SessionFilter,
    SessionPatch,
};
use gymdesk_core::store::{ScheduleStore, SessionStore};
use gymdesk_core::types::DbId;

use crate::models::class_session::to_column;
use crate::repositories::class_session_repo::{InsertClassSession, OverwriteClassSession};
use crate::repositories::{ClassSessionRepo, ScheduleRepo};
use crate::DbPool;

/// PostgreSQL-backed store for schedules and class sessions.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Lock a session row, apply `change`, and write the result back in one
    /// transaction.
    async fn modify_session<F>(&self, id: DbId, change: F) -> Result<ClassSession, CoreError>
    where
        F: FnOnce(ClassSession) -> Result<ClassSession, CoreError> + Send,
    {
        let mut tx = self.pool.begin().await.map_err(storage("begin transaction"))?;

        let row = ClassSessionRepo::lock_by_id(&mut *tx, id)
            .await
            .map_err(storage("lock class session"))?
            .ok_or_else(|| session_not_found(id))?;
        let updated = change(ClassSession::try_from(row)?)?;

        let values = OverwriteClassSession {
            day: to_column(updated.day, "day")?,
            month: to_column(updated.month, "month")?,
            year: updated.year,
            start_time: updated.start_time.as_deref(),
            end_time: updated.end_time.as_deref(),
            teachers: &updated.teachers,
            attendances: &updated.attendances,
        };
        let row = ClassSessionRepo::overwrite(&mut *tx, id, &values)
            .await
            .map_err(storage("update class session"))?;

        tx.commit().await.map_err(storage("commit transaction"))?;
        ClassSession::try_from(row)
    }
}

/// Log a sqlx error and convert it into [`CoreError::Storage`].
fn storage(operation: &'static str) -> impl Fn(sqlx::Error) -> CoreError {
    move |err| {
        tracing::error!(error = %err, operation, "Database operation failed");
        CoreError::Storage(format!("{operation} failed"))
    }
}

fn session_not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "ClassSession",
        id,
    }
}

#[async_trait]
impl ScheduleStore for PgStore {
    async fn create(&self, input: &NewSchedule) -> Result<Schedule, CoreError> {
        ScheduleRepo::create(&self.pool, input)
            .await
            .map(Schedule::from)
            .map_err(storage("insert schedule"))
    }

    async fn list(&self) -> Result<Vec<Schedule>, CoreError> {
        let rows = ScheduleRepo::list(&self.pool)
            .await
            .map_err(storage("list schedules"))?;
        Ok(rows.into_iter().map(Schedule::from).collect())
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<Schedule>, CoreError> {
        ScheduleRepo::find_by_id(&self.pool, id)
            .await
            .map(|row| row.map(Schedule::from))
            .map_err(storage("find schedule"))
    }

    async fn delete(&self, id: DbId) -> Result<(), CoreError> {
        let deleted = ScheduleRepo::delete(&self.pool, id)
            .await
            .map_err(storage("delete schedule"))?;
        if !deleted {
            return Err(CoreError::NotFound {
                entity: "Schedule",
                id,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl SessionStore for PgStore {
    async fn create(&self, draft: &SessionDraft) -> Result<ClassSession, CoreError> {
        let input = InsertClassSession {
            schedule_id: draft.schedule_id,
            day: to_column(draft.day, "day")?,
            month: to_column(draft.month, "month")?,
            year: draft.year,
            start_time: draft.start_time.as_deref(),
            end_time: draft.end_time.as_deref(),
        };
        let row = ClassSessionRepo::create(&self.pool, &input)
            .await
            .map_err(storage("insert class session"))?;
        ClassSession::try_from(row)
    }

    async fn list(&self, filter: &SessionFilter) -> Result<Vec<ClassSession>, CoreError> {
        let month = filter
            .month
            .map(|m| to_column(m, "month"))
            .transpose()?;
        let rows = ClassSessionRepo::list(&self.pool, month, filter.year)
            .await
            .map_err(storage("list class sessions"))?;
        rows.into_iter().map(ClassSession::try_from).collect()
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<ClassSession>, CoreError> {
        ClassSessionRepo::find_by_id(&self.pool, id)
            .await
            .map_err(storage("find class session"))?
            .map(ClassSession::try_from)
            .transpose()
    }

    async fn list_for_user(&self, user_id: DbId) -> Result<Vec<ClassSession>, CoreError> {
        let rows = ClassSessionRepo::list_for_user(&self.pool, user_id)
            .await
            .map_err(storage("list sessions for user"))?;
        rows.into_iter().map(ClassSession::try_from).collect()
    }

    async fn update(&self, id: DbId, patch: &SessionPatch) -> Result<ClassSession, CoreError> {
        self.modify_session(id, |current| patch.merge(&current))
            .await
    }

    async fn delete(&self, id: DbId) -> Result<(), CoreError> {
        let deleted = ClassSessionRepo::delete(&self.pool, id)
            .await
            .map_err(storage("delete class session"))?;
        if !deleted {
            return Err(session_not_found(id));
        }
        Ok(())
    }

    async fn set_attendance(
        &self,
        id: DbId,
        marks: &[MarkAttendance],
    ) -> Result<ClassSession, CoreError> {
        self.modify_session(id, |mut session| {
            session.attendances = merge_attendance(&session.attendances, marks);
            Ok(session)
        })
        .await
    }

    async fn assign_teacher(
        &self,
        id: DbId,
        teacher_id: DbId,
    ) -> Result<ClassSession, CoreError> {
        self.modify_session(id, |mut session| {
            add_teacher(&mut session.teachers, teacher_id);
            Ok(session)
        })
        .await
    }

    async fn ping(&self) -> Result<(), CoreError> {
        crate::health_check(&self.pool)
            .await
            .map_err(storage("health check"))
    }
}
