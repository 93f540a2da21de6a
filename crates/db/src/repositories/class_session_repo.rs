//! Repository for the `class_sessions` table.
//!
//! Read-modify-write updates (patches, attendance, teachers) lock the row
//! with [`ClassSessionRepo::lock_by_id`] inside a transaction and write the
//! merged values back with [`ClassSessionRepo::overwrite`].

use gymdesk_core::session::Attendance;
use gymdesk_core::types::DbId;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};

use crate::models::class_session::ClassSessionRow;

/// Column list for `class_sessions` queries.
const COLUMNS: &str = "\
    id, schedule_id, day, month, year, start_time, end_time, \
    teachers, attendances, created_at, updated_at";

/// Insert payload with calendar fields already converted to column types.
#[derive(Debug, Clone)]
pub struct InsertClassSession<'a> {
    pub schedule_id: Option<DbId>,
    pub day: i32,
    pub month: i32,
    pub year: i32,
    pub start_time: Option<&'a str>,
    pub end_time: Option<&'a str>,
}

/// Full set of mutable columns written back after a locked read.
#[derive(Debug, Clone)]
pub struct OverwriteClassSession<'a> {
    pub day: i32,
    pub month: i32,
    pub year: i32,
    pub start_time: Option<&'a str>,
    pub end_time: Option<&'a str>,
    pub teachers: &'a [DbId],
    pub attendances: &'a [Attendance],
}

/// Provides data access for class sessions.
pub struct ClassSessionRepo;

impl ClassSessionRepo {
    /// Insert a session with no teachers and no attendance.
    pub async fn create(
        pool: &PgPool,
        input: &InsertClassSession<'_>,
    ) -> Result<ClassSessionRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO class_sessions (schedule_id, day, month, year, start_time, end_time) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ClassSessionRow>(&query)
            .bind(input.schedule_id)
            .bind(input.day)
            .bind(input.month)
            .bind(input.year)
            .bind(input.start_time)
            .bind(input.end_time)
            .fetch_one(pool)
            .await
    }

    /// Sessions matching an optional month and year, ordered by date then id.
    pub async fn list(
        pool: &PgPool,
        month: Option<i32>,
        year: Option<i32>,
    ) -> Result<Vec<ClassSessionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM class_sessions \
             WHERE ($1::INTEGER IS NULL OR month = $1) \
               AND ($2::INTEGER IS NULL OR year = $2) \
             ORDER BY year, month, day, id"
        );
        sqlx::query_as::<_, ClassSessionRow>(&query)
            .bind(month)
            .bind(year)
            .fetch_all(pool)
            .await
    }

    /// Sessions whose attendance list holds an entry for `user_id`.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<ClassSessionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM class_sessions \
             WHERE attendances @> jsonb_build_array(jsonb_build_object('user_id', $1::BIGINT)) \
             ORDER BY year, month, day, id"
        );
        sqlx::query_as::<_, ClassSessionRow>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ClassSessionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM class_sessions WHERE id = $1");
        sqlx::query_as::<_, ClassSessionRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Read a session with `FOR UPDATE`. Must run inside a transaction.
    pub async fn lock_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<ClassSessionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM class_sessions WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, ClassSessionRow>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Write every mutable column and bump `updated_at`.
    pub async fn overwrite(
        conn: &mut PgConnection,
        id: DbId,
        values: &OverwriteClassSession<'_>,
    ) -> Result<ClassSessionRow, sqlx::Error> {
        let query = format!(
            "UPDATE class_sessions SET \
                 day = $2, \
                 month = $3, \
                 year = $4, \
                 start_time = $5, \
                 end_time = $6, \
                 teachers = $7, \
                 attendances = $8, \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ClassSessionRow>(&query)
            .bind(id)
            .bind(values.day)
            .bind(values.month)
            .bind(values.year)
            .bind(values.start_time)
            .bind(values.end_time)
            .bind(values.teachers)
            .bind(Json(values.attendances))
            .fetch_one(conn)
            .await
    }

    /// Delete a session. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM class_sessions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
