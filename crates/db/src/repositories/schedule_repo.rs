use gymdesk_core::schedule::NewSchedule;
use gymdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::schedule::ScheduleRow;

/// Column list for `schedules` queries.
const COLUMNS: &str = "id, name, days_of_week, start_time, end_time, created_at, updated_at";

/// Provides data access for weekly schedules.
pub struct ScheduleRepo;

impl ScheduleRepo {
    pub async fn create(pool: &PgPool, input: &NewSchedule) -> Result<ScheduleRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO schedules (name, days_of_week, start_time, end_time) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ScheduleRow>(&query)
            .bind(&input.name)
            .bind(&input.days_of_week)
            .bind(&input.start_time)
            .bind(&input.end_time)
            .fetch_one(pool)
            .await
    }

    /// All schedules ordered by id.
    pub async fn list(pool: &PgPool) -> Result<Vec<ScheduleRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM schedules ORDER BY id");
        sqlx::query_as::<_, ScheduleRow>(&query).fetch_all(pool).await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ScheduleRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM schedules WHERE id = $1");
        sqlx::query_as::<_, ScheduleRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a schedule. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM schedules WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
