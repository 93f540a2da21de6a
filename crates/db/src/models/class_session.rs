//! Class session rows.
//!
//! Calendar fields are `INTEGER` columns; attendance is a JSONB array of
//! `{user_id, status}` objects.

use gymdesk_core::error::CoreError;
use gymdesk_core::session::{Attendance, ClassSession};
use gymdesk_core::types::{DbId, Timestamp};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `class_sessions` table.
#[derive(Debug, Clone, FromRow)]
pub struct ClassSessionRow {
    pub id: DbId,
    pub schedule_id: Option<DbId>,
    pub day: i32,
    pub month: i32,
    pub year: i32,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub teachers: Vec<DbId>,
    pub attendances: Json<Vec<Attendance>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<ClassSessionRow> for ClassSession {
    type Error = CoreError;

    fn try_from(row: ClassSessionRow) -> Result<Self, Self::Error> {
        let day = u32::try_from(row.day)
            .map_err(|_| corrupt(row.id, format!("negative day {}", row.day)))?;
        let month = u32::try_from(row.month)
            .map_err(|_| corrupt(row.id, format!("negative month {}", row.month)))?;

        Ok(ClassSession {
            id: row.id,
            day,
            month,
            year: row.year,
            start_time: row.start_time,
            end_time: row.end_time,
            schedule_id: row.schedule_id,
            teachers: row.teachers,
            attendances: row.attendances.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn corrupt(id: DbId, detail: String) -> CoreError {
    CoreError::Storage(format!("class_sessions row {id} is corrupt: {detail}"))
}

/// Convert a day/month value for binding to an `INTEGER` column.
pub fn to_column(value: u32, field: &'static str) -> Result<i32, CoreError> {
    i32::try_from(value)
        .map_err(|_| CoreError::Validation(format!("{field} {value} is out of range")))
}
