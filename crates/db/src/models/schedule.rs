//! Schedule rows.

use gymdesk_core::schedule::Schedule;
use gymdesk_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `schedules` table.
#[derive(Debug, Clone, FromRow)]
pub struct ScheduleRow {
    pub id: DbId,
    pub name: Option<String>,
    pub days_of_week: Vec<i16>,
    pub start_time: String,
    pub end_time: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<ScheduleRow> for Schedule {
    fn from(row: ScheduleRow) -> Self {
        Schedule {
            id: row.id,
            name: row.name,
            days_of_week: row.days_of_week,
            start_time: row.start_time,
            end_time: row.end_time,
            created_at: row.created_at,
        }
    }
}
