//! Weekly schedule templates: types, validation and lifecycle operations.
//!
//! A schedule is a recurring weekly pattern (days of week plus a single
//! time window) used to mass-produce dated class sessions. Schedules are
//! immutable once created; the only lifecycle operations are create, list,
//! get and delete.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::store::ScheduleStore;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Largest valid day-of-week value (Saturday). Sunday is 0.
pub const MAX_DAY_OF_WEEK: i16 = 6;

/// Format of every stored time of day.
const TIME_FORMAT: &str = "%H:%M";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A persisted weekly schedule template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: DbId,
    pub name: Option<String>,
    /// Days of week, 0 = Sunday .. 6 = Saturday, sorted and unique.
    pub days_of_week: Vec<i16>,
    /// `HH:MM`, 24-hour.
    pub start_time: String,
    /// `HH:MM`, 24-hour, after `start_time`.
    pub end_time: String,
    pub created_at: Timestamp,
}

impl Schedule {
    /// Re-check the schedule invariants before it is used for expansion.
    pub fn ensure_usable(&self) -> Result<(), CoreError> {
        validate_days_of_week(&self.days_of_week)?;
        validate_time_window(&self.start_time, &self.end_time)?;
        Ok(())
    }

    /// Label for lists: the name, or `Schedule (<id>)` when unnamed.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("Schedule ({})", self.id),
        }
    }
}

/// DTO for creating a schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NewSchedule {
    #[serde(default)]
    #[validate(length(max = 120, message = "name must be at most 120 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 7, message = "days_of_week must list between 1 and 7 days"))]
    pub days_of_week: Vec<i16>,
    pub start_time: String,
    pub end_time: String,
}

impl NewSchedule {
    /// Validate the input and return its canonical form.
    ///
    /// Blank names become `None`, names are trimmed, and days are sorted.
    /// Empty, duplicated or out-of-range days, malformed times and windows
    /// whose start is not before the end are rejected.
    pub fn normalized(self) -> Result<Self, CoreError> {
        self.validate()
            .map_err(|e| CoreError::Validation(e.to_string()))?;
        validate_days_of_week(&self.days_of_week)?;
        validate_time_window(&self.start_time, &self.end_time)?;

        let name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        let mut days_of_week = self.days_of_week;
        days_of_week.sort_unstable();

        Ok(Self {
            name,
            days_of_week,
            start_time: self.start_time,
            end_time: self.end_time,
        })
    }
}

// ---------------------------------------------------------------------------
// Validation functions
// ---------------------------------------------------------------------------

/// Parse a strict `HH:MM` 24-hour time.
///
/// Exactly two digits for hours and minutes; `9:00` and `09:00:00` are
/// rejected.
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, CoreError> {
    let bytes = value.as_bytes();
    let well_shaped = bytes.len() == 5
        && bytes[2] == b':'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 2 || b.is_ascii_digit());

    if !well_shaped {
        return Err(CoreError::Validation(format!(
            "time must be formatted as HH:MM, got '{value}'"
        )));
    }

    NaiveTime::parse_from_str(value, TIME_FORMAT)
        .map_err(|_| CoreError::Validation(format!("'{value}' is not a valid time of day")))
}

/// Validate that both times are well formed and `start` is before `end`.
pub fn validate_time_window(start: &str, end: &str) -> Result<(), CoreError> {
    let start_at = parse_time_of_day(start)?;
    let end_at = parse_time_of_day(end)?;
    if start_at >= end_at {
        return Err(CoreError::Validation(format!(
            "start_time ({start}) must be before end_time ({end})"
        )));
    }
    Ok(())
}

/// Validate a day-of-week set: non-empty, each in 0..=6, no duplicates.
pub fn validate_days_of_week(days: &[i16]) -> Result<(), CoreError> {
    if days.is_empty() {
        return Err(CoreError::validation("days_of_week must not be empty"));
    }

    let mut seen = [false; 7];
    for &day in days {
        if !(0..=MAX_DAY_OF_WEEK).contains(&day) {
            return Err(CoreError::Validation(format!(
                "days_of_week values must be between 0 (Sunday) and 6 (Saturday), got {day}"
            )));
        }
        let slot = &mut seen[day as usize];
        if *slot {
            return Err(CoreError::Validation(format!(
                "days_of_week contains duplicate day {day}"
            )));
        }
        *slot = true;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Lifecycle operations
// ---------------------------------------------------------------------------

/// Validate and persist a new schedule.
pub async fn create_schedule(
    store: &dyn ScheduleStore,
    input: NewSchedule,
) -> Result<Schedule, CoreError> {
    let input = input.normalized()?;
    let schedule = store.create(&input).await?;

    tracing::info!(
        schedule_id = schedule.id,
        days = ?schedule.days_of_week,
        start_time = %schedule.start_time,
        end_time = %schedule.end_time,
        "Schedule created",
    );

    Ok(schedule)
}

/// All schedules, ordered by id.
pub async fn list_schedules(store: &dyn ScheduleStore) -> Result<Vec<Schedule>, CoreError> {
    store.list().await
}

/// Fetch one schedule or fail with `NotFound`.
pub async fn get_schedule(store: &dyn ScheduleStore, id: DbId) -> Result<Schedule, CoreError> {
    store.find_by_id(id).await?.ok_or(CoreError::NotFound {
        entity: "Schedule",
        id,
    })
}

/// Delete a schedule. Sessions generated from it are left untouched.
pub async fn delete_schedule(store: &dyn ScheduleStore, id: DbId) -> Result<(), CoreError> {
    store.delete(id).await?;
    tracing::info!(schedule_id = id, "Schedule deleted");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
