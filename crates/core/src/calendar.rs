//! Calendar helpers for session dates (proleptic Gregorian, no timezones).
//!
//! Weekdays are numbered the way schedules store them: 0 = Sunday through
//! 6 = Saturday.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Smallest accepted calendar year.
pub const MIN_YEAR: i32 = 1;

/// Largest accepted calendar year.
pub const MAX_YEAR: i32 = 9999;

/// Validate that a month number is within 1..=12.
pub fn validate_month(month: u32) -> Result<(), CoreError> {
    if !(1..=12).contains(&month) {
        return Err(CoreError::Validation(format!(
            "month must be between 1 and 12, got {month}"
        )));
    }
    Ok(())
}

/// Validate that a year is within [`MIN_YEAR`]..=[`MAX_YEAR`].
pub fn validate_year(year: i32) -> Result<(), CoreError> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(CoreError::Validation(format!(
            "year must be between {MIN_YEAR} and {MAX_YEAR}, got {year}"
        )));
    }
    Ok(())
}

/// Number of days in the given month, leap-year aware.
pub fn days_in_month(year: i32, month: u32) -> Result<u32, CoreError> {
    let this = MonthRef::new(year, month)?;
    let next = this.next();

    let first = this.first_day()?;
    let next_first = NaiveDate::from_ymd_opt(next.year, next.month, 1)
        .ok_or_else(|| CoreError::Internal(format!("no first day for {next}")))?;

    let days = next_first.signed_duration_since(first).num_days();
    u32::try_from(days).map_err(|_| CoreError::Internal(format!("bad month length {days}")))
}

/// Resolve a (day, month, year) triple to a real date.
///
/// Rejects out-of-range months and years and days that do not exist in the
/// month (e.g. 30 February, 29 February in a common year).
pub fn resolve_date(day: u32, month: u32, year: i32) -> Result<NaiveDate, CoreError> {
    validate_month(month)?;
    validate_year(year)?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        CoreError::Validation(format!("{year:04}-{month:02}-{day:02} is not a calendar date"))
    })
}

/// Day of week of `date` with Sunday = 0.
pub fn weekday_index(date: NaiveDate) -> u8 {
    // num_days_from_sunday is always 0..=6.
    date.weekday().num_days_from_sunday() as u8
}

/// A calendar month, ordered chronologically (year first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthRef {
    pub year: i32,
    pub month: u32,
}

impl MonthRef {
    /// Build a validated month reference.
    pub fn new(year: i32, month: u32) -> Result<Self, CoreError> {
        validate_month(month)?;
        validate_year(year)?;
        Ok(Self { year, month })
    }

    /// The following month, rolling over into January of the next year.
    pub fn next(self) -> Self {
        if self.month >= 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// First calendar day of this month.
    pub fn first_day(self) -> Result<NaiveDate, CoreError> {
        resolve_date(1, self.month, self.year)
    }
}

impl std::fmt::Display for MonthRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.month, self.year)
    }
}
