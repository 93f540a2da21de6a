//! Pure schedule expansion: weekly pattern + month -> dated session drafts.
//!
//! No persistence happens here; [`crate::generation::Generator`] feeds the
//! drafts to a [`crate::store::SessionStore`].

use crate::calendar::{self, MonthRef};
use crate::error::CoreError;
use crate::schedule::Schedule;
use crate::session::SessionDraft;

/// Days of `month`/`year` whose weekday (0 = Sunday) is in `days_of_week`,
/// in ascending order.
pub fn matching_days(days_of_week: &[i16], month: u32, year: i32) -> Result<Vec<u32>, CoreError> {
    let first = MonthRef::new(year, month)?.first_day()?;
    let length = calendar::days_in_month(year, month)?;

    Ok(first
        .iter_days()
        .take(length as usize)
        .filter(|date| days_of_week.contains(&i16::from(calendar::weekday_index(*date))))
        .map(|date| chrono::Datelike::day(&date))
        .collect())
}

/// One draft per matching date, carrying the schedule's time window.
///
/// A schedule with no days yields no drafts; rejecting such schedules is the
/// caller's job.
pub fn expand(schedule: &Schedule, month: u32, year: i32) -> Result<Vec<SessionDraft>, CoreError> {
    Ok(matching_days(&schedule.days_of_week, month, year)?
        .into_iter()
        .map(|day| SessionDraft {
            day,
            month,
            year,
            start_time: Some(schedule.start_time.clone()),
            end_time: Some(schedule.end_time.clone()),
            schedule_id: Some(schedule.id),
        })
        .collect())
}
