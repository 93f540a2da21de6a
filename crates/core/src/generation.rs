//! Session generation from weekly schedules.
//!
//! [`Generator::generate`] is the expansion engine for one month;
//! [`Generator::generate_range`] is the batch orchestrator that drives it
//! month by month. Every month is processed sequentially and each date's
//! session is created independently: a failure stops the run but keeps what
//! was already persisted.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::calendar::MonthRef;
use crate::error::CoreError;
use crate::expansion;
use crate::schedule::{get_schedule, Schedule};
use crate::session::{ClassSession, SessionFilter};
use crate::store::{ScheduleStore, SessionStore};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Upper bound on months covered by one calendar-mode range request.
pub const MAX_RANGE_MONTHS: usize = 120;

/// How a (from, to) month range is turned into a list of months.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeMode {
    /// `from_month..=to_month`, all in `from_year`; `to_year` is ignored and a
    /// range with `from_month > to_month` selects nothing. This is how the
    /// dashboard has always behaved.
    #[default]
    Legacy,
    /// Every month from `(from_year, from_month)` through
    /// `(to_year, to_month)`, crossing year boundaries.
    Calendar,
}

impl std::str::FromStr for RangeMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(RangeMode::Legacy),
            "calendar" => Ok(RangeMode::Calendar),
            other => Err(CoreError::Validation(format!(
                "unknown range mode '{other}', expected 'legacy' or 'calendar'"
            ))),
        }
    }
}

/// Tunables for a [`Generator`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Skip dates that already have a session (any session, any time).
    /// Off by default: generating twice creates duplicates.
    #[serde(default)]
    pub skip_existing: bool,
    #[serde(default)]
    pub range_mode: RangeMode,
}

impl GenerationOptions {
    /// Copy with `skip_existing` replaced when the request overrides it.
    pub fn with_skip_existing(self, skip_existing: Option<bool>) -> Self {
        Self {
            skip_existing: skip_existing.unwrap_or(self.skip_existing),
            ..self
        }
    }
}

// ---------------------------------------------------------------------------
// Requests and results
// ---------------------------------------------------------------------------

/// A generation request, tagged by kind.
///
/// ```json
/// {"kind": "month", "schedule_id": 1, "month": 3, "year": 2025}
/// {"kind": "range", "schedule_id": 1, "from_month": 1, "from_year": 2025,
///  "to_month": 6, "to_year": 2025, "skip_existing": true}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationRequest {
    Month {
        schedule_id: DbId,
        month: u32,
        year: i32,
        #[serde(default)]
        skip_existing: Option<bool>,
    },
    Range {
        schedule_id: DbId,
        from_month: u32,
        from_year: i32,
        to_month: u32,
        to_year: i32,
        #[serde(default)]
        skip_existing: Option<bool>,
    },
}

impl GenerationRequest {
    pub fn schedule_id(&self) -> DbId {
        match self {
            GenerationRequest::Month { schedule_id, .. }
            | GenerationRequest::Range { schedule_id, .. } => *schedule_id,
        }
    }

    pub fn skip_existing(&self) -> Option<bool> {
        match self {
            GenerationRequest::Month { skip_existing, .. }
            | GenerationRequest::Range { skip_existing, .. } => *skip_existing,
        }
    }

    /// Boundary validation: every month in 1..=12, every year in range.
    pub fn validate(&self) -> Result<(), CoreError> {
        match *self {
            GenerationRequest::Month { month, year, .. } => {
                MonthRef::new(year, month)?;
            }
            GenerationRequest::Range {
                from_month,
                from_year,
                to_month,
                to_year,
                ..
            } => {
                MonthRef::new(from_year, from_month)?;
                MonthRef::new(to_year, to_month)?;
            }
        }
        Ok(())
    }
}

/// Sessions created for one month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthOutcome {
    pub month: u32,
    pub year: i32,
    pub created: Vec<ClassSession>,
    /// Matching days left alone because a session already existed.
    pub skipped_days: Vec<u32>,
}

impl MonthOutcome {
    fn summary(&self) -> MonthSummary {
        MonthSummary {
            month: self.month,
            year: self.year,
            created: self.created.len(),
            skipped: self.skipped_days.len(),
            session_ids: self.created.iter().map(|s| s.id).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthSummary {
    pub month: u32,
    pub year: i32,
    pub created: usize,
    pub skipped: usize,
    pub session_ids: Vec<DbId>,
}

/// Result of a generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub schedule_id: DbId,
    pub months: Vec<MonthSummary>,
    pub total_created: usize,
    pub total_skipped: usize,
}

impl GenerationSummary {
    fn new(schedule_id: DbId) -> Self {
        Self {
            schedule_id,
            months: Vec::new(),
            total_created: 0,
            total_skipped: 0,
        }
    }

    fn push(&mut self, month: MonthSummary) {
        self.total_created += month.created;
        self.total_skipped += month.skipped;
        self.months.push(month);
    }
}

// ---------------------------------------------------------------------------
// Month selection
// ---------------------------------------------------------------------------

/// The months a range covers under `mode`, in processing order.
pub fn months_in_range(
    mode: RangeMode,
    from: MonthRef,
    to: MonthRef,
) -> Result<Vec<MonthRef>, CoreError> {
    MonthRef::new(from.year, from.month)?;
    MonthRef::new(to.year, to.month)?;

    match mode {
        RangeMode::Legacy => Ok((from.month..=to.month)
            .map(|month| MonthRef {
                year: from.year,
                month,
            })
            .collect()),
        RangeMode::Calendar => {
            if from > to {
                return Err(CoreError::Validation(format!(
                    "range start {from} is after range end {to}"
                )));
            }
            let mut months = Vec::new();
            let mut current = from;
            while current <= to {
                if months.len() == MAX_RANGE_MONTHS {
                    return Err(CoreError::Validation(format!(
                        "range {from}..{to} covers more than {MAX_RANGE_MONTHS} months"
                    )));
                }
                months.push(current);
                current = current.next();
            }
            Ok(months)
        }
    }
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Expansion engine plus batch orchestrator over a pair of stores.
pub struct Generator {
    schedules: Arc<dyn ScheduleStore>,
    sessions: Arc<dyn SessionStore>,
    options: GenerationOptions,
}

impl Generator {
    pub fn new(
        schedules: Arc<dyn ScheduleStore>,
        sessions: Arc<dyn SessionStore>,
        options: GenerationOptions,
    ) -> Self {
        Self {
            schedules,
            sessions,
            options,
        }
    }

    pub fn options(&self) -> GenerationOptions {
        self.options
    }

    /// Create one session per date of `month`/`year` matching the schedule.
    ///
    /// Sessions are created in ascending day order, one store call each. A
    /// store failure returns [`CoreError::Generation`] for this month; the
    /// sessions created before it stay.
    pub async fn generate(
        &self,
        schedule: &Schedule,
        month: u32,
        year: i32,
    ) -> Result<MonthOutcome, CoreError> {
        MonthRef::new(year, month)?;
        schedule.ensure_usable()?;

        let drafts = expansion::expand(schedule, month, year)?;

        let existing_days: HashSet<u32> = if self.options.skip_existing {
            self.sessions
                .list(&SessionFilter::for_month(month, year))
                .await
                .map_err(|source| generation_error(month, year, 0, source))?
                .into_iter()
                .map(|s| s.day)
                .collect()
        } else {
            HashSet::new()
        };

        let mut outcome = MonthOutcome {
            month,
            year,
            created: Vec::with_capacity(drafts.len()),
            skipped_days: Vec::new(),
        };

        for draft in drafts {
            if existing_days.contains(&draft.day) {
                outcome.skipped_days.push(draft.day);
                continue;
            }
            match self.sessions.create(&draft).await {
                Ok(session) => outcome.created.push(session),
                Err(source) => {
                    tracing::error!(
                        schedule_id = schedule.id,
                        month,
                        year,
                        day = draft.day,
                        created = outcome.created.len(),
                        error = %source,
                        "Session creation failed during generation",
                    );
                    return Err(generation_error(
                        month,
                        year,
                        outcome.created.len(),
                        source,
                    ));
                }
            }
        }

        tracing::info!(
            schedule_id = schedule.id,
            schedule = %schedule.display_name(),
            month,
            year,
            created = outcome.created.len(),
            skipped = outcome.skipped_days.len(),
            "Sessions generated",
        );

        Ok(outcome)
    }

    /// Resolve the schedule and generate one month.
    pub async fn generate_month(
        &self,
        schedule_id: DbId,
        month: u32,
        year: i32,
    ) -> Result<GenerationSummary, CoreError> {
        MonthRef::new(year, month)?;
        let schedule = get_schedule(self.schedules.as_ref(), schedule_id).await?;

        let mut summary = GenerationSummary::new(schedule_id);
        let outcome = self.generate(&schedule, month, year).await?;
        summary.push(outcome.summary());
        Ok(summary)
    }

    /// Generate every month of a range, one after the other.
    ///
    /// Months are chosen by [`months_in_range`] with the configured
    /// [`RangeMode`]. The first failing month aborts the run; earlier months
    /// keep their sessions.
    pub async fn generate_range(
        &self,
        schedule_id: DbId,
        from_month: u32,
        from_year: i32,
        to_month: u32,
        to_year: i32,
    ) -> Result<GenerationSummary, CoreError> {
        let months = preview_months(
            self.options.range_mode,
            from_month,
            from_year,
            to_month,
            to_year,
        )?;
        let schedule = get_schedule(self.schedules.as_ref(), schedule_id).await?;

        if months.is_empty() {
            tracing::warn!(
                schedule_id,
                from = %format!("{from_month}/{from_year}"),
                to = %format!("{to_month}/{to_year}"),
                mode = ?self.options.range_mode,
                "Range selects no months, nothing generated",
            );
        }

        let mut summary = GenerationSummary::new(schedule_id);
        for month in months {
            let outcome = self.generate(&schedule, month.month, month.year).await?;
            summary.push(outcome.summary());
        }

        tracing::info!(
            schedule_id,
            months = summary.months.len(),
            total_created = summary.total_created,
            total_skipped = summary.total_skipped,
            "Range generation finished",
        );

        Ok(summary)
    }

    /// Validate and execute a tagged request.
    ///
    /// A per-request `skip_existing` overrides the generator's default.
    pub async fn run(&self, request: &GenerationRequest) -> Result<GenerationSummary, CoreError> {
        request.validate()?;

        let generator = Generator {
            schedules: Arc::clone(&self.schedules),
            sessions: Arc::clone(&self.sessions),
            options: self.options.with_skip_existing(request.skip_existing()),
        };

        match *request {
            GenerationRequest::Month {
                schedule_id,
                month,
                year,
                ..
            } => generator.generate_month(schedule_id, month, year).await,
            GenerationRequest::Range {
                schedule_id,
                from_month,
                from_year,
                to_month,
                to_year,
                ..
            } => {
                generator
                    .generate_range(schedule_id, from_month, from_year, to_month, to_year)
                    .await
            }
        }
    }
}

fn generation_error(month: u32, year: i32, created: usize, source: CoreError) -> CoreError {
    CoreError::Generation {
        month,
        year,
        created,
        source: Box::new(source),
    }
}

/// The months a range request would touch, without touching a store.
pub fn preview_months(
    mode: RangeMode,
    from_month: u32,
    from_year: i32,
    to_month: u32,
    to_year: i32,
) -> Result<Vec<MonthRef>, CoreError> {
    months_in_range(
        mode,
        MonthRef::new(from_year, from_month)?,
        MonthRef::new(to_year, to_month)?,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
