//! Class sessions: dated, timed class occurrences with attendance and
//! teacher assignment.
//!
//! Sessions are created manually or by the expansion engine
//! ([`crate::generation`]). Times are copied from the originating schedule
//! at generation time, never referenced live.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::calendar::{self, MonthRef};
use crate::error::CoreError;
use crate::schedule::parse_time_of_day;
use crate::store::SessionStore;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Attendance status for one user in one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

/// One attendance entry. Keys (`user_id`) are unique within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendance {
    pub user_id: DbId,
    pub status: AttendanceStatus,
}

/// An attendance mark submitted by staff; same shape as a stored entry.
pub type MarkAttendance = Attendance;

/// A persisted class session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSession {
    pub id: DbId,
    pub day: u32,
    pub month: u32,
    pub year: i32,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    /// Schedule this session was generated from, if any. Provenance only.
    pub schedule_id: Option<DbId>,
    pub teachers: Vec<DbId>,
    pub attendances: Vec<Attendance>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ClassSession {
    pub fn month_ref(&self) -> MonthRef {
        MonthRef {
            year: self.year,
            month: self.month,
        }
    }

    fn sort_key(&self) -> (i32, u32, u32, DbId) {
        (self.year, self.month, self.day, self.id)
    }
}

/// DTO for creating a session (manually or from a schedule).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDraft {
    pub day: u32,
    pub month: u32,
    pub year: i32,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub schedule_id: Option<DbId>,
}

impl SessionDraft {
    /// Validate the date and times, turning blank times into `None`.
    pub fn normalized(self) -> Result<Self, CoreError> {
        calendar::resolve_date(self.day, self.month, self.year)?;
        let start_time = normalize_time(self.start_time)?;
        let end_time = normalize_time(self.end_time)?;
        check_time_order(start_time.as_deref(), end_time.as_deref())?;

        Ok(Self {
            start_time,
            end_time,
            ..self
        })
    }
}

/// DTO for partially updating a session.
///
/// `None` leaves a field unchanged. For the time fields, an empty string
/// clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionPatch {
    #[serde(default)]
    pub day: Option<u32>,
    #[serde(default)]
    pub month: Option<u32>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
}

impl SessionPatch {
    /// Apply the patch to `current`, validating the merged result.
    ///
    /// Returns the updated session; `updated_at` is left for the store to
    /// set.
    pub fn merge(&self, current: &ClassSession) -> Result<ClassSession, CoreError> {
        let day = self.day.unwrap_or(current.day);
        let month = self.month.unwrap_or(current.month);
        let year = self.year.unwrap_or(current.year);
        calendar::resolve_date(day, month, year)?;

        let start_time = match &self.start_time {
            Some(value) => normalize_time(Some(value.clone()))?,
            None => current.start_time.clone(),
        };
        let end_time = match &self.end_time {
            Some(value) => normalize_time(Some(value.clone()))?,
            None => current.end_time.clone(),
        };
        check_time_order(start_time.as_deref(), end_time.as_deref())?;

        Ok(ClassSession {
            day,
            month,
            year,
            start_time,
            end_time,
            ..current.clone()
        })
    }
}

/// Optional month/year filter for listing sessions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFilter {
    #[serde(default)]
    pub month: Option<u32>,
    #[serde(default)]
    pub year: Option<i32>,
}

impl SessionFilter {
    /// Filter matching exactly one calendar month.
    pub fn for_month(month: u32, year: i32) -> Self {
        Self {
            month: Some(month),
            year: Some(year),
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(month) = self.month {
            calendar::validate_month(month)?;
        }
        if let Some(year) = self.year {
            calendar::validate_year(year)?;
        }
        Ok(())
    }

    pub fn matches(&self, session: &ClassSession) -> bool {
        self.month.map_or(true, |m| m == session.month)
            && self.year.map_or(true, |y| y == session.year)
    }
}

/// Sessions of one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthGroup {
    pub year: i32,
    pub month: u32,
    pub sessions: Vec<ClassSession>,
}

/// Result of a bulk action: which ids succeeded, which failed and why.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkOutcome {
    pub succeeded: Vec<DbId>,
    pub failed: Vec<BulkFailure>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkFailure {
    pub id: DbId,
    pub reason: String,
}

// ---------------------------------------------------------------------------
// Pure helpers
// ---------------------------------------------------------------------------

fn normalize_time(value: Option<String>) -> Result<Option<String>, CoreError> {
    match value {
        Some(v) if v.trim().is_empty() => Ok(None),
        Some(v) => {
            parse_time_of_day(&v)?;
            Ok(Some(v))
        }
        None => Ok(None),
    }
}

fn check_time_order(start: Option<&str>, end: Option<&str>) -> Result<(), CoreError> {
    if let (Some(start), Some(end)) = (start, end) {
        if parse_time_of_day(start)? >= parse_time_of_day(end)? {
            return Err(CoreError::Validation(format!(
                "start_time ({start}) must be before end_time ({end})"
            )));
        }
    }
    Ok(())
}

/// Order sessions by date, then id.
pub fn sort_sessions(sessions: &mut [ClassSession]) {
    sessions.sort_by_key(ClassSession::sort_key);
}

/// Merge attendance marks into existing entries.
///
/// Existing users keep their position and take the new status; new users
/// are appended in mark order. When a user is marked more than once, the
/// last mark wins. The result never holds two entries for one user.
pub fn merge_attendance(existing: &[Attendance], marks: &[MarkAttendance]) -> Vec<Attendance> {
    let mut merged: Vec<Attendance> = Vec::with_capacity(existing.len() + marks.len());
    let mut index: HashMap<DbId, usize> = HashMap::new();

    for entry in existing.iter().chain(marks) {
        match index.get(&entry.user_id) {
            Some(&pos) => merged[pos].status = entry.status,
            None => {
                index.insert(entry.user_id, merged.len());
                merged.push(*entry);
            }
        }
    }
    merged
}

/// Add a teacher to a set. Returns `false` if already assigned.
pub fn add_teacher(teachers: &mut Vec<DbId>, teacher_id: DbId) -> bool {
    if teachers.contains(&teacher_id) {
        return false;
    }
    teachers.push(teacher_id);
    true
}

/// Group sessions by calendar month, oldest month first.
pub fn group_by_month(mut sessions: Vec<ClassSession>) -> Vec<MonthGroup> {
    sort_sessions(&mut sessions);

    let mut groups: Vec<(MonthRef, MonthGroup)> = Vec::new();
    for session in sessions {
        let key = session.month_ref();
        match groups.last_mut() {
            Some((last, group)) if *last == key => group.sessions.push(session),
            _ => groups.push((
                key,
                MonthGroup {
                    year: key.year,
                    month: key.month,
                    sessions: vec![session],
                },
            )),
        }
    }
    groups.into_iter().map(|(_, group)| group).collect()
}

fn dedup_ids(ids: &[DbId]) -> Vec<DbId> {
    let mut seen = std::collections::HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

fn not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "ClassSession",
        id,
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Validate and persist a session.
pub async fn create_session(
    store: &dyn SessionStore,
    draft: SessionDraft,
) -> Result<ClassSession, CoreError> {
    let draft = draft.normalized()?;
    let session = store.create(&draft).await?;
    tracing::info!(
        session_id = session.id,
        day = session.day,
        month = session.month,
        year = session.year,
        "Class session created",
    );
    Ok(session)
}

/// Sessions matching the filter, ordered by date.
pub async fn list_sessions(
    store: &dyn SessionStore,
    filter: SessionFilter,
) -> Result<Vec<ClassSession>, CoreError> {
    filter.validate()?;
    let mut sessions = store.list(&filter).await?;
    sort_sessions(&mut sessions);
    Ok(sessions)
}

/// Attendance history of one user: every session they were marked on, ordered
/// by date.
pub async fn sessions_for_user(
    store: &dyn SessionStore,
    user_id: DbId,
) -> Result<Vec<ClassSession>, CoreError> {
    let mut sessions = store.list_for_user(user_id).await?;
    sort_sessions(&mut sessions);
    tracing::debug!(user_id, count = sessions.len(), "Loaded attendance history");
    Ok(sessions)
}

pub async fn get_session(store: &dyn SessionStore, id: DbId) -> Result<ClassSession, CoreError> {
    store.find_by_id(id).await?.ok_or_else(|| not_found(id))
}

pub async fn update_session(
    store: &dyn SessionStore,
    id: DbId,
    patch: SessionPatch,
) -> Result<ClassSession, CoreError> {
    let session = store.update(id, &patch).await?;
    tracing::info!(session_id = id, "Class session updated");
    Ok(session)
}

pub async fn delete_session(store: &dyn SessionStore, id: DbId) -> Result<(), CoreError> {
    store.delete(id).await?;
    tracing::info!(session_id = id, "Class session deleted");
    Ok(())
}

/// Record attendance marks on a session (upsert per user).
pub async fn mark_attendance(
    store: &dyn SessionStore,
    id: DbId,
    marks: &[MarkAttendance],
) -> Result<ClassSession, CoreError> {
    let session = store.set_attendance(id, marks).await?;
    tracing::info!(
        session_id = id,
        marks = marks.len(),
        "Attendance recorded"
    );
    Ok(session)
}

pub async fn assign_teacher(
    store: &dyn SessionStore,
    id: DbId,
    teacher_id: DbId,
) -> Result<ClassSession, CoreError> {
    let session = store.assign_teacher(id, teacher_id).await?;
    tracing::info!(session_id = id, teacher_id, "Teacher assigned");
    Ok(session)
}

/// Delete many sessions one at a time, reporting each id's outcome.
pub async fn bulk_delete(store: &dyn SessionStore, ids: &[DbId]) -> Result<BulkOutcome, CoreError> {
    if ids.is_empty() {
        return Err(CoreError::validation("ids must not be empty"));
    }

    let mut outcome = BulkOutcome::default();
    for id in dedup_ids(ids) {
        match store.delete(id).await {
            Ok(()) => outcome.succeeded.push(id),
            Err(e) => outcome.failed.push(BulkFailure {
                id,
                reason: e.to_string(),
            }),
        }
    }

    tracing::info!(
        succeeded = outcome.succeeded.len(),
        failed = outcome.failed.len(),
        "Bulk session delete finished",
    );
    Ok(outcome)
}

/// Assign one teacher to many sessions, reporting each id's outcome.
pub async fn bulk_assign_teacher(
    store: &dyn SessionStore,
    ids: &[DbId],
    teacher_id: DbId,
) -> Result<BulkOutcome, CoreError> {
    if ids.is_empty() {
        return Err(CoreError::validation("ids must not be empty"));
    }

    let mut outcome = BulkOutcome::default();
    for id in dedup_ids(ids) {
        match store.assign_teacher(id, teacher_id).await {
            Ok(_) => outcome.succeeded.push(id),
            Err(e) => outcome.failed.push(BulkFailure {
                id,
                reason: e.to_string(),
            }),
        }
    }

    tracing::info!(
        teacher_id,
        succeeded = outcome.succeeded.len(),
        failed = outcome.failed.len(),
        "Bulk teacher assignment finished",
    );
    Ok(outcome)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
