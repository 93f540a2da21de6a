//! Persistence seams for schedules and class sessions.
//!
//! The engine and the HTTP layer only talk to these traits. Implementations:
//!
//! - [`crate::memory::InMemoryStore`] -- process-local, used by tests and the
//!   `memory` storage backend.
//! - `gymdesk_db::PgStore` -- PostgreSQL via sqlx.
//! - `gymdesk_client::ApiClient` -- a remote gymdesk API over HTTP.
//!
//! Stores persist what they are given; validation happens in the operation
//! functions of [`crate::schedule`] and [`crate::session`] before a store is
//! called. Stores must serialise concurrent writes themselves.

use async_trait::async_trait;

use crate::error::CoreError;
use crate::schedule::{NewSchedule, Schedule};
use crate::session::{ClassSession, MarkAttendance, SessionDraft, SessionFilter, SessionPatch};
use crate::types::DbId;

#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn create(&self, input: &NewSchedule) -> Result<Schedule, CoreError>;

    /// All schedules ordered by id.
    async fn list(&self) -> Result<Vec<Schedule>, CoreError>;

    async fn find_by_id(&self, id: DbId) -> Result<Option<Schedule>, CoreError>;

    /// Fails with `NotFound` when the schedule does not exist.
    async fn delete(&self, id: DbId) -> Result<(), CoreError>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a session with no teachers and no attendance.
    async fn create(&self, draft: &SessionDraft) -> Result<ClassSession, CoreError>;

    async fn list(&self, filter: &SessionFilter) -> Result<Vec<ClassSession>, CoreError>;

    async fn find_by_id(&self, id: DbId) -> Result<Option<ClassSession>, CoreError>;

    /// Sessions carrying an attendance mark (present or absent) for `user_id`.
    async fn list_for_user(&self, user_id: DbId) -> Result<Vec<ClassSession>, CoreError>;

    /// Apply a patch via [`SessionPatch::merge`]. `NotFound` when absent.
    async fn update(&self, id: DbId, patch: &SessionPatch) -> Result<ClassSession, CoreError>;

    /// `NotFound` when absent.
    async fn delete(&self, id: DbId) -> Result<(), CoreError>;

    /// Merge marks via [`crate::session::merge_attendance`]. `NotFound` when absent.
    async fn set_attendance(
        &self,
        id: DbId,
        marks: &[MarkAttendance],
    ) -> Result<ClassSession, CoreError>;

    /// Add a teacher to the session's set. `NotFound` when absent.
    async fn assign_teacher(&self, id: DbId, teacher_id: DbId)
        -> Result<ClassSession, CoreError>;

    /// Backend reachability check for health endpoints.
    async fn ping(&self) -> Result<(), CoreError> {
        Ok(())
    }
}
