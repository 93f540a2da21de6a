use async_trait::async_trait;
use gymdesk_core::error::CoreError;
use gymdesk_core::schedule::{NewSchedule, Schedule};
use gymdesk_core::session::{
    ClassSession, MarkAttendance, SessionDraft, SessionFilter, SessionPatch,
};
use gymdesk_core::store::{ScheduleStore, SessionStore};
use gymdesk_core::types::DbId;

use crate::client::ApiClient;
use crate::error::ClientError;

const SCHEDULE: &str = "Schedule";
const SESSION: &str = "ClassSession";

/// A 404 for a lookup means "absent", not failure.
fn optional<T>(result: Result<T, ClientError>) -> Result<Option<T>, CoreError> {
    match result {
        Ok(found) => Ok(Some(found)),
        Err(e) if e.status() == Some(404) => Ok(None),
        Err(e) => Err(e.into_core(None)),
    }
}

#[async_trait]
impl ScheduleStore for ApiClient {
    async fn create(&self, input: &NewSchedule) -> Result<Schedule, CoreError> {
        self.create_schedule(input)
            .await
            .map_err(|e| e.into_core(None))
    }

    async fn list(&self) -> Result<Vec<Schedule>, CoreError> {
        self.list_schedules().await.map_err(|e| e.into_core(None))
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<Schedule>, CoreError> {
        optional(self.get_schedule(id).await)
    }

    async fn delete(&self, id: DbId) -> Result<(), CoreError> {
        self.delete_schedule(id)
            .await
            .map_err(|e| e.into_core(Some((SCHEDULE, id))))
    }
}

#[async_trait]
impl SessionStore for ApiClient {
    async fn create(&self, draft: &SessionDraft) -> Result<ClassSession, CoreError> {
        self.create_session(draft)
            .await
            .map_err(|e| e.into_core(None))
    }

    async fn list(&self, filter: &SessionFilter) -> Result<Vec<ClassSession>, CoreError> {
        self.list_sessions(filter)
            .await
            .map_err(|e| e.into_core(None))
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<ClassSession>, CoreError> {
        optional(self.get_session(id).await)
    }

    async fn list_for_user(&self, user_id: DbId) -> Result<Vec<ClassSession>, CoreError> {
        self.sessions_for_user(user_id)
            .await
            .map_err(|e| e.into_core(None))
    }

    async fn update(&self, id: DbId, patch: &SessionPatch) -> Result<ClassSession, CoreError> {
        self.update_session(id, patch)
            .await
            .map_err(|e| e.into_core(Some((SESSION, id))))
    }

    async fn delete(&self, id: DbId) -> Result<(), CoreError> {
        self.delete_session(id)
            .await
            .map_err(|e| e.into_core(Some((SESSION, id))))
    }

    async fn set_attendance(
        &self,
        id: DbId,
        marks: &[MarkAttendance],
    ) -> Result<ClassSession, CoreError> {
        self.mark_attendance(id, marks)
            .await
            .map_err(|e| e.into_core(Some((SESSION, id))))
    }

    async fn assign_teacher(&self, id: DbId, teacher_id: DbId) -> Result<ClassSession, CoreError> {
        ApiClient::assign_teacher(self, id, teacher_id)
            .await
            .map_err(|e| e.into_core(Some((SESSION, id))))
    }

    async fn ping(&self) -> Result<(), CoreError> {
        let health = self.health().await.map_err(|e| e.into_core(None))?;
        if health.storage_healthy {
            Ok(())
        } else {
            Err(CoreError::Storage(format!(
                "remote storage reported '{}'",
                health.status
            )))
        }
    }
}
