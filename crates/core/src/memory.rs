//! Process-local store implementing both [`ScheduleStore`] and
//! [`SessionStore`].
//!
//! Backs the `memory` storage backend and every test that does not need
//! PostgreSQL. All state sits behind one `tokio::sync::RwLock`, so writes are
//! serialised.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::CoreError;
use crate::schedule::{NewSchedule, Schedule};
use crate::session::{
    add_teacher, merge_attendance, ClassSession, MarkAttendance, SessionDraft, SessionFilter,
    SessionPatch,
};
use crate::store::{ScheduleStore, SessionStore};
use crate::types::DbId;

#[derive(Default)]
struct Inner {
    last_schedule_id: DbId,
    last_session_id: DbId,
    schedules: BTreeMap<DbId, Schedule>,
    sessions: BTreeMap<DbId, ClassSession>,
}

/// In-memory schedule and session store.
#[derive(Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn session_not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "ClassSession",
        id,
    }
}

#[async_trait]
impl ScheduleStore for InMemoryStore {
    async fn create(&self, input: &NewSchedule) -> Result<Schedule, CoreError> {
        let mut inner = self.inner.write().await;
        inner.last_schedule_id += 1;
        let schedule = Schedule {
            id: inner.last_schedule_id,
            name: input.name.clone(),
            days_of_week: input.days_of_week.clone(),
            start_time: input.start_time.clone(),
            end_time: input.end_time.clone(),
            created_at: chrono::Utc::now(),
        };
        inner.schedules.insert(schedule.id, schedule.clone());
        Ok(schedule)
    }

    async fn list(&self) -> Result<Vec<Schedule>, CoreError> {
        Ok(self.inner.read().await.schedules.values().cloned().collect())
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<Schedule>, CoreError> {
        Ok(self.inner.read().await.schedules.get(&id).cloned())
    }

    async fn delete(&self, id: DbId) -> Result<(), CoreError> {
        self.inner
            .write()
            .await
            .schedules
            .remove(&id)
            .map(|_| ())
            .ok_or(CoreError::NotFound {
                entity: "Schedule",
                id,
            })
    }
}

#[async_trait]
impl SessionStore for InMemoryStore {
    async fn create(&self, draft: &SessionDraft) -> Result<ClassSession, CoreError> {
        let mut inner = self.inner.write().await;
        inner.last_session_id += 1;
        let now = chrono::Utc::now();
        let session = ClassSession {
            id: inner.last_session_id,
            day: draft.day,
            month: draft.month,
            year: draft.year,
            start_time: draft.start_time.clone(),
            end_time: draft.end_time.clone(),
            schedule_id: draft.schedule_id,
            teachers: Vec::new(),
            attendances: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        inner.sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn list(&self, filter: &SessionFilter) -> Result<Vec<ClassSession>, CoreError> {
        Ok(self
            .inner
            .read()
            .await
            .sessions
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<ClassSession>, CoreError> {
        Ok(self.inner.read().await.sessions.get(&id).cloned())
    }

    async fn list_for_user(&self, user_id: DbId) -> Result<Vec<ClassSession>, CoreError> {
        Ok(self
            .inner
            .read()
            .await
            .sessions
            .values()
            .filter(|s| s.attendances.iter().any(|a| a.user_id == user_id))
            .cloned()
            .collect())
    }

    async fn update(&self, id: DbId, patch: &SessionPatch) -> Result<ClassSession, CoreError> {
        let mut inner = self.inner.write().await;
        let current = inner.sessions.get(&id).ok_or_else(|| session_not_found(id))?;
        let mut updated = patch.merge(current)?;
        updated.updated_at = chrono::Utc::now();
        inner.sessions.insert(id, updated.clone());
        Ok(updated)
    }

    async fn delete(&self, id: DbId) -> Result<(), CoreError> {
        self.inner
            .write()
            .await
            .sessions
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| session_not_found(id))
    }

    async fn set_attendance(
        &self,
        id: DbId,
        marks: &[MarkAttendance],
    ) -> Result<ClassSession, CoreError> {
        let mut inner = self.inner.write().await;
        let session = inner
            .sessions
            .get_mut(&id)
            .ok_or_else(|| session_not_found(id))?;
        session.attendances = merge_attendance(&session.attendances, marks);
        session.updated_at = chrono::Utc::now();
        Ok(session.clone())
    }

    async fn assign_teacher(
        &self,
        id: DbId,
        teacher_id: DbId,
    ) -> Result<ClassSession, CoreError> {
        let mut inner = self.inner.write().await;
        let session = inner
            .sessions
            .get_mut(&id)
            .ok_or_else(|| session_not_found(id))?;
        if add_teacher(&mut session.teachers, teacher_id) {
            session.updated_at = chrono::Utc::now();
        }
        Ok(session.clone())
    }
}
