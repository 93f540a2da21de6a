//! Handlers for class sessions: CRUD, attendance, teacher assignment and
//! bulk actions.
//!
//! Reads require authentication; attendance can be marked by admins and
//! teachers; everything else that writes requires the admin role.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use gymdesk_core::session::{
    self, group_by_month, MarkAttendance, SessionDraft, SessionFilter, SessionPatch,
};
use gymdesk_core::types::DbId;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAdmin, RequireStaff};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct AttendanceRequest {
    pub attendances: Vec<MarkAttendance>,
}

#[derive(Debug, Deserialize)]
pub struct AssignTeacherRequest {
    pub teacher_id: DbId,
}

#[derive(Debug, Deserialize)]
pub struct BulkDeleteRequest {
    pub ids: Vec<DbId>,
}

#[derive(Debug, Deserialize)]
pub struct BulkAssignTeacherRequest {
    pub ids: Vec<DbId>,
    pub teacher_id: DbId,
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// GET /api/v1/class-sessions?month=&year=
pub async fn list_sessions(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<SessionFilter>,
) -> AppResult<impl IntoResponse> {
    let sessions = session::list_sessions(state.sessions.as_ref(), filter).await?;

    Ok(Json(DataResponse { data: sessions }))
}

/// GET /api/v1/class-sessions/by-month?month=&year=
///
/// Same filter as the flat list, grouped by calendar month, oldest first.
pub async fn list_sessions_by_month(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<SessionFilter>,
) -> AppResult<impl IntoResponse> {
    let sessions = session::list_sessions(state.sessions.as_ref(), filter).await?;

    Ok(Json(DataResponse {
        data: group_by_month(sessions),
    }))
}

/// GET /api/v1/class-sessions/user/{user_id}
///
/// Attendance history: every session the user has been marked on.
pub async fn list_sessions_for_user(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let sessions = session::sessions_for_user(state.sessions.as_ref(), user_id).await?;

    Ok(Json(DataResponse { data: sessions }))
}

/// POST /api/v1/class-sessions
pub async fn create_session(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(draft): Json<SessionDraft>,
) -> AppResult<impl IntoResponse> {
    let created = session::create_session(state.sessions.as_ref(), draft).await?;

    tracing::info!(
        session_id = created.id,
        user_id = admin.user_id,
        "Class session created via API"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// GET /api/v1/class-sessions/{id}
pub async fn get_session(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let found = session::get_session(state.sessions.as_ref(), id).await?;

    Ok(Json(DataResponse { data: found }))
}

/// PUT /api/v1/class-sessions/{id}
///
/// Partial update; omitted fields keep their value, an empty time clears it.
pub async fn update_session(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(patch): Json<SessionPatch>,
) -> AppResult<impl IntoResponse> {
    let updated = session::update_session(state.sessions.as_ref(), id, patch).await?;

    tracing::debug!(session_id = id, user_id = admin.user_id, "Class session update applied");

    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/class-sessions/{id}
pub async fn delete_session(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    session::delete_session(state.sessions.as_ref(), id).await?;

    tracing::info!(
        session_id = id,
        user_id = admin.user_id,
        "Class session deleted via API"
    );

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Attendance and teachers
// ---------------------------------------------------------------------------

/// PUT /api/v1/class-sessions/{id}/attendance
///
/// Upsert attendance marks: one entry per user, the last mark wins.
pub async fn mark_attendance(
    RequireStaff(staff): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<AttendanceRequest>,
) -> AppResult<impl IntoResponse> {
    if input.attendances.is_empty() {
        return Err(AppError::BadRequest("attendances must not be empty".into()));
    }

    let updated =
        session::mark_attendance(state.sessions.as_ref(), id, &input.attendances).await?;

    tracing::debug!(
        session_id = id,
        user_id = staff.user_id,
        role = %staff.role,
        "Attendance marked via API",
    );

    Ok(Json(DataResponse { data: updated }))
}

/// PUT /api/v1/class-sessions/{id}/assign-teacher
pub async fn assign_teacher(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<AssignTeacherRequest>,
) -> AppResult<impl IntoResponse> {
    let updated = session::assign_teacher(state.sessions.as_ref(), id, input.teacher_id).await?;

    Ok(Json(DataResponse { data: updated }))
}

// ---------------------------------------------------------------------------
// Bulk operations
// ---------------------------------------------------------------------------

/// POST /api/v1/class-sessions/bulk-delete
///
/// Ids are processed one at a time; the response lists which succeeded and
/// why the others failed.
pub async fn bulk_delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<BulkDeleteRequest>,
) -> AppResult<impl IntoResponse> {
    let outcome = session::bulk_delete(state.sessions.as_ref(), &input.ids).await?;

    tracing::info!(
        user_id = admin.user_id,
        requested = input.ids.len(),
        failed = outcome.failed.len(),
        "Bulk delete via API",
    );

    Ok(Json(DataResponse { data: outcome }))
}

/// POST /api/v1/class-sessions/bulk-assign-teacher
pub async fn bulk_assign_teacher(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<BulkAssignTeacherRequest>,
) -> AppResult<impl IntoResponse> {
    let outcome =
        session::bulk_assign_teacher(state.sessions.as_ref(), &input.ids, input.teacher_id)
            .await?;

    tracing::info!(
        user_id = admin.user_id,
        teacher_id = input.teacher_id,
        requested = input.ids.len(),
        failed = outcome.failed.len(),
        "Bulk teacher assignment via API",
    );

    Ok(Json(DataResponse { data: outcome }))
}
