//! Handlers for weekly schedules and session generation.
//!
//! Schedules can be read by any authenticated user; creating, deleting and
//! generating sessions from them requires the admin role.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use gymdesk_core::generation::GenerationRequest;
use gymdesk_core::schedule::{self, NewSchedule};
use gymdesk_core::types::DbId;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Schedule lifecycle
// ---------------------------------------------------------------------------

/// GET /api/v1/schedules
pub async fn list_schedules(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let schedules = schedule::list_schedules(state.schedules.as_ref()).await?;

    Ok(Json(DataResponse { data: schedules }))
}

/// POST /api/v1/schedules
///
/// Create a weekly schedule. Days are sorted; duplicates are rejected.
pub async fn create_schedule(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<NewSchedule>,
) -> AppResult<impl IntoResponse> {
    let created = schedule::create_schedule(state.schedules.as_ref(), input).await?;

    tracing::info!(
        schedule_id = created.id,
        user_id = admin.user_id,
        "Schedule created via API"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// GET /api/v1/schedules/{id}
pub async fn get_schedule(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let found = schedule::get_schedule(state.schedules.as_ref(), id).await?;

    Ok(Json(DataResponse { data: found }))
}

/// DELETE /api/v1/schedules/{id}
///
/// Sessions generated from the schedule are kept.
pub async fn delete_schedule(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    schedule::delete_schedule(state.schedules.as_ref(), id).await?;

    tracing::info!(schedule_id = id, user_id = admin.user_id, "Schedule deleted via API");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// POST /api/v1/schedules/generate
///
/// Generate sessions for one month (`"kind": "month"`) or a range of months
/// (`"kind": "range"`). Runs to completion before responding; a failure
/// part-way returns 502 naming the month that failed.
pub async fn generate_sessions(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(request): Json<GenerationRequest>,
) -> AppResult<impl IntoResponse> {
    tracing::info!(
        schedule_id = request.schedule_id(),
        user_id = admin.user_id,
        request = ?request,
        "Generation requested",
    );

    let summary = state.generator().run(&request).await?;

    Ok(Json(DataResponse { data: summary }))
}
