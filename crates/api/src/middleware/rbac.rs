//! Role gates layered on [`AuthUser`].
//!
//! A handler that takes `RequireAdmin(user)` or `RequireStaff(user)` never
//! runs for a caller without the role; the request is answered with 403.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use gymdesk_core::error::CoreError;
use gymdesk_core::roles::{ROLE_ADMIN, ROLE_TEACHER};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Roles allowed to mark attendance.
const STAFF_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_TEACHER];

/// Authenticate, then demand one of `allowed`.
async fn authorize(
    parts: &mut Parts,
    state: &AppState,
    allowed: &[&str],
    denial: &str,
) -> Result<AuthUser, AppError> {
    let user = AuthUser::from_request_parts(parts, state).await?;
    if !allowed.contains(&user.role.as_str()) {
        tracing::debug!(user_id = user.user_id, role = %user.role, "Role check failed");
        return Err(AppError::Core(CoreError::Forbidden(denial.to_string())));
    }
    Ok(user)
}

/// Admin only: schedules, generation, session edits, bulk actions.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorize(parts, state, &[ROLE_ADMIN], "Admin role required")
            .await
            .map(RequireAdmin)
    }
}

/// Admin or teacher.
pub struct RequireStaff(pub AuthUser);

impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorize(parts, state, STAFF_ROLES, "Admin or teacher role required")
            .await
            .map(RequireStaff)
    }
}
