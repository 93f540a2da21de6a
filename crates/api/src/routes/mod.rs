pub mod class_sessions;
pub mod health;
pub mod schedules;

use std::time::Duration;

use axum::http::StatusCode;
use axum::Router;
use tower_http::timeout::TimeoutLayer;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /schedules                                   list, create
/// /schedules/generate                          generate sessions (POST, no timeout)
/// /schedules/{id}                              get, delete
///
/// /class-sessions                              list, create
/// /class-sessions/by-month                     grouped list (GET)
/// /class-sessions/bulk-delete                  bulk delete (POST)
/// /class-sessions/bulk-assign-teacher          bulk teacher assignment (POST)
/// /class-sessions/user/{user_id}               attendance history (GET)
/// /class-sessions/{id}                         get, update, delete
/// /class-sessions/{id}/attendance              mark attendance (PUT)
/// /class-sessions/{id}/assign-teacher          assign teacher (PUT)
/// ```
///
/// Every route except generation answers 408 once `request_timeout` elapses.
/// A range generation may run up to `MAX_RANGE_MONTHS` months of inserts.
pub fn api_routes(request_timeout: Duration) -> Router<AppState> {
    Router::new()
        .nest("/schedules", schedules::router())
        .nest("/class-sessions", class_sessions::router())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .merge(schedules::generation_router())
}
