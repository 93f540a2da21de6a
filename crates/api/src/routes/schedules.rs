use axum::routing::{get, post};
use axum::Router;

use crate::handlers::schedules;
use crate::state::AppState;

/// Schedule routes mounted at `/schedules`, except generation.
///
/// ```text
/// GET    /            -> list_schedules
/// POST   /            -> create_schedule (admin)
/// GET    /{id}        -> get_schedule
/// DELETE /{id}        -> delete_schedule (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(schedules::list_schedules).post(schedules::create_schedule),
        )
        .route(
            "/{id}",
            get(schedules::get_schedule).delete(schedules::delete_schedule),
        )
}

/// `POST /schedules/generate -> generate_sessions (admin)`.
///
/// Merged outside the request timeout; a range generation runs to the end.
pub fn generation_router() -> Router<AppState> {
    Router::new().route("/schedules/generate", post(schedules::generate_sessions))
}
