use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::class_sessions;
use crate::state::AppState;

/// Class session routes mounted at `/class-sessions`.
///
/// ```text
/// GET    /                       -> list_sessions
/// POST   /                       -> create_session (admin)
/// GET    /by-month               -> list_sessions_by_month
/// POST   /bulk-delete            -> bulk_delete (admin)
/// POST   /bulk-assign-teacher    -> bulk_assign_teacher (admin)
/// GET    /user/{user_id}         -> list_sessions_for_user
/// GET    /{id}                   -> get_session
/// PUT    /{id}                   -> update_session (admin)
/// DELETE /{id}                   -> delete_session (admin)
/// PUT    /{id}/attendance        -> mark_attendance (admin, teacher)
/// PUT    /{id}/assign-teacher    -> assign_teacher (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(class_sessions::list_sessions).post(class_sessions::create_session),
        )
        .route("/by-month", get(class_sessions::list_sessions_by_month))
        .route("/bulk-delete", post(class_sessions::bulk_delete))
        .route(
            "/bulk-assign-teacher",
            post(class_sessions::bulk_assign_teacher),
        )
        .route(
            "/user/{user_id}",
            get(class_sessions::list_sessions_for_user),
        )
        .route(
            "/{id}",
            get(class_sessions::get_session)
                .put(class_sessions::update_session)
                .delete(class_sessions::delete_session),
        )
        .route("/{id}/attendance", put(class_sessions::mark_attendance))
        .route("/{id}/assign-teacher", put(class_sessions::assign_teacher))
}
