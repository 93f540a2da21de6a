//! HTTP-level tests for class sessions, attendance, teachers and bulk actions.

mod common;

use axum::http::StatusCode;
use axum::Router;
use common::{
    admin_token, body_json, delete_auth, get_auth, post_json_auth, put_json_auth, teacher_token,
};
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn create_session(app: Router, day: u32, month: u32, year: i32) -> i64 {
    let body = json!({
        "day": day,
        "month": month,
        "year": year,
        "start_time": "10:00",
        "end_time": "11:00",
    });
    let response = post_json_auth(app, "/api/v1/class-sessions", body, &admin_token()).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

async fn fetch(app: Router, id: i64) -> Value {
    let response = get_auth(app, &format!("/api/v1/class-sessions/{id}"), &admin_token()).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"].clone()
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

#[tokio::test]
async fn impossible_date_is_rejected() {
    let app = common::build_test_app();
    let body = json!({"day": 29, "month": 2, "year": 2023});
    let response = post_json_auth(app, "/api/v1/class-sessions", body, &admin_token()).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_filters_by_month_and_year() {
    let app = common::build_test_app();
    create_session(app.clone(), 10, 3, 2025).await;
    create_session(app.clone(), 2, 3, 2025).await;
    create_session(app.clone(), 2, 4, 2025).await;

    let response = get_auth(
        app.clone(),
        "/api/v1/class-sessions?month=3&year=2025",
        &admin_token(),
    )
    .await;
    let json = body_json(response).await;
    let days: Vec<u64> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["day"].as_u64().unwrap())
        .collect();
    assert_eq!(days, vec![2, 10]);

    let response = get_auth(app, "/api/v1/class-sessions?month=13", &admin_token()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn by_month_groups_oldest_first() {
    let app = common::build_test_app();
    create_session(app.clone(), 5, 1, 2025).await;
    create_session(app.clone(), 20, 12, 2024).await;

    let response = get_auth(app, "/api/v1/class-sessions/by-month", &admin_token()).await;
    let json = body_json(response).await;
    let groups = json["data"].as_array().unwrap();

    assert_eq!(groups.len(), 2);
    assert_eq!((groups[0]["year"].as_i64(), groups[0]["month"].as_u64()), (Some(2024), Some(12)));
    assert_eq!(groups[1]["sessions"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn update_merges_and_can_clear_times() {
    let app = common::build_test_app();
    let id = create_session(app.clone(), 5, 3, 2025).await;

    let response = put_json_auth(
        app.clone(),
        &format!("/api/v1/class-sessions/{id}"),
        json!({"day": 6, "end_time": ""}),
        &admin_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let session = fetch(app, id).await;
    assert_eq!(session["day"], 6);
    assert_eq!(session["start_time"], "10:00");
    assert_eq!(session["end_time"], Value::Null);
}

#[tokio::test]
async fn delete_then_get_is_404() {
    let app = common::build_test_app();
    let id = create_session(app.clone(), 5, 3, 2025).await;

    let uri = format!("/api/v1/class-sessions/{id}");
    let response = delete_auth(app.clone(), &uri, &admin_token()).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(app.clone(), &uri, &admin_token()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete_auth(app, &uri, &admin_token()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Attendance and teachers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn attendance_is_upserted_per_user() {
    let app = common::build_test_app();
    let id = create_session(app.clone(), 5, 3, 2025).await;
    let uri = format!("/api/v1/class-sessions/{id}/attendance");

    let first = json!({"attendances": [
        {"user_id": 1, "status": "present"},
        {"user_id": 2, "status": "present"},
    ]});
    put_json_auth(app.clone(), &uri, first, &admin_token()).await;

    let second = json!({"attendances": [{"user_id": 2, "status": "absent"}]});
    let response = put_json_auth(app, &uri, second, &admin_token()).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(
        json["data"]["attendances"],
        json!([
            {"user_id": 1, "status": "present"},
            {"user_id": 2, "status": "absent"},
        ])
    );
}

#[tokio::test]
async fn empty_attendance_list_is_a_bad_request() {
    let app = common::build_test_app();
    let id = create_session(app.clone(), 5, 3, 2025).await;

    let response = put_json_auth(
        app,
        &format!("/api/v1/class-sessions/{id}/attendance"),
        json!({"attendances": []}),
        &teacher_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

async fn history_ids(app: Router, user_id: i64) -> Vec<i64> {
    let uri = format!("/api/v1/class-sessions/user/{user_id}");
    let response = get_auth(app, &uri, &teacher_token()).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn attendance_history_lists_only_the_users_sessions() {
    let app = common::build_test_app();
    let later = create_session(app.clone(), 20, 3, 2025).await;
    let earlier = create_session(app.clone(), 5, 3, 2025).await;
    let other = create_session(app.clone(), 12, 3, 2025).await;

    let mark = |user_id: i64, status: &str| {
        json!({"attendances": [{"user_id": user_id, "status": status}]})
    };
    for (id, body) in [
        (later, mark(31, "present")),
        (earlier, mark(31, "absent")),
        (other, mark(32, "present")),
    ] {
        let uri = format!("/api/v1/class-sessions/{id}/attendance");
        let response = put_json_auth(app.clone(), &uri, body, &admin_token()).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(history_ids(app.clone(), 31).await, vec![earlier, later]);
    assert_eq!(history_ids(app.clone(), 32).await, vec![other]);
    assert!(history_ids(app.clone(), 33).await.is_empty());

    let response = common::get(app, "/api/v1/class-sessions/user/31").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn assigning_a_teacher_twice_keeps_one_entry() {
    let app = common::build_test_app();
    let id = create_session(app.clone(), 5, 3, 2025).await;
    let uri = format!("/api/v1/class-sessions/{id}/assign-teacher");

    put_json_auth(app.clone(), &uri, json!({"teacher_id": 9}), &admin_token()).await;
    put_json_auth(app.clone(), &uri, json!({"teacher_id": 9}), &admin_token()).await;

    assert_eq!(fetch(app, id).await["teachers"], json!([9]));
}

// ---------------------------------------------------------------------------
// Bulk operations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bulk_delete_reports_per_id_outcome() {
    let app = common::build_test_app();
    let a = create_session(app.clone(), 1, 3, 2025).await;
    let b = create_session(app.clone(), 2, 3, 2025).await;

    let response = post_json_auth(
        app,
        "/api/v1/class-sessions/bulk-delete",
        json!({"ids": [a, 404, b]}),
        &admin_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["succeeded"], json!([a, b]));
    assert_eq!(json["data"]["failed"][0]["id"], 404);
}

#[tokio::test]
async fn bulk_assign_teacher_assigns_every_session() {
    let app = common::build_test_app();
    let a = create_session(app.clone(), 1, 3, 2025).await;
    let b = create_session(app.clone(), 2, 3, 2025).await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/class-sessions/bulk-assign-teacher",
        json!({"ids": [a, b], "teacher_id": 5}),
        &admin_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(fetch(app.clone(), a).await["teachers"], json!([5]));
    assert_eq!(fetch(app, b).await["teachers"], json!([5]));
}

#[tokio::test]
async fn bulk_actions_reject_empty_ids() {
    let app = common::build_test_app();
    let response = post_json_auth(
        app,
        "/api/v1/class-sessions/bulk-delete",
        json!({"ids": []}),
        &admin_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
