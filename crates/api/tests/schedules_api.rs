//! HTTP-level tests for schedule lifecycle endpoints.

mod common;

use axum::http::StatusCode;
use common::{admin_token, body_json, create_schedule, delete_auth, get_auth, post_json_auth};
use serde_json::json;

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_returns_sorted_days_and_201() {
    let app = common::build_test_app();
    let body = json!({
        "name": "  Evening HIIT ",
        "days_of_week": [5, 1, 3],
        "start_time": "18:00",
        "end_time": "19:00",
    });
    let response = post_json_auth(app, "/api/v1/schedules", body, &admin_token()).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["days_of_week"], json!([1, 3, 5]));
    assert_eq!(json["data"]["name"], "Evening HIIT");
    assert_eq!(json["data"]["start_time"], "18:00");
}

#[tokio::test]
async fn end_before_start_is_a_validation_error() {
    let app = common::build_test_app();
    let body = json!({
        "days_of_week": [1],
        "start_time": "09:00",
        "end_time": "08:00",
    });
    let response = post_json_auth(app.clone(), "/api/v1/schedules", body, &admin_token()).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let list = get_auth(app, "/api/v1/schedules", &admin_token()).await;
    assert_eq!(body_json(list).await["data"], json!([]));
}

#[tokio::test]
async fn bad_days_are_validation_errors() {
    let app = common::build_test_app();
    for days in [json!([]), json!([1, 1]), json!([7])] {
        let body = json!({
            "days_of_week": days,
            "start_time": "09:00",
            "end_time": "10:00",
        });
        let response =
            post_json_auth(app.clone(), "/api/v1/schedules", body, &admin_token()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "days {days}");
    }
}

#[tokio::test]
async fn malformed_time_is_a_validation_error() {
    let app = common::build_test_app();
    let body = json!({
        "days_of_week": [2],
        "start_time": "9:00",
        "end_time": "10:00",
    });
    let response = post_json_auth(app, "/api/v1/schedules", body, &admin_token()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Read and delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_list_and_delete() {
    let app = common::build_test_app();
    let first = create_schedule(app.clone(), &[1], "07:00", "08:00").await;
    let second = create_schedule(app.clone(), &[2, 4], "12:00", "13:00").await;

    let list = body_json(get_auth(app.clone(), "/api/v1/schedules", &admin_token()).await).await;
    let ids: Vec<i64> = list["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![first, second]);

    let uri = format!("/api/v1/schedules/{second}");
    let response = get_auth(app.clone(), &uri, &admin_token()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["days_of_week"], json!([2, 4]));

    let uri = format!("/api/v1/schedules/{first}");
    let response = delete_auth(app.clone(), &uri, &admin_token()).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(app, &format!("/api/v1/schedules/{first}"), &admin_token()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_missing_schedule_is_404() {
    let app = common::build_test_app();
    let response = delete_auth(app, "/api/v1/schedules/77", &admin_token()).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Schedule with id 77 not found");
}
