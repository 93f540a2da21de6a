#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use gymdesk_api::auth::jwt::{generate_access_token, JwtConfig};
use gymdesk_api::config::{LogFormat, ServerConfig, StorageBackend};
use gymdesk_api::router::build_app_router;
use gymdesk_api::state::AppState;
use gymdesk_core::generation::GenerationOptions;
use gymdesk_core::memory::InMemoryStore;
use gymdesk_core::roles::{ROLE_ADMIN, ROLE_TEACHER};
use gymdesk_core::store::{ScheduleStore, SessionStore};
use http_body_util::BodyExt;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "gymdesk-integration-secret";

/// Build a test `ServerConfig` backed by the in-memory store.
pub fn test_config(generation: GenerationOptions) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".parse().unwrap()],
        request_timeout_secs: 30,
        storage: StorageBackend::Memory,
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            access_token_expiry_mins: 15,
        },
        generation,
        log_format: LogFormat::Pretty,
    }
}

/// Full application router over a fresh in-memory store with default
/// generation options.
pub fn build_test_app() -> Router {
    build_test_app_with(GenerationOptions::default())
}

pub fn build_test_app_with(generation: GenerationOptions) -> Router {
    let store = Arc::new(InMemoryStore::new());
    build_test_app_over(store.clone(), store, generation)
}

/// Full application router over arbitrary stores.
pub fn build_test_app_over(
    schedules: Arc<dyn ScheduleStore>,
    sessions: Arc<dyn SessionStore>,
    generation: GenerationOptions,
) -> Router {
    build_test_app_from(test_config(generation), schedules, sessions)
}

/// Full application router over arbitrary stores and config.
pub fn build_test_app_from(
    config: ServerConfig,
    schedules: Arc<dyn ScheduleStore>,
    sessions: Arc<dyn SessionStore>,
) -> Router {
    let state = AppState {
        schedules,
        sessions,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

fn token(user_id: i64, role: &str) -> String {
    let config = JwtConfig {
        secret: TEST_SECRET.to_string(),
        access_token_expiry_mins: 15,
    };
    generate_access_token(user_id, role, &config).unwrap()
}

pub fn admin_token() -> String {
    token(1, ROLE_ADMIN)
}

pub fn teacher_token() -> String {
    token(2, ROLE_TEACHER)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create a schedule as admin and return its id.
pub async fn create_schedule(app: Router, days: &[i16], start: &str, end: &str) -> i64 {
    let body = serde_json::json!({
        "name": "Test class",
        "days_of_week": days,
        "start_time": start,
        "end_time": end,
    });
    let response = post_json_auth(app, "/api/v1/schedules", body, &admin_token()).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}
