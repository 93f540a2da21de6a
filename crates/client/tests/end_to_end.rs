//! Client against a real server bound to a local port.

use std::sync::Arc;

use assert_matches::assert_matches;
use gymdesk_api::auth::jwt::{generate_access_token, JwtConfig};
use gymdesk_api::config::{LogFormat, ServerConfig, StorageBackend};
use gymdesk_api::router::build_app_router;
use gymdesk_api::state::AppState;
use gymdesk_client::{ApiClient, AuthSession, ClientError};
use gymdesk_core::error::CoreError;
use gymdesk_core::generation::{GenerationOptions, GenerationRequest, Generator};
use gymdesk_core::memory::InMemoryStore;
use gymdesk_core::roles::{ROLE_ADMIN, ROLE_TEACHER};
use gymdesk_core::schedule::NewSchedule;
use gymdesk_core::session::{Attendance, AttendanceStatus, SessionFilter};
use gymdesk_core::store::{ScheduleStore, SessionStore};
use tokio::net::TcpListener;

const SECRET: &str = "gymdesk-client-secret";

fn jwt() -> JwtConfig {
    JwtConfig {
        secret: SECRET.to_string(),
        access_token_expiry_mins: 15,
    }
}

/// Serve a fresh in-memory backend and return its `/api/v1` base URL.
async fn spawn_server() -> String {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".parse().unwrap()],
        request_timeout_secs: 30,
        storage: StorageBackend::Memory,
        jwt: jwt(),
        generation: GenerationOptions::default(),
        log_format: LogFormat::Pretty,
    };
    let store = Arc::new(InMemoryStore::new());
    let state = AppState {
        schedules: store.clone(),
        sessions: store,
        config: Arc::new(config.clone()),
    };
    let app = build_app_router(state, &config);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}/api/v1")
}

fn session(user_id: i64, role: &str) -> AuthSession {
    AuthSession {
        token: generate_access_token(user_id, role, &jwt()).unwrap(),
        role: role.to_string(),
    }
}

fn mondays() -> NewSchedule {
    NewSchedule {
        name: Some("Monday mobility".into()),
        days_of_week: vec![1],
        start_time: "18:00".into(),
        end_time: "19:00".into(),
    }
}

#[tokio::test]
async fn health_needs_no_session() {
    let client = ApiClient::new(spawn_server().await);

    let health = client.health().await.unwrap();
    assert_eq!(health.status, "ok");
    assert!(health.storage_healthy);
}

#[tokio::test]
async fn signed_out_client_is_refused_locally() {
    let mut client = ApiClient::new(spawn_server().await);
    assert_matches!(client.list_schedules().await, Err(ClientError::Unauthenticated));

    client.sign_in(session(1, ROLE_ADMIN));
    assert!(client.list_schedules().await.unwrap().is_empty());

    client.sign_out();
    assert_matches!(client.list_schedules().await, Err(ClientError::Unauthenticated));
}

#[tokio::test]
async fn teacher_cannot_create_schedules() {
    let mut client = ApiClient::new(spawn_server().await);
    client.sign_in(session(2, ROLE_TEACHER));

    let err = client.create_schedule(&mondays()).await.unwrap_err();
    assert_eq!(err.status(), Some(403));
}

#[tokio::test]
async fn server_side_generation_round_trip() {
    let mut client = ApiClient::new(spawn_server().await);
    client.sign_in(session(1, ROLE_ADMIN));

    let schedule = client.create_schedule(&mondays()).await.unwrap();
    let summary = client
        .generate(&GenerationRequest::Month {
            schedule_id: schedule.id,
            month: 1,
            year: 2025,
            skip_existing: None,
        })
        .await
        .unwrap();
    assert_eq!(summary.total_created, 4);

    let sessions = client
        .list_sessions(&SessionFilter::for_month(1, 2025))
        .await
        .unwrap();
    let days: Vec<u32> = sessions.iter().map(|s| s.day).collect();
    assert_eq!(days, vec![6, 13, 20, 27]);

    let groups = client
        .sessions_by_month(&SessionFilter::default())
        .await
        .unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].sessions.len(), 4);

    let marked = client
        .mark_attendance(
            sessions[0].id,
            &[Attendance {
                user_id: 42,
                status: AttendanceStatus::Present,
            }],
        )
        .await
        .unwrap();
    assert_eq!(marked.attendances.len(), 1);

    let history = client.sessions_for_user(42).await.unwrap();
    assert_eq!(history.iter().map(|s| s.id).collect::<Vec<_>>(), vec![sessions[0].id]);

    let ids: Vec<i64> = sessions.iter().map(|s| s.id).collect();
    let outcome = client.bulk_assign_teacher(&ids, 2).await.unwrap();
    assert_eq!(outcome.succeeded.len(), 4);
    assert!(outcome.failed.is_empty());
}

#[tokio::test]
async fn validation_errors_carry_the_server_message() {
    let mut client = ApiClient::new(spawn_server().await);
    client.sign_in(session(1, ROLE_ADMIN));

    let mut input = mondays();
    input.end_time = "17:00".into();
    let err = client.create_schedule(&input).await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert_matches!(err.into_core(None), CoreError::Validation(_));
}

#[tokio::test]
async fn generator_runs_against_remote_stores() {
    let mut client = ApiClient::new(spawn_server().await);
    client.sign_in(session(1, ROLE_ADMIN));
    let client = Arc::new(client);

    let schedule = ScheduleStore::create(client.as_ref(), &mondays())
        .await
        .unwrap();
    let generator = Generator::new(
        client.clone(),
        client.clone(),
        GenerationOptions {
            skip_existing: true,
            ..GenerationOptions::default()
        },
    );

    let first = generator.generate_month(schedule.id, 2, 2025).await.unwrap();
    assert_eq!(first.total_created, 4);

    let again = generator.generate_month(schedule.id, 2, 2025).await.unwrap();
    assert_eq!(again.total_created, 0);
    assert_eq!(again.total_skipped, 4);

    assert!(SessionStore::find_by_id(client.as_ref(), 9_999)
        .await
        .unwrap()
        .is_none());
    assert_matches!(
        SessionStore::delete(client.as_ref(), 9_999).await,
        Err(CoreError::NotFound { entity: "ClassSession", id: 9_999 })
    );
    SessionStore::ping(client.as_ref()).await.unwrap();
}
