use gymdesk_core::generation::{GenerationRequest, GenerationSummary};
use gymdesk_core::schedule::{NewSchedule, Schedule};
use gymdesk_core::session::{
    BulkOutcome, ClassSession, MarkAttendance, MonthGroup, SessionDraft, SessionFilter,
    SessionPatch,
};
use gymdesk_core::types::DbId;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::ClientError;

/// Base URL used when `GYMDESK_API_URL` is not set.
pub const DEFAULT_API_URL: &str = "http://localhost:3000/api/v1";

/// An authenticated staff session: the bearer token and the role it carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub role: String,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub storage_healthy: bool,
}

#[derive(Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

/// HTTP client for one gymdesk API server.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    session: Option<AuthSession>,
}

impl ApiClient {
    /// Create a client for `base_url`, e.g. `http://host:3000/api/v1`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session: None,
        }
    }

    /// Create a client for `GYMDESK_API_URL`, or [`DEFAULT_API_URL`].
    pub fn from_env() -> Self {
        let base_url = std::env::var("GYMDESK_API_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ---- session ----

    /// Attach a session; later requests carry its bearer token.
    pub fn sign_in(&mut self, session: AuthSession) {
        tracing::debug!(role = %session.role, "Signed in");
        self.session = Some(session);
    }

    /// Drop the current session and return it.
    pub fn sign_out(&mut self) -> Option<AuthSession> {
        self.session.take()
    }

    pub fn session(&self) -> Option<&AuthSession> {
        self.session.as_ref()
    }

    /// Service health. Served at the server root, outside `/api/v1`, and
    /// needs no session.
    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        let root = self
            .base_url
            .strip_suffix("/api/v1")
            .unwrap_or(&self.base_url);
        let response = self.client.get(format!("{root}/health")).send().await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.json().await?)
    }

    // ---- schedules ----

    pub async fn list_schedules(&self) -> Result<Vec<Schedule>, ClientError> {
        let response = self.authed(Method::GET, "/schedules")?.send().await?;
        Self::parse_data(response).await
    }

    pub async fn create_schedule(&self, input: &NewSchedule) -> Result<Schedule, ClientError> {
        let response = self
            .authed(Method::POST, "/schedules")?
            .json(input)
            .send()
            .await?;
        Self::parse_data(response).await
    }

    pub async fn get_schedule(&self, id: DbId) -> Result<Schedule, ClientError> {
        let response = self
            .authed(Method::GET, &format!("/schedules/{id}"))?
            .send()
            .await?;
        Self::parse_data(response).await
    }

    pub async fn delete_schedule(&self, id: DbId) -> Result<(), ClientError> {
        let response = self
            .authed(Method::DELETE, &format!("/schedules/{id}"))?
            .send()
            .await?;
        Self::check_status(response).await
    }

    /// Run a generation request on the server.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationSummary, ClientError> {
        let response = self
            .authed(Method::POST, "/schedules/generate")?
            .json(request)
            .send()
            .await?;
        Self::parse_data(response).await
    }

    // ---- class sessions ----

    pub async fn list_sessions(
        &self,
        filter: &SessionFilter,
    ) -> Result<Vec<ClassSession>, ClientError> {
        let response = self
            .authed(Method::GET, "/class-sessions")?
            .query(filter)
            .send()
            .await?;
        Self::parse_data(response).await
    }

    pub async fn sessions_by_month(
        &self,
        filter: &SessionFilter,
    ) -> Result<Vec<MonthGroup>, ClientError> {
        let response = self
            .authed(Method::GET, "/class-sessions/by-month")?
            .query(filter)
            .send()
            .await?;
        Self::parse_data(response).await
    }

    /// Attendance history of one user.
    pub async fn sessions_for_user(&self, user_id: DbId) -> Result<Vec<ClassSession>, ClientError> {
        let response = self
            .authed(Method::GET, &format!("/class-sessions/user/{user_id}"))?
            .send()
            .await?;
        Self::parse_data(response).await
    }

    pub async fn create_session(&self, draft: &SessionDraft) -> Result<ClassSession, ClientError> {
        let response = self
            .authed(Method::POST, "/class-sessions")?
            .json(draft)
            .send()
            .await?;
        Self::parse_data(response).await
    }

    pub async fn get_session(&self, id: DbId) -> Result<ClassSession, ClientError> {
        let response = self
            .authed(Method::GET, &format!("/class-sessions/{id}"))?
            .send()
            .await?;
        Self::parse_data(response).await
    }

    pub async fn update_session(
        &self,
        id: DbId,
        patch: &SessionPatch,
    ) -> Result<ClassSession, ClientError> {
        let response = self
            .authed(Method::PUT, &format!("/class-sessions/{id}"))?
            .json(patch)
            .send()
            .await?;
        Self::parse_data(response).await
    }

    pub async fn delete_session(&self, id: DbId) -> Result<(), ClientError> {
        let response = self
            .authed(Method::DELETE, &format!("/class-sessions/{id}"))?
            .send()
            .await?;
        Self::check_status(response).await
    }

    pub async fn mark_attendance(
        &self,
        id: DbId,
        marks: &[MarkAttendance],
    ) -> Result<ClassSession, ClientError> {
        let response = self
            .authed(Method::PUT, &format!("/class-sessions/{id}/attendance"))?
            .json(&json!({ "attendances": marks }))
            .send()
            .await?;
        Self::parse_data(response).await
    }

    pub async fn assign_teacher(
        &self,
        id: DbId,
        teacher_id: DbId,
    ) -> Result<ClassSession, ClientError> {
        let response = self
            .authed(Method::PUT, &format!("/class-sessions/{id}/assign-teacher"))?
            .json(&json!({ "teacher_id": teacher_id }))
            .send()
            .await?;
        Self::parse_data(response).await
    }

    pub async fn bulk_delete(&self, ids: &[DbId]) -> Result<BulkOutcome, ClientError> {
        let response = self
            .authed(Method::POST, "/class-sessions/bulk-delete")?
            .json(&json!({ "ids": ids }))
            .send()
            .await?;
        Self::parse_data(response).await
    }

    pub async fn bulk_assign_teacher(
        &self,
        ids: &[DbId],
        teacher_id: DbId,
    ) -> Result<BulkOutcome, ClientError> {
        let response = self
            .authed(Method::POST, "/class-sessions/bulk-assign-teacher")?
            .json(&json!({ "ids": ids, "teacher_id": teacher_id }))
            .send()
            .await?;
        Self::parse_data(response).await
    }

    // ---- private helpers ----

    /// Start a request that needs the signed-in session's bearer token.
    fn authed(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder, ClientError> {
        let session = self.session.as_ref().ok_or(ClientError::Unauthenticated)?;
        Ok(self
            .client
            .request(method, format!("{}{path}", self.base_url))
            .bearer_auth(&session.token))
    }

    /// Ensure the response has a success status code, or turn it into a
    /// [`ClientError::Api`] with the body text.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::debug!(
                status = status.as_u16(),
                body = %body,
                "gymdesk API returned an error"
            );
            return Err(ClientError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful `{ "data": T }` response.
    async fn parse_data<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<DataEnvelope<T>>().await?.data)
    }

    /// Assert the response has a success status code, discarding the body.
    async fn check_status(response: reqwest::Response) -> Result<(), ClientError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}
