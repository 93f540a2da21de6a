use gymdesk_core::error::CoreError;
use gymdesk_core::types::DbId;
use serde::Deserialize;

/// Errors from the gymdesk API client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (network, DNS, TLS, decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server returned a non-2xx status code.
    #[error("gymdesk API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The endpoint needs a signed-in session and there is none.
    #[error("Not signed in")]
    Unauthenticated,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl ClientError {
    /// HTTP status of an API error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The server's `error` message, falling back to the raw body.
    pub fn message(&self) -> String {
        match self {
            ClientError::Api { body, .. } => serde_json::from_str::<ErrorBody>(body)
                .map(|b| b.error)
                .unwrap_or_else(|_| body.clone()),
            other => other.to_string(),
        }
    }

    /// Map onto the domain error a store implementation must return.
    ///
    /// `subject` names the entity a 404 refers to; without it a 404 is a
    /// storage failure.
    pub fn into_core(self, subject: Option<(&'static str, DbId)>) -> CoreError {
        match (self.status(), subject) {
            (Some(404), Some((entity, id))) => CoreError::NotFound { entity, id },
            (Some(400), _) => CoreError::Validation(self.message()),
            (Some(401), _) => CoreError::Unauthorized(self.message()),
            (Some(403), _) => CoreError::Forbidden(self.message()),
            (Some(409), _) => CoreError::Conflict(self.message()),
            _ if matches!(self, ClientError::Unauthenticated) => {
                CoreError::Unauthorized(self.to_string())
            }
            _ => CoreError::Storage(self.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn api(status: u16, body: &str) -> ClientError {
        ClientError::Api {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn message_prefers_error_field() {
        let body = r#"{"error":"month must be between 1 and 12, got 13","code":"VALIDATION_ERROR"}"#;
        let err = api(400, body);
        assert_eq!(err.message(), "month must be between 1 and 12, got 13");
        assert_eq!(api(500, "boom").message(), "boom");
    }

    #[test]
    fn statuses_map_to_core_errors() {
        assert_matches!(
            api(404, "{}").into_core(Some(("Schedule", 3))),
            CoreError::NotFound { entity: "Schedule", id: 3 }
        );
        assert_matches!(api(404, "{}").into_core(None), CoreError::Storage(_));
        assert_matches!(api(400, "{}").into_core(None), CoreError::Validation(_));
        assert_matches!(api(401, "{}").into_core(None), CoreError::Unauthorized(_));
        assert_matches!(api(403, "{}").into_core(None), CoreError::Forbidden(_));
        assert_matches!(api(502, "{}").into_core(None), CoreError::Storage(_));
        assert_matches!(
            ClientError::Unauthenticated.into_core(None),
            CoreError::Unauthorized(_)
        );
    }
}
