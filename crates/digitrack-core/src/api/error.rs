use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("Unauthorized - session may be expired")]
    Unauthorized,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Failed to persist session: {0}")]
    Storage(anyhow::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// FastAPI error payloads carry the human-readable message under `detail`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

impl ApiError {
    /// Pull the `detail` string out of an error body, falling back to the
    /// truncated raw body.
    fn detail(body: &str) -> String {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) => parsed.detail,
            Err(_) => Self::truncate_body(body),
        }
    }

    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..MAX_ERROR_BODY_LENGTH],
                body.len()
            )
        }
    }

    /// Map a non-2xx response on a data endpoint to an error variant.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(Self::detail(body)),
            404 => ApiError::NotFound(Self::detail(body)),
            400 | 422 => ApiError::Validation(Self::detail(body)),
            500..=599 => ApiError::ServerError(Self::detail(body)),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, Self::detail(body))),
        }
    }

    /// Same mapping for the login endpoint, where 401 means the
    /// credentials were wrong rather than a stale token.
    pub fn from_login_status(status: reqwest::StatusCode, body: &str) -> Self {
        if status.as_u16() == 401 {
            ApiError::InvalidCredentials
        } else {
            Self::from_status(status, body)
        }
    }

    /// Whether this error means the current session is no longer accepted
    /// by the server.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Unauthorized | ApiError::InvalidCredentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn login_401_is_invalid_credentials() {
        let err = ApiError::from_login_status(
            StatusCode::UNAUTHORIZED,
            r#"{"detail": "Incorrect email or password"}"#,
        );
        assert!(matches!(err, ApiError::InvalidCredentials));
        assert!(err.is_auth_failure());
    }

    #[test]
    fn data_401_is_unauthorized() {
        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, "");
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[test]
    fn detail_is_extracted_from_fastapi_body() {
        let err = ApiError::from_status(
            StatusCode::FORBIDDEN,
            r#"{"detail": "The user doesn't have enough privileges"}"#,
        );
        match err {
            ApiError::AccessDenied(msg) => {
                assert_eq!(msg, "The user doesn't have enough privileges")
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn oversized_body_is_truncated() {
        let body = "x".repeat(2000);
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, &body);
        match err {
            ApiError::ServerError(msg) => assert!(msg.contains("truncated")),
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
