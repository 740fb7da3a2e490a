//! HTTP error mapping.
//!
//! All errors leave the service as `{"detail": ...}` envelopes. The auth
//! taxonomy maps 401 for every authentication-class failure and 403 for
//! authorization denials; a subject that decodes cleanly but is missing from
//! the identity store gets the same 401 body as a malformed token, so a
//! caller cannot distinguish a forged token from a stale one.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::auth::AuthError;

/// Error envelope for route handlers: a status code plus a `detail` message.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }

    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, detail)
    }

    pub fn not_found(entity: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("{entity} not found"))
    }

    pub fn conflict(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, detail)
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, detail)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!("request failed: {err:#}");
        Self::internal("Internal server error")
    }
}

/// External status and body for each auth failure.
fn auth_error_parts(error: &AuthError) -> (StatusCode, &'static str) {
    match error {
        AuthError::Unauthenticated => (StatusCode::UNAUTHORIZED, "Not authenticated"),
        // Missing subject collapses into the generic invalid-token body
        AuthError::Malformed | AuthError::SubjectNotFound(_) => {
            (StatusCode::UNAUTHORIZED, "Invalid token")
        }
        AuthError::Expired => (StatusCode::UNAUTHORIZED, "Token expired"),
        AuthError::Revoked => (StatusCode::UNAUTHORIZED, "Token has been revoked"),
        AuthError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden"),
        AuthError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        if let AuthError::Internal(msg) = &error {
            tracing::error!("authentication infrastructure failure: {msg}");
        }
        let (status, detail) = auth_error_parts(&error);
        Self::new(status, detail)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response =
            (self.status, Json(json!({ "detail": self.detail }))).into_response();
        if self.status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Bearer"),
            );
        }
        response
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}
