//! Mapping from service errors to HTTP responses.

use crate::project::domain::ProjectDomainError;
use crate::project::services::ProjectServiceError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Error response rendered as `{"error": {"code": ..., "message": ...}}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    error: ErrorBody<'a>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: &'a str,
}

impl ApiError {
    /// Creates an error response.
    #[must_use]
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// Rejects a request body or query string that could not be decoded.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message)
    }

    /// Returns the HTTP status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }
}

impl From<ProjectServiceError> for ApiError {
    fn from(err: ProjectServiceError) -> Self {
        match err {
            ProjectServiceError::Domain(ProjectDomainError::InvalidSlug(_)) => {
                Self::new(StatusCode::BAD_REQUEST, "INVALID_SLUG", err.to_string())
            }
            ProjectServiceError::Domain(_) => {
                Self::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", err.to_string())
            }
            ProjectServiceError::InvalidProjectId(_) => {
                Self::new(StatusCode::BAD_REQUEST, "INVALID_PROJECT_ID", err.to_string())
            }
            ProjectServiceError::AlreadyExists(_) => {
                Self::new(StatusCode::CONFLICT, "PROJECT_EXISTS", err.to_string())
            }
            ProjectServiceError::NotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, "PROJECT_NOT_FOUND", "project not found")
            }
            ProjectServiceError::Repository(_) => {
                tracing::error!(error = %err, "internal error in projects handler");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "internal server error",
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let envelope = ErrorEnvelope {
            error: ErrorBody {
                code: self.code,
                message: &self.message,
            },
        };
        (self.status, Json(envelope)).into_response()
    }
}
