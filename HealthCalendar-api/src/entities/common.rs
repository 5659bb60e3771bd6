use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use health_calendar_domain::services::{
    CalendarError, ProfileServiceError, ReminderServiceError, UserServiceError,
};

/// Error response format for API
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error type/code - machine-readable identifier
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    fn new(error: &str, message: impl Into<String>) -> Self {
        Self {
            error: error.to_string(),
            message: message.into(),
            details: None,
        }
    }

    /// Create a not found error response
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("not_found", message)
    }

    /// Create a validation error response
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("validation_error", message)
    }

    /// Create a bad request error response
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("bad_request", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("unauthorized", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("conflict", message)
    }

    /// Profile lacks the fields an operation needs
    pub fn profile_incomplete(message: impl Into<String>, missing: &[&str]) -> Self {
        Self {
            details: Some(serde_json::json!({ "missing": missing })),
            ..Self::new("profile_incomplete", message)
        }
    }

    /// Create an internal error response; the cause is logged, not returned
    pub fn internal_error(cause: impl std::fmt::Display) -> Self {
        error!("Internal error: {}", cause);
        Self::new("internal_error", "An unexpected error occurred")
    }

    /// HTTP status for this error code
    pub fn status(&self) -> StatusCode {
        match self.error.as_str() {
            "validation_error" | "bad_request" => StatusCode::BAD_REQUEST,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "not_found" => StatusCode::NOT_FOUND,
            "conflict" => StatusCode::CONFLICT,
            "profile_incomplete" => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<UserServiceError> for ErrorResponse {
    fn from(err: UserServiceError) -> Self {
        match err {
            UserServiceError::ValidationError(msg) => Self::validation_error(msg),
            UserServiceError::Conflict(msg) => Self::conflict(msg),
            UserServiceError::InvalidCredentials => Self::unauthorized("Invalid email or password"),
            UserServiceError::Unauthorized(msg) => Self::unauthorized(msg),
            UserServiceError::NotFound(msg) => Self::not_found(msg),
            other => Self::internal_error(other),
        }
    }
}

impl From<ProfileServiceError> for ErrorResponse {
    fn from(err: ProfileServiceError) -> Self {
        match err {
            ProfileServiceError::ValidationError(msg) => Self::validation_error(msg),
            ProfileServiceError::NotFound(msg) => Self::not_found(msg),
            ProfileServiceError::ProfileIncomplete(msg) => Self::profile_incomplete(msg, &["age", "sex"]),
            other => Self::internal_error(other),
        }
    }
}

impl From<ReminderServiceError> for ErrorResponse {
    fn from(err: ReminderServiceError) -> Self {
        match err {
            ReminderServiceError::ValidationError(msg) => Self::validation_error(msg),
            ReminderServiceError::NotFound(msg) => Self::not_found(msg),
            other => Self::internal_error(other),
        }
    }
}

impl From<CalendarError> for ErrorResponse {
    fn from(err: CalendarError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<QueryRejection> for ErrorResponse {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ErrorResponse::validation_error("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorResponse::unauthorized("x").status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorResponse::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorResponse::conflict("x").status(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorResponse::profile_incomplete("x", &["age"]).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ErrorResponse::internal_error("boom").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_error_hides_cause() {
        let response = ErrorResponse::from(UserServiceError::RepositoryError("disk on fire".to_string()));
        assert_eq!(response.error, "internal_error");
        assert!(!response.message.contains("disk"));
    }

    #[test]
    fn test_profile_incomplete_lists_missing_fields() {
        let response = ErrorResponse::from(ProfileServiceError::ProfileIncomplete("complete it".to_string()));
        assert_eq!(response.details, Some(serde_json::json!({ "missing": ["age", "sex"] })));
    }
}
