use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Kinds of authentication events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthEventType {
    /// Account created
    Registration,
    /// Successful login
    Login,
    /// Rejected login attempt
    FailedLogin,
    /// Refresh token exchanged
    TokenRefresh,
    /// Bearer token checked by the middleware
    TokenValidation,
}

impl std::fmt::Display for AuthEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthEventType::Registration => write!(f, "REGISTRATION"),
            AuthEventType::Login => write!(f, "LOGIN"),
            AuthEventType::FailedLogin => write!(f, "FAILED_LOGIN"),
            AuthEventType::TokenRefresh => write!(f, "TOKEN_REFRESH"),
            AuthEventType::TokenValidation => write!(f, "TOKEN_VALIDATION"),
        }
    }
}

/// Authentication event record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthEvent {
    pub event_type: AuthEventType,
    /// User ID, when known
    pub user_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    pub details: Option<String>,
    /// Request path for middleware events
    pub resource: Option<String>,
    /// Duration of the check in milliseconds
    pub duration_ms: Option<u64>,
    /// "password" or "jwt"
    pub auth_method: Option<String>,
}

impl AuthEvent {
    /// Create a new authentication event
    pub fn new(event_type: AuthEventType, user_id: Option<&str>, success: bool) -> Self {
        Self {
            event_type,
            user_id: user_id.map(String::from),
            timestamp: Utc::now(),
            success,
            details: None,
            resource: None,
            duration_ms: None,
            auth_method: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn with_auth_method(mut self, auth_method: impl Into<String>) -> Self {
        self.auth_method = Some(auth_method.into());
        self
    }
}

/// Log an authentication event.
///
/// Successes go out at info level and failures at warn level. Credentials and
/// tokens are never part of the record.
pub fn log_auth_event(event: AuthEvent) {
    let user_id = event.user_id.as_deref().unwrap_or("anonymous");
    let details = event.details.as_deref().unwrap_or("");
    let resource = event.resource.as_deref().unwrap_or("-");
    let method = event.auth_method.as_deref().unwrap_or("-");

    if event.success {
        info!(
            event = %event.event_type,
            user_id,
            resource,
            method,
            duration_ms = event.duration_ms,
            "AUTH-LOG [{}] [{}] [SUCCESS] {}",
            event.event_type,
            user_id,
            details
        );
    } else {
        warn!(
            event = %event.event_type,
            user_id,
            resource,
            method,
            duration_ms = event.duration_ms,
            "AUTH-LOG [{}] [{}] [FAILURE] {}",
            event.event_type,
            user_id,
            details
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_auth_event() {
        let event = AuthEvent::new(AuthEventType::TokenValidation, Some("user123"), false)
            .with_details("Missing Authorization header")
            .with_resource("/api/v1/profile")
            .with_duration(3)
            .with_auth_method("jwt");

        assert_eq!(event.event_type, AuthEventType::TokenValidation);
        assert_eq!(event.user_id.as_deref(), Some("user123"));
        assert!(!event.success);
        assert_eq!(event.details.as_deref(), Some("Missing Authorization header"));
        assert_eq!(event.resource.as_deref(), Some("/api/v1/profile"));
        assert_eq!(event.duration_ms, Some(3));
        assert_eq!(event.auth_method.as_deref(), Some("jwt"));

        // Logging must not panic for either outcome
        log_auth_event(event);
        log_auth_event(AuthEvent::new(AuthEventType::Login, None, true));
    }

    #[test]
    fn test_event_type_display() {
        assert_eq!(AuthEventType::Registration.to_string(), "REGISTRATION");
        assert_eq!(AuthEventType::FailedLogin.to_string(), "FAILED_LOGIN");
        assert_eq!(AuthEventType::TokenRefresh.to_string(), "TOKEN_REFRESH");
    }
}
