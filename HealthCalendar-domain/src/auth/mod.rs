//! Authentication for the Health Calendar API
//!
//! Bearer JWT middleware for protected routes plus the security headers
//! applied to every response.

#[cfg(feature = "with-axum")]
use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
#[cfg(feature = "with-axum")]
use std::sync::Arc;
#[cfg(feature = "with-axum")]
use tracing::debug;
use uuid::Uuid;

pub mod logging;
pub mod token;

#[cfg(feature = "with-axum")]
use logging::{log_auth_event, AuthEvent, AuthEventType};
use token::TokenType;
#[cfg(feature = "with-axum")]
use token::TokenService;

/// Claims carried by issued tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Issuer
    pub iss: String,
    /// Issued at (as timestamp)
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Access or refresh
    pub token_type: TokenType,
}

/// Caller identity placed in request extensions by [`auth_middleware`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

#[cfg(feature = "with-axum")]
fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": "unauthorized",
            "message": message,
        })),
    )
        .into_response()
}

/// Authentication middleware for protected routes.
///
/// Accepts only access tokens; the caller is exposed to handlers as an
/// [`AuthenticatedUser`] extension.
#[cfg(feature = "with-axum")]
pub async fn auth_middleware(
    State(tokens): State<Arc<TokenService>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let request_path = req.uri().path().to_string();
    let start_time = std::time::Instant::now();

    let reject = |details: &str, user_id: Option<&str>| {
        log_auth_event(
            AuthEvent::new(AuthEventType::TokenValidation, user_id, false)
                .with_details(details)
                .with_resource(request_path.clone())
                .with_duration(start_time.elapsed().as_millis() as u64)
                .with_auth_method("jwt"),
        );
        unauthorized(details)
    };

    let token = match req.headers().get(header::AUTHORIZATION).map(|v| v.to_str()) {
        None => return reject("Missing Authorization header", None),
        Some(Err(_)) => return reject("Invalid Authorization header format", None),
        Some(Ok(value)) => match value.strip_prefix("Bearer ") {
            Some(token) if !token.trim().is_empty() => token.trim().to_string(),
            _ => return reject("Authorization header does not contain Bearer token", None),
        },
    };

    let claims = match tokens.validate(&token, TokenType::Access) {
        Ok(claims) => claims,
        Err(e) => return reject(&e.to_string(), None),
    };

    let user_id = match Uuid::parse_str(&claims.sub) {
        Ok(id) => id,
        Err(_) => return reject("Token subject is not a user ID", Some(&claims.sub)),
    };

    debug!("Token validated for user: {}", claims.sub);
    log_auth_event(
        AuthEvent::new(AuthEventType::TokenValidation, Some(&claims.sub), true)
            .with_resource(request_path.clone())
            .with_duration(start_time.elapsed().as_millis() as u64)
            .with_auth_method("jwt"),
    );

    req.extensions_mut().insert(AuthenticatedUser { user_id });
    req.extensions_mut().insert(claims);
    next.run(req).await
}

/// Apply CORS and security headers to the application
#[cfg(feature = "with-web")]
pub fn configure_auth(app: axum::Router) -> axum::Router {
    use axum::http::{HeaderName, HeaderValue, Method};
    use tower_http::cors::{Any, CorsLayer};
    use tower_http::set_header::SetResponseHeaderLayer;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(std::time::Duration::from_secs(3600));

    let security_headers = tower::ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::if_not_present(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=63072000; includeSubDomains"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ));

    app.layer(cors).layer(security_headers)
}

#[cfg(all(test, feature = "with-web"))]
mod tests {
    use super::*;
    use axum::{middleware, routing::get, Extension, Router};
    use token::JwtConfig;
    use tower::ServiceExt;

    async fn whoami(Extension(user): Extension<AuthenticatedUser>) -> String {
        user.user_id.to_string()
    }

    fn app(tokens: Arc<TokenService>) -> Router {
        configure_auth(
            Router::new()
                .route("/me", get(whoami))
                .layer(middleware::from_fn_with_state(tokens, auth_middleware)),
        )
    }

    fn request(auth: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/me");
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_valid_access_token_passes() {
        let tokens = Arc::new(TokenService::new(JwtConfig::for_tests()));
        let user_id = Uuid::new_v4();
        let token = tokens.generate(&user_id.to_string(), TokenType::Access).unwrap();

        let response = app(tokens)
            .oneshot(request(Some(&format!("Bearer {}", token))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::X_CONTENT_TYPE_OPTIONS).unwrap(),
            "nosniff"
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body, user_id.to_string().as_bytes());
    }

    #[tokio::test]
    async fn test_missing_or_malformed_header_rejected() {
        let tokens = Arc::new(TokenService::new(JwtConfig::for_tests()));
        for auth in [None, Some("Token abc"), Some("Bearer "), Some("Bearer garbage")] {
            let response = app(tokens.clone()).oneshot(request(auth)).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[tokio::test]
    async fn test_refresh_token_rejected() {
        let tokens = Arc::new(TokenService::new(JwtConfig::for_tests()));
        let token = tokens.generate(&Uuid::new_v4().to_string(), TokenType::Refresh).unwrap();

        let response = app(tokens)
            .oneshot(request(Some(&format!("Bearer {}", token))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
