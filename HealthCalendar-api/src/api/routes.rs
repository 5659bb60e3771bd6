use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::debug;

use health_calendar_domain::auth::{auth_middleware, configure_auth};

use crate::api::handlers::{assessment, auth, calendar, guidelines, health, profile, reminders, schedule};
use crate::api::state::AppState;
use crate::openapi::configure_swagger_routes;

/// Create the application router
pub fn create_app(state: AppState) -> Router {
    debug!("Creating application router");

    // Routes that require a bearer access token
    let protected_routes = Router::new()
        .route("/auth/info", get(auth::auth_info))
        .route(
            "/api/v1/profile",
            get(profile::get_profile).put(profile::update_profile),
        )
        .route("/api/v1/profile/health", put(profile::submit_health_profile))
        .route("/api/v1/assessment", get(assessment::get_assessment))
        .route("/api/v1/guidelines", get(guidelines::list_guidelines))
        .route("/api/v1/guidelines/recommended", get(guidelines::recommended_guidelines))
        .route(
            "/api/v1/reminders",
            get(reminders::list_reminders).post(reminders::create_reminder),
        )
        .route("/api/v1/reminders/:id/complete", post(reminders::complete_reminder))
        .route("/api/v1/calendar", get(calendar::get_calendar))
        .route_layer(middleware::from_fn_with_state(state.tokens.clone(), auth_middleware));

    debug!("Protected routes configured");

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/api/v1/assessment/evaluate", post(assessment::evaluate))
        .route("/api/v1/schedule/next-due", get(schedule::next_due));

    debug!("Public routes configured");

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
        .merge(configure_swagger_routes())
        .layer(TraceLayer::new_for_http());

    // Apply security configuration
    configure_auth(app)
}
