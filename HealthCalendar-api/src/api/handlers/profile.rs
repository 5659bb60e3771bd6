use axum::{extract::State, Extension, Json};
use tracing::instrument;

use health_calendar_domain::auth::AuthenticatedUser;
use health_calendar_domain::entities::health_profile::HealthProfile;
use health_calendar_domain::entities::user::{UpdateProfileRequest, User};

use crate::api::state::AppState;
use crate::entities::common::ErrorResponse;

/// Profile of the authenticated user
#[utoipa::path(
    get,
    path = "/api/v1/profile",
    responses(
        (status = 200, description = "Current profile", body = User),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "profile"
)]
#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> Result<Json<User>, ErrorResponse> {
    Ok(Json(state.profiles.get_profile(caller.user_id).await?))
}

/// Update age, sex, location and known conditions
#[utoipa::path(
    put,
    path = "/api/v1/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = User),
        (status = 400, description = "Invalid profile data", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "profile"
)]
#[instrument(skip(state, request))]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<User>, ErrorResponse> {
    Ok(Json(state.profiles.update_profile(caller.user_id, request).await?))
}

/// Submit the health assessment form
#[utoipa::path(
    put,
    path = "/api/v1/profile/health",
    request_body = HealthProfile,
    responses(
        (status = 200, description = "Health assessment stored", body = User),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "profile"
)]
#[instrument(skip(state, profile))]
pub async fn submit_health_profile(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(profile): Json<HealthProfile>,
) -> Result<Json<User>, ErrorResponse> {
    Ok(Json(state.profiles.submit_health_profile(caller.user_id, profile).await?))
}
