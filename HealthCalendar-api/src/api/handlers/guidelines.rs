use axum::{extract::State, Extension, Json};
use tracing::{info, instrument};

use health_calendar_domain::auth::AuthenticatedUser;
use health_calendar_domain::entities::guideline::{Guideline, GuidelineSet};

use crate::api::state::AppState;
use crate::entities::common::ErrorResponse;

/// The full guideline reference set
#[utoipa::path(
    get,
    path = "/api/v1/guidelines",
    responses(
        (status = 200, description = "Guideline set", body = GuidelineSet),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "guidelines"
)]
#[instrument(skip(state))]
pub async fn list_guidelines(State(state): State<AppState>) -> Json<GuidelineSet> {
    Json(state.catalog.set().clone())
}

/// Guidelines matching the authenticated user's age and sex
#[utoipa::path(
    get,
    path = "/api/v1/guidelines/recommended",
    responses(
        (status = 200, description = "Applicable guidelines", body = [Guideline]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 422, description = "Profile lacks age or sex", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "guidelines"
)]
#[instrument(skip(state))]
pub async fn recommended_guidelines(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<Guideline>>, ErrorResponse> {
    let guidelines = state.profiles.recommended_guidelines(caller.user_id).await?;
    info!("{} guidelines apply to user {}", guidelines.len(), caller.user_id);
    Ok(Json(guidelines))
}
