use axum::{extract::State, Extension, Json};
use tracing::{debug, instrument};

use health_calendar_domain::auth::AuthenticatedUser;
use health_calendar_domain::entities::health_profile::HealthProfile;
use health_calendar_domain::entities::insights::AssessmentReport;
use health_calendar_domain::services::evaluate_profile;

use crate::api::state::AppState;
use crate::entities::common::ErrorResponse;

/// Assess the stored health profile of the authenticated user
#[utoipa::path(
    get,
    path = "/api/v1/assessment",
    responses(
        (status = 200, description = "Risk assessment", body = AssessmentReport),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "No health assessment submitted", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "assessment"
)]
#[instrument(skip(state))]
pub async fn get_assessment(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> Result<Json<AssessmentReport>, ErrorResponse> {
    Ok(Json(state.profiles.assess_stored(caller.user_id).await?))
}

/// Assess a posted health profile without storing it
#[utoipa::path(
    post,
    path = "/api/v1/assessment/evaluate",
    request_body = HealthProfile,
    responses(
        (status = 200, description = "Risk assessment", body = AssessmentReport),
    ),
    tag = "assessment"
)]
#[instrument(skip(profile))]
pub async fn evaluate(Json(profile): Json<HealthProfile>) -> Json<AssessmentReport> {
    let report = evaluate_profile(&profile);
    debug!(
        "Evaluated profile: overall {} with {} categories",
        report.assessment.overall_risk,
        report.assessment.risks.len()
    );
    Json(report)
}
