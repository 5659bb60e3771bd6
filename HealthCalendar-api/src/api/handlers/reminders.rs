use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use health_calendar_domain::auth::AuthenticatedUser;
use health_calendar_domain::entities::reminder::{CreateReminderRequest, Reminder};

use crate::api::state::AppState;
use crate::entities::common::ErrorResponse;

/// Reminders of the authenticated user, soonest first
#[utoipa::path(
    get,
    path = "/api/v1/reminders",
    responses(
        (status = 200, description = "Reminders", body = [Reminder]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "reminders"
)]
#[instrument(skip(state))]
pub async fn list_reminders(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<Reminder>>, ErrorResponse> {
    Ok(Json(state.reminders.list_reminders(caller.user_id).await?))
}

/// Create a reminder
#[utoipa::path(
    post,
    path = "/api/v1/reminders",
    request_body = CreateReminderRequest,
    responses(
        (status = 201, description = "Reminder created", body = Reminder),
        (status = 400, description = "Invalid reminder data", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "reminders"
)]
#[instrument(skip(state, request), fields(test_name = %request.test_name))]
pub async fn create_reminder(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(request): Json<CreateReminderRequest>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let today = Utc::now().date_naive();
    let reminder = state.reminders.create_reminder(caller.user_id, request, today).await?;
    info!("Created reminder {} for user {}", reminder.id, caller.user_id);
    Ok((StatusCode::CREATED, Json(reminder)))
}

/// Mark a reminder's check as done today and schedule the next one
#[utoipa::path(
    post,
    path = "/api/v1/reminders/{id}/complete",
    params(
        ("id" = Uuid, Path, description = "Reminder ID")
    ),
    responses(
        (status = 200, description = "Reminder rescheduled", body = Reminder),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Reminder not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "reminders"
)]
#[instrument(skip(state))]
pub async fn complete_reminder(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Reminder>, ErrorResponse> {
    let today = Utc::now().date_naive();
    Ok(Json(state.reminders.mark_completed(caller.user_id, id, today).await?))
}
