use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Extension, Json,
};
use chrono::{Datelike, Utc};
use serde::Deserialize;
use tracing::instrument;
use utoipa::IntoParams;

use health_calendar_domain::auth::AuthenticatedUser;
use health_calendar_domain::entities::calendar::CalendarMonth;
use health_calendar_domain::services::build_month;

use crate::api::state::AppState;
use crate::entities::common::ErrorResponse;

/// Month selection, defaulting to the current month
#[derive(Debug, Deserialize, IntoParams)]
pub struct CalendarQuery {
    pub year: Option<i32>,
    /// 1-12
    pub month: Option<u32>,
}

/// Month grid with the authenticated user's reminders
#[utoipa::path(
    get,
    path = "/api/v1/calendar",
    params(CalendarQuery),
    responses(
        (status = 200, description = "Calendar month", body = CalendarMonth),
        (status = 400, description = "Invalid month", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "calendar"
)]
#[instrument(skip(state))]
pub async fn get_calendar(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    query: Result<Query<CalendarQuery>, QueryRejection>,
) -> Result<Json<CalendarMonth>, ErrorResponse> {
    let Query(query) = query?;
    let today = Utc::now().date_naive();
    let year = query.year.unwrap_or_else(|| today.year());
    let month = query.month.unwrap_or_else(|| today.month());

    let reminders = state.reminders.list_reminders(caller.user_id).await?;
    Ok(Json(build_month(year, month, &reminders)?))
}
