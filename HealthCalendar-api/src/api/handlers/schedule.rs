use axum::{
    extract::{rejection::QueryRejection, Query},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};
use utoipa::{IntoParams, ToSchema};

use health_calendar_domain::services::next_due_date;

use crate::entities::common::ErrorResponse;

/// Inputs for a due-date computation
#[derive(Debug, Deserialize, IntoParams)]
pub struct NextDueQuery {
    /// Date of the last check, YYYY-MM-DD
    #[param(value_type = String, format = Date)]
    pub last_check: NaiveDate,
    /// Recurrence label, e.g. "every 2 years"
    pub frequency: String,
}

/// Computed due date
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NextDueResponse {
    #[schema(value_type = String, format = Date)]
    pub last_check: NaiveDate,
    pub frequency: String,
    /// Unset when the label is not a recognized frequency
    #[schema(value_type = Option<String>, format = Date)]
    pub next_due: Option<NaiveDate>,
}

/// Compute the next due date for a frequency label
#[utoipa::path(
    get,
    path = "/api/v1/schedule/next-due",
    params(NextDueQuery),
    responses(
        (status = 200, description = "Next due date", body = NextDueResponse),
        (status = 400, description = "Invalid query", body = ErrorResponse),
    ),
    tag = "schedule"
)]
#[instrument]
pub async fn next_due(
    query: Result<Query<NextDueQuery>, QueryRejection>,
) -> Result<Json<NextDueResponse>, ErrorResponse> {
    let Query(query) = query.map_err(|rejection| {
        warn!("Rejected next-due query: {}", rejection.body_text());
        ErrorResponse::from(rejection)
    })?;

    let next_due = next_due_date(query.last_check, &query.frequency);
    if next_due.is_none() {
        warn!("Unrecognized frequency {:?}", query.frequency);
    }

    Ok(Json(NextDueResponse {
        last_check: query.last_check,
        frequency: query.frequency,
        next_due,
    }))
}
