//! Calendar routes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use time::Time;

use crate::dates;
use crate::error::{ApiError, JsonBody};
use crate::routes::auth::AuthUser;
use crate::routes::polls::poll_error_to_status;
use crate::services::calendar::{self, CalendarError, MonthCount, MonthView};
use crate::services::poll::PollView;
use crate::state::AppState;

pub(crate) fn calendar_error_to_status(err: &CalendarError) -> StatusCode {
    match err {
        CalendarError::Validation(_) => StatusCode::BAD_REQUEST,
        CalendarError::Poll(inner) => poll_error_to_status(inner),
    }
}

fn calendar_error(err: CalendarError) -> ApiError {
    ApiError::new(calendar_error_to_status(&err), &err)
}

#[derive(Deserialize)]
pub struct MonthQuery {
    pub year: Option<i32>,
    pub month: Option<u8>,
}

#[derive(Deserialize)]
pub struct QuickCreateBody {
    pub question: String,
    pub options: Vec<String>,
    #[serde(with = "dates::option_time", default)]
    pub time: Option<Time>,
}

/// `GET /api/calendar?year=&month=` — month grid; defaults to the current month.
pub async fn month(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<MonthQuery>,
) -> Result<Json<MonthView>, ApiError> {
    let today = dates::today();
    let year = query.year.unwrap_or(today.year());
    let month = query.month.unwrap_or_else(|| u8::from(today.month()));
    let view = calendar::month_view(&state, &auth.user, year, month)
        .await
        .map_err(calendar_error)?;
    Ok(Json(view))
}

/// `GET /api/calendar/:year` — scheduled polls per month.
pub async fn year(State(state): State<AppState>, auth: AuthUser, Path(year): Path<i32>) -> Json<Vec<MonthCount>> {
    Json(calendar::year_overview(&state, &auth.user, year).await)
}

/// `POST /api/calendar/:date/polls` — create a poll on the selected day.
pub async fn quick_create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(date): Path<String>,
    WithRejection(Json(body), _): JsonBody<QuickCreateBody>,
) -> Result<(StatusCode, Json<PollView>), ApiError> {
    let date = dates::parse_date(&date).map_err(|e| ApiError::bad_request(format!("invalid date: {e}")))?;
    let view = calendar::quick_create(&state, &auth.user, date, body.question, body.options, body.time)
        .await
        .map_err(calendar_error)?;
    Ok((StatusCode::CREATED, Json(view)))
}

#[cfg(test)]
#[path = "calendar_test.rs"]
mod tests;
