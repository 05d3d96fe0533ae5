//! Per-user settings routes.

use axum::extract::{Query, State};
use axum::response::Json;
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};

use crate::dates;
use crate::error::{ApiError, JsonBody};
use crate::routes::auth::AuthUser;
use crate::services::settings::{self, SettingsPatch, UserSettings};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct NotifyQuery {
    /// `HH:MM`; the current UTC time when absent.
    pub at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NotifyCheck {
    pub at: String,
    pub notify: bool,
}

/// `GET /api/settings`
pub async fn get_settings(State(state): State<AppState>, auth: AuthUser) -> Json<UserSettings> {
    Json(settings::get(&state, &auth.user).await)
}

/// `PATCH /api/settings` — partial update.
pub async fn patch_settings(
    State(state): State<AppState>,
    auth: AuthUser,
    WithRejection(Json(patch), _): JsonBody<SettingsPatch>,
) -> Json<UserSettings> {
    Json(settings::update(&state, &auth.user, patch).await)
}

/// `GET /api/settings/notify?at=HH:MM` — would a notification be delivered now?
pub async fn notify(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<NotifyQuery>,
) -> Result<Json<NotifyCheck>, ApiError> {
    let at = match query.at.as_deref() {
        Some(raw) => dates::parse_time(raw).map_err(|_| ApiError::bad_request(format!("invalid time: {raw}")))?,
        None => dates::now_time(),
    };
    let notify = settings::notify_at(&state, &auth.user, at).await;
    Ok(Json(NotifyCheck { at: dates::format_time(at), notify }))
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
