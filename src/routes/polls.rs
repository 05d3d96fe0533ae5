//! Poll routes — list, create, vote, tasks, chat.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use time::{Date, Time};
use uuid::Uuid;

use crate::dates;
use crate::error::{ApiError, JsonBody};
use crate::routes::auth::AuthUser;
use crate::services::poll::{self, NewPoll, PollError, PollView, Targeting};
use crate::state::AppState;

pub(crate) fn poll_error_to_status(err: &PollError) -> StatusCode {
    match err {
        PollError::Validation(_) => StatusCode::BAD_REQUEST,
        PollError::NotFound(_) | PollError::OptionNotFound { .. } | PollError::TaskNotFound { .. } => {
            StatusCode::NOT_FOUND
        }
        PollError::AlreadyVoted { .. } => StatusCode::CONFLICT,
        PollError::Forbidden(_) => StatusCode::FORBIDDEN,
    }
}

pub(crate) fn poll_error(err: PollError) -> ApiError {
    ApiError::new(poll_error_to_status(&err), &err)
}

#[derive(Deserialize)]
pub struct CreatePollBody {
    pub question: String,
    pub options: Vec<String>,
    #[serde(default)]
    pub targeting: Option<Targeting>,
    #[serde(with = "dates::option_date", default)]
    pub event_date: Option<Date>,
    #[serde(with = "dates::option_time", default)]
    pub event_time: Option<Time>,
}

#[derive(Deserialize)]
pub struct VoteBody {
    pub option_id: Uuid,
}

#[derive(Deserialize)]
pub struct TaskBody {
    pub title: String,
    pub assigned_user_id: String,
}

#[derive(Deserialize)]
pub struct MessageBody {
    pub text: String,
}

/// `GET /api/polls` — polls visible to the caller, newest first.
pub async fn list_polls(State(state): State<AppState>, auth: AuthUser) -> Json<Vec<PollView>> {
    Json(poll::visible_polls(&state, &auth.user).await)
}

/// `POST /api/polls` — create a poll.
pub async fn create_poll(
    State(state): State<AppState>,
    auth: AuthUser,
    WithRejection(Json(body), _): JsonBody<CreatePollBody>,
) -> Result<(StatusCode, Json<PollView>), ApiError> {
    let input = NewPoll {
        question: body.question,
        options: body.options,
        targeting: body.targeting,
        event_date: body.event_date,
        event_time: body.event_time,
    };
    let view = poll::create_poll(&state, &auth.user, input).await.map_err(poll_error)?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// `GET /api/polls/:id`
pub async fn get_poll(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(poll_id): Path<Uuid>,
) -> Result<Json<PollView>, ApiError> {
    let view = poll::get_poll(&state, &auth.user, poll_id).await.map_err(poll_error)?;
    Ok(Json(view))
}

/// `POST /api/polls/:id/vote`
pub async fn vote(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(poll_id): Path<Uuid>,
    WithRejection(Json(body), _): JsonBody<VoteBody>,
) -> Result<Json<PollView>, ApiError> {
    let view = poll::cast_vote(&state, &auth.user, poll_id, body.option_id)
        .await
        .map_err(poll_error)?;
    Ok(Json(view))
}

/// `POST /api/polls/:id/tasks`
pub async fn add_task(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(poll_id): Path<Uuid>,
    WithRejection(Json(body), _): JsonBody<TaskBody>,
) -> Result<Json<PollView>, ApiError> {
    let view = poll::add_task(&state, &auth.user, poll_id, &body.title, &body.assigned_user_id)
        .await
        .map_err(poll_error)?;
    Ok(Json(view))
}

/// `POST /api/polls/:id/tasks/:task_id/toggle`
pub async fn toggle_task(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((poll_id, task_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<PollView>, ApiError> {
    let view = poll::toggle_task_status(&state, &auth.user, poll_id, task_id)
        .await
        .map_err(poll_error)?;
    Ok(Json(view))
}

/// `POST /api/polls/:id/messages`
pub async fn post_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(poll_id): Path<Uuid>,
    WithRejection(Json(body), _): JsonBody<MessageBody>,
) -> Result<Json<PollView>, ApiError> {
    let view = poll::post_message(&state, &auth.user, poll_id, &body.text)
        .await
        .map_err(poll_error)?;
    Ok(Json(view))
}

#[cfg(test)]
#[path = "polls_test.rs"]
mod tests;
