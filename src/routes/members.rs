//! Member directory routes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum_extra::extract::WithRejection;
use serde::Deserialize;

use crate::error::{ApiError, JsonBody};
use crate::routes::auth::AuthUser;
use crate::services::members::{self, ManagedUser, MemberError};
use crate::state::{AppState, Role};

pub(crate) fn member_error_to_status(err: &MemberError) -> StatusCode {
    match err {
        MemberError::NotFound(_) => StatusCode::NOT_FOUND,
        MemberError::EmailTaken(_) => StatusCode::CONFLICT,
        MemberError::RoleChangeRefused { .. } | MemberError::Forbidden(_) => StatusCode::FORBIDDEN,
    }
}

fn member_error(err: MemberError) -> ApiError {
    ApiError::new(member_error_to_status(&err), &err)
}

#[derive(Deserialize)]
pub struct MemberQuery {
    pub q: Option<String>,
}

#[derive(Deserialize)]
pub struct RoleBody {
    pub role: String,
}

/// `GET /api/members?q=` — directory, optionally filtered.
pub async fn list_members(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<MemberQuery>,
) -> Result<Json<Vec<ManagedUser>>, ApiError> {
    let rows = members::list_members(&state, &auth.user, query.q.as_deref())
        .await
        .map_err(member_error)?;
    Ok(Json(rows))
}

/// `POST /api/members/:id/role` — promote a member.
pub async fn promote(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
    WithRejection(Json(body), _): JsonBody<RoleBody>,
) -> Result<Json<ManagedUser>, ApiError> {
    let Some(role) = Role::parse(&body.role) else {
        return Err(ApiError::bad_request(format!("unknown role: {}", body.role)));
    };
    let updated = members::promote(&state, &auth.user, &user_id, role)
        .await
        .map_err(member_error)?;
    Ok(Json(updated))
}

#[cfg(test)]
#[path = "members_test.rs"]
mod tests;
