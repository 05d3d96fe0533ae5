//! Auth routes — login, captcha registration, session management.

use axum::extract::{FromRef, State};
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::response::{IntoResponse, Json};
use axum_extra::extract::WithRejection;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use time::Duration;

use crate::error::{ApiError, JsonBody};
use crate::services::auth::{self as auth_svc, AuthError, AuthSession, Captcha, Registration};
use crate::services::members::MemberError;
use crate::services::session;
use crate::state::AppState;

pub(crate) const COOKIE_NAME: &str = "session_token";

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Authenticated user extracted from the session cookie or a bearer token.
/// Use as a handler parameter to require authentication.
pub struct AuthUser {
    pub user: session::SessionUser,
    pub token: String,
}

pub(crate) fn bearer_token(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(COOKIE_NAME)
            .map(Cookie::value)
            .filter(|t| !t.is_empty())
            .or_else(|| bearer_token(&parts.headers))
            .ok_or_else(ApiError::unauthorized)?
            .to_owned();

        let app_state = AppState::from_ref(state);
        let user = session::validate_session(&app_state, &token)
            .await
            .ok_or_else(ApiError::unauthorized)?;

        Ok(Self { user, token })
    }
}

// =============================================================================
// HELPERS
// =============================================================================

pub(crate) fn auth_error_to_status(err: &AuthError) -> StatusCode {
    match err {
        AuthError::InvalidEmail | AuthError::MissingPassword | AuthError::MissingName | AuthError::CaptchaMismatch => {
            StatusCode::BAD_REQUEST
        }
        AuthError::Member(MemberError::EmailTaken(_)) => StatusCode::CONFLICT,
        AuthError::Member(MemberError::NotFound(_)) => StatusCode::NOT_FOUND,
        AuthError::Member(MemberError::RoleChangeRefused { .. } | MemberError::Forbidden(_)) => StatusCode::FORBIDDEN,
    }
}

fn auth_error(err: AuthError) -> ApiError {
    ApiError::new(auth_error_to_status(&err), &err)
}

fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

fn with_cookie(secure: bool, session: AuthSession) -> impl IntoResponse {
    let jar = CookieJar::new().add(session_cookie(session.token.clone(), secure));
    (jar, Json(session))
}

// =============================================================================
// HANDLERS
// =============================================================================

#[derive(Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

/// `POST /api/auth/login` — open a session, set the cookie.
pub async fn login(
    State(state): State<AppState>,
    WithRejection(Json(body), _): JsonBody<LoginBody>,
) -> Result<impl IntoResponse, ApiError> {
    let session = auth_svc::login(&state, &body.email, &body.password)
        .await
        .map_err(auth_error)?;
    Ok(with_cookie(state.config.cookie_secure, session))
}

/// `POST /api/auth/captcha` — issue a registration captcha.
pub async fn captcha(State(state): State<AppState>) -> Json<Captcha> {
    Json(auth_svc::issue_captcha(&state).await)
}

/// `POST /api/auth/register` — create a visitor account and log it in.
pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(body), _): JsonBody<Registration>,
) -> Result<impl IntoResponse, ApiError> {
    let session = auth_svc::register(&state, body).await.map_err(auth_error)?;
    Ok((StatusCode::CREATED, with_cookie(state.config.cookie_secure, session)))
}

/// `GET /api/auth/me` — return current user.
pub async fn me(auth: AuthUser) -> Json<session::SessionUser> {
    Json(auth.user)
}

/// `POST /api/auth/logout` — delete session, clear cookie.
pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let _ = session::delete_session(&state, &auth.token).await;

    let cookie = Cookie::build((COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.cookie_secure)
        .max_age(Duration::ZERO);

    let jar = CookieJar::new().add(cookie);
    (jar, StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
