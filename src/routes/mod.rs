//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! One JSON API under `/api`, plus `/healthz`. Every `/api` route except
//! login, captcha and registration needs a session (cookie or bearer token).

pub mod articles;
pub mod auth;
pub mod calendar;
pub mod members;
pub mod nav;
pub mod polls;
pub mod settings;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/captcha", post(auth::captcha))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/nav", get(nav::nav))
        .route("/api/roles", get(nav::roles))
        .route("/api/polls", get(polls::list_polls).post(polls::create_poll))
        .route("/api/polls/{id}", get(polls::get_poll))
        .route("/api/polls/{id}/vote", post(polls::vote))
        .route("/api/polls/{id}/tasks", post(polls::add_task))
        .route("/api/polls/{id}/tasks/{task_id}/toggle", post(polls::toggle_task))
        .route("/api/polls/{id}/messages", post(polls::post_message))
        .route("/api/calendar", get(calendar::month))
        // `{period}` is a year here and a `YYYY-MM-DD` day below.
        .route("/api/calendar/{period}", get(calendar::year))
        .route("/api/calendar/{period}/polls", post(calendar::quick_create))
        .route("/api/members", get(members::list_members))
        .route("/api/members/{id}/role", post(members::promote))
        .route("/api/articles", get(articles::list_articles).post(articles::create_article))
        .route("/api/articles/{id}", get(articles::get_article))
        .route("/api/articles/{id}/ingredients", post(articles::add_ingredient))
        .route(
            "/api/articles/{id}/ingredients/{ingredient_id}",
            patch(articles::update_ingredient).delete(articles::remove_ingredient),
        )
        .route("/api/settings", get(settings::get_settings).patch(settings::patch_settings))
        .route("/api/settings/notify", get(settings::notify))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
pub(crate) mod test_helpers {
    use axum::body::{Body, to_bytes};
    use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
    use axum::http::{Method, Request};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::services::session;
    use crate::state::{Role, test_helpers as state_helpers};

    /// Seed a directory member and open a session for them.
    pub async fn login_as(state: &AppState, id: &str, role: Role) -> String {
        state_helpers::seed_member(state, id, &format!("Test {id}"), role).await;
        session::create_session(state, id).await
    }

    /// Drive one request through a fresh router. Empty bodies decode to `Value::Null`.
    pub async fn call(
        state: &AppState,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, json)
    }
}
