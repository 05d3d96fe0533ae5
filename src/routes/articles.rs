//! Calculator routes — sales articles and their ingredients.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{ApiError, JsonBody};
use crate::routes::auth::AuthUser;
use crate::services::calculator::{self, ArticleView, CalculatorError, IngredientPatch};
use crate::state::AppState;

pub(crate) fn calculator_error_to_status(err: &CalculatorError) -> StatusCode {
    match err {
        CalculatorError::Validation(_) => StatusCode::BAD_REQUEST,
        CalculatorError::NotFound(_) | CalculatorError::IngredientNotFound { .. } => StatusCode::NOT_FOUND,
        CalculatorError::Forbidden(_) => StatusCode::FORBIDDEN,
    }
}

fn calculator_error(err: CalculatorError) -> ApiError {
    ApiError::new(calculator_error_to_status(&err), &err)
}

#[derive(Deserialize)]
pub struct CreateArticleBody {
    pub name: String,
}

/// `GET /api/articles`
pub async fn list_articles(State(state): State<AppState>, auth: AuthUser) -> Result<Json<Vec<ArticleView>>, ApiError> {
    let rows = calculator::list_articles(&state, &auth.user).await.map_err(calculator_error)?;
    Ok(Json(rows))
}

/// `POST /api/articles`
pub async fn create_article(
    State(state): State<AppState>,
    auth: AuthUser,
    WithRejection(Json(body), _): JsonBody<CreateArticleBody>,
) -> Result<(StatusCode, Json<ArticleView>), ApiError> {
    let view = calculator::create_article(&state, &auth.user, &body.name)
        .await
        .map_err(calculator_error)?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// `GET /api/articles/:id` — article with line and total costs.
pub async fn get_article(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(article_id): Path<Uuid>,
) -> Result<Json<ArticleView>, ApiError> {
    let view = calculator::get_article(&state, &auth.user, article_id)
        .await
        .map_err(calculator_error)?;
    Ok(Json(view))
}

/// `POST /api/articles/:id/ingredients` — fields given override the placeholder row.
pub async fn add_ingredient(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(article_id): Path<Uuid>,
    WithRejection(Json(fields), _): JsonBody<IngredientPatch>,
) -> Result<(StatusCode, Json<ArticleView>), ApiError> {
    let view = calculator::add_ingredient(&state, &auth.user, article_id, fields)
        .await
        .map_err(calculator_error)?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// `PATCH /api/articles/:id/ingredients/:ingredient_id`
pub async fn update_ingredient(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((article_id, ingredient_id)): Path<(Uuid, Uuid)>,
    WithRejection(Json(patch), _): JsonBody<IngredientPatch>,
) -> Result<Json<ArticleView>, ApiError> {
    let view = calculator::update_ingredient(&state, &auth.user, article_id, ingredient_id, patch)
        .await
        .map_err(calculator_error)?;
    Ok(Json(view))
}

/// `DELETE /api/articles/:id/ingredients/:ingredient_id`
pub async fn remove_ingredient(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((article_id, ingredient_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ArticleView>, ApiError> {
    let view = calculator::remove_ingredient(&state, &auth.user, article_id, ingredient_id)
        .await
        .map_err(calculator_error)?;
    Ok(Json(view))
}

#[cfg(test)]
#[path = "articles_test.rs"]
mod tests;
