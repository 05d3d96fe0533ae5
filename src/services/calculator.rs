//! Calculator service — ingredient cost breakdown for sales articles.
//!
//! DESIGN
//! ======
//! Articles are independent of the poll store. An ingredient is priced per
//! reference quantity (e.g. 3.00 per 100 g), so its cost is
//! `used / reference × price`. Totals are derived on every read and never
//! stored. Patches are applied to a copy and validated before they replace
//! the stored ingredient, so a rejected update leaves nothing half-written.

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::services::session::SessionUser;
use crate::services::{Forbidden, require};
use crate::state::{AppState, Capability};

pub const DEFAULT_INGREDIENT_NAME: &str = "Neue Zutat";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CalculatorError {
    #[error("invalid calculator input: {0}")]
    Validation(&'static str),
    #[error("article not found: {0}")]
    NotFound(Uuid),
    #[error("ingredient {ingredient_id} not found on article {article_id}")]
    IngredientNotFound { article_id: Uuid, ingredient_id: Uuid },
    #[error(transparent)]
    Forbidden(#[from] Forbidden),
}

impl crate::error::ErrorCode for CalculatorError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "E_VALIDATION",
            Self::NotFound(_) => "E_ARTICLE_NOT_FOUND",
            Self::IngredientNotFound { .. } => "E_INGREDIENT_NOT_FOUND",
            Self::Forbidden(_) => "E_FORBIDDEN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    G,
    Ml,
    Piece,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: Uuid,
    pub name: String,
    pub used_quantity: f64,
    pub reference_quantity: f64,
    pub reference_price: f64,
    pub unit: Unit,
}

impl Ingredient {
    /// Placeholder row added by "Neu": 10 of 100 g at 1.00.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: DEFAULT_INGREDIENT_NAME.to_owned(),
            used_quantity: 10.0,
            reference_quantity: 100.0,
            reference_price: 1.0,
            unit: Unit::G,
        }
    }

    #[must_use]
    pub fn cost(&self) -> f64 {
        self.used_quantity / self.reference_quantity * self.reference_price
    }

    fn validate(&self) -> Result<(), CalculatorError> {
        if self.name.trim().is_empty() {
            return Err(CalculatorError::Validation("ingredient name must not be empty"));
        }
        for value in [self.used_quantity, self.reference_quantity, self.reference_price] {
            if !value.is_finite() || value < 0.0 {
                return Err(CalculatorError::Validation("quantities and prices must be finite and non-negative"));
            }
        }
        if self.reference_quantity <= 0.0 {
            return Err(CalculatorError::Validation("reference quantity must be greater than zero"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesArticle {
    pub id: Uuid,
    pub name: String,
    pub ingredients: Vec<Ingredient>,
}

impl SalesArticle {
    /// Sum of ingredient costs; zero for an article without ingredients.
    #[must_use]
    pub fn total_cost(&self) -> f64 {
        self.ingredients.iter().map(Ingredient::cost).sum()
    }
}

/// Partial ingredient update. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngredientPatch {
    pub name: Option<String>,
    pub used_quantity: Option<f64>,
    pub reference_quantity: Option<f64>,
    pub reference_price: Option<f64>,
    pub unit: Option<Unit>,
}

impl IngredientPatch {
    fn apply(self, target: &mut Ingredient) {
        if let Some(name) = self.name {
            target.name = name.trim().to_owned();
        }
        if let Some(v) = self.used_quantity {
            target.used_quantity = v;
        }
        if let Some(v) = self.reference_quantity {
            target.reference_quantity = v;
        }
        if let Some(v) = self.reference_price {
            target.reference_price = v;
        }
        if let Some(unit) = self.unit {
            target.unit = unit;
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IngredientLine {
    #[serde(flatten)]
    pub ingredient: Ingredient,
    pub cost: f64,
}

/// An article with per-ingredient and total costs.
#[derive(Debug, Clone, Serialize)]
pub struct ArticleView {
    pub id: Uuid,
    pub name: String,
    pub ingredients: Vec<IngredientLine>,
    pub total_cost: f64,
}

impl From<&SalesArticle> for ArticleView {
    fn from(article: &SalesArticle) -> Self {
        Self {
            id: article.id,
            name: article.name.clone(),
            ingredients: article
                .ingredients
                .iter()
                .map(|i| IngredientLine { ingredient: i.clone(), cost: i.cost() })
                .collect(),
            total_cost: article.total_cost(),
        }
    }
}

fn article_mut(articles: &mut [SalesArticle], article_id: Uuid) -> Result<&mut SalesArticle, CalculatorError> {
    articles
        .iter_mut()
        .find(|a| a.id == article_id)
        .ok_or(CalculatorError::NotFound(article_id))
}

// =============================================================================
// QUERIES
// =============================================================================

/// # Errors
///
/// Returns `Forbidden` without `EditCalculator`.
pub async fn list_articles(state: &AppState, actor: &SessionUser) -> Result<Vec<ArticleView>, CalculatorError> {
    require(actor, Capability::EditCalculator)?;
    let articles = state.articles.read().await;
    Ok(articles.iter().map(ArticleView::from).collect())
}

/// # Errors
///
/// Returns `Forbidden` without `EditCalculator` and `NotFound` for unknown ids.
pub async fn get_article(state: &AppState, actor: &SessionUser, article_id: Uuid) -> Result<ArticleView, CalculatorError> {
    require(actor, Capability::EditCalculator)?;
    let articles = state.articles.read().await;
    articles
        .iter()
        .find(|a| a.id == article_id)
        .map(ArticleView::from)
        .ok_or(CalculatorError::NotFound(article_id))
}

// =============================================================================
// MUTATIONS
// =============================================================================

/// Create an empty article.
///
/// # Errors
///
/// Returns `Forbidden` without `EditCalculator` and `Validation` for a
/// blank name.
pub async fn create_article(state: &AppState, actor: &SessionUser, name: &str) -> Result<ArticleView, CalculatorError> {
    require(actor, Capability::EditCalculator)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(CalculatorError::Validation("article name must not be empty"));
    }

    let article = SalesArticle { id: Uuid::new_v4(), name: name.to_owned(), ingredients: Vec::new() };
    let view = ArticleView::from(&article);
    state.articles.write().await.push(article);
    info!(article_id = %view.id, by = %actor.id, "article created");
    Ok(view)
}

/// Append an ingredient: the placeholder row with `fields` applied on top.
///
/// # Errors
///
/// Returns `Forbidden`, `NotFound`, or `Validation` if the resulting
/// ingredient is invalid.
pub async fn add_ingredient(
    state: &AppState,
    actor: &SessionUser,
    article_id: Uuid,
    fields: IngredientPatch,
) -> Result<ArticleView, CalculatorError> {
    require(actor, Capability::EditCalculator)?;

    let mut ingredient = Ingredient::placeholder();
    fields.apply(&mut ingredient);
    ingredient.validate()?;

    let mut articles = state.articles.write().await;
    let article = article_mut(&mut articles, article_id)?;
    info!(%article_id, ingredient_id = %ingredient.id, "ingredient added");
    article.ingredients.push(ingredient);
    Ok(ArticleView::from(&*article))
}

/// Apply a partial update to one ingredient.
///
/// # Errors
///
/// Returns `Forbidden`, `NotFound` / `IngredientNotFound` for unknown ids,
/// and `Validation` if the patched ingredient is invalid (nothing changes).
pub async fn update_ingredient(
    state: &AppState,
    actor: &SessionUser,
    article_id: Uuid,
    ingredient_id: Uuid,
    patch: IngredientPatch,
) -> Result<ArticleView, CalculatorError> {
    require(actor, Capability::EditCalculator)?;

    let mut articles = state.articles.write().await;
    let article = article_mut(&mut articles, article_id)?;
    let slot = article
        .ingredients
        .iter_mut()
        .find(|i| i.id == ingredient_id)
        .ok_or(CalculatorError::IngredientNotFound { article_id, ingredient_id })?;

    let mut updated = slot.clone();
    patch.apply(&mut updated);
    updated.validate()?;
    *slot = updated;

    info!(%article_id, %ingredient_id, "ingredient updated");
    Ok(ArticleView::from(&*article))
}

/// # Errors
///
/// Returns `Forbidden` and `NotFound` / `IngredientNotFound` for unknown ids.
pub async fn remove_ingredient(
    state: &AppState,
    actor: &SessionUser,
    article_id: Uuid,
    ingredient_id: Uuid,
) -> Result<ArticleView, CalculatorError> {
    require(actor, Capability::EditCalculator)?;

    let mut articles = state.articles.write().await;
    let article = article_mut(&mut articles, article_id)?;
    let before = article.ingredients.len();
    article.ingredients.retain(|i| i.id != ingredient_id);
    if article.ingredients.len() == before {
        return Err(CalculatorError::IngredientNotFound { article_id, ingredient_id });
    }

    info!(%article_id, %ingredient_id, "ingredient removed");
    Ok(ArticleView::from(&*article))
}

#[cfg(test)]
#[path = "calculator_test.rs"]
mod tests;
