use super::*;
use crate::state::{Role, test_helpers};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn ingredient(name: &str, used: f64, reference: f64, price: f64, unit: Unit) -> Ingredient {
    Ingredient {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        used_quantity: used,
        reference_quantity: reference,
        reference_price: price,
        unit,
    }
}

fn burger() -> SalesArticle {
    SalesArticle {
        id: Uuid::new_v4(),
        name: "Burger".into(),
        ingredients: vec![
            ingredient("Bun", 1.0, 1.0, 0.8, Unit::Piece),
            ingredient("Patty", 1.0, 1.0, 1.5, Unit::Piece),
            ingredient("Salz", 5.0, 100.0, 3.0, Unit::G),
        ],
    }
}

async fn seed_burger(state: &AppState) -> SalesArticle {
    let article = burger();
    state.articles.write().await.push(article.clone());
    article
}

// =============================================================================
// pricing
// =============================================================================

#[test]
fn burger_total_is_sum_of_scaled_prices() {
    let article = burger();
    assert!(close(article.ingredients[2].cost(), 0.15));
    assert!(close(article.total_cost(), 2.45));
}

#[test]
fn empty_article_costs_nothing() {
    let article = SalesArticle { id: Uuid::new_v4(), name: "Leer".into(), ingredients: Vec::new() };
    assert!(close(article.total_cost(), 0.0));
}

#[test]
fn validate_rejects_zero_reference_and_negative_values() {
    assert!(ingredient("x", 1.0, 0.0, 1.0, Unit::G).validate().is_err());
    assert!(ingredient("x", -1.0, 1.0, 1.0, Unit::G).validate().is_err());
    assert!(ingredient("x", 1.0, 1.0, f64::NAN, Unit::G).validate().is_err());
    assert!(ingredient("  ", 1.0, 1.0, 1.0, Unit::G).validate().is_err());
    assert!(ingredient("x", 0.0, 1.0, 0.0, Unit::Ml).validate().is_ok());
}

#[test]
fn unit_uses_short_wire_names() {
    assert_eq!(serde_json::to_value(Unit::G).unwrap(), "g");
    assert_eq!(serde_json::to_value(Unit::Ml).unwrap(), "ml");
    assert_eq!(serde_json::to_value(Unit::Piece).unwrap(), "piece");
}

// =============================================================================
// operations
// =============================================================================

#[tokio::test]
async fn get_article_reports_line_and_total_costs() {
    let state = test_helpers::test_app_state();
    let article = seed_burger(&state).await;
    let admin = test_helpers::actor("u4", Role::Admin);

    let view = get_article(&state, &admin, article.id).await.unwrap();
    assert_eq!(view.ingredients.len(), 3);
    assert!(close(view.ingredients[0].cost, 0.8));
    assert!(close(view.total_cost, 2.45));
}

#[tokio::test]
async fn members_cannot_use_calculator() {
    let state = test_helpers::test_app_state();
    let article = seed_burger(&state).await;
    let user = test_helpers::actor("u2", Role::User);

    assert!(matches!(list_articles(&state, &user).await, Err(CalculatorError::Forbidden(_))));
    assert!(matches!(get_article(&state, &user, article.id).await, Err(CalculatorError::Forbidden(_))));
    let err = add_ingredient(&state, &user, article.id, IngredientPatch::default()).await.unwrap_err();
    assert!(matches!(err, CalculatorError::Forbidden(_)));
    assert_eq!(state.articles.read().await[0].ingredients.len(), 3);
}

#[tokio::test]
async fn create_article_starts_empty() {
    let state = test_helpers::test_app_state();
    let vorstand = test_helpers::actor("u3", Role::Vorstand);

    let view = create_article(&state, &vorstand, " Bratwurst ").await.unwrap();
    assert_eq!(view.name, "Bratwurst");
    assert!(view.ingredients.is_empty());
    assert!(close(view.total_cost, 0.0));
    assert_eq!(list_articles(&state, &vorstand).await.unwrap().len(), 1);

    assert!(matches!(create_article(&state, &vorstand, "").await, Err(CalculatorError::Validation(_))));
}

#[tokio::test]
async fn add_ingredient_uses_placeholder_defaults() {
    let state = test_helpers::test_app_state();
    let article = seed_burger(&state).await;
    let admin = test_helpers::actor("u4", Role::Admin);

    let view = add_ingredient(&state, &admin, article.id, IngredientPatch::default()).await.unwrap();
    let added = &view.ingredients[3];
    assert_eq!(added.ingredient.name, "Neue Zutat");
    assert_eq!(added.ingredient.unit, Unit::G);
    assert!(close(added.cost, 0.1));
    assert!(close(view.total_cost, 2.55));
}

#[tokio::test]
async fn update_ingredient_applies_partial_patch() {
    let state = test_helpers::test_app_state();
    let article = seed_burger(&state).await;
    let salz = article.ingredients[2].id;
    let admin = test_helpers::actor("u4", Role::Admin);

    let patch = IngredientPatch { used_quantity: Some(10.0), ..IngredientPatch::default() };
    let view = update_ingredient(&state, &admin, article.id, salz, patch).await.unwrap();

    let line = &view.ingredients[2];
    assert_eq!(line.ingredient.name, "Salz");
    assert!(close(line.cost, 0.3));
    assert!(close(view.total_cost, 2.6));
}

#[tokio::test]
async fn invalid_update_leaves_ingredient_untouched() {
    let state = test_helpers::test_app_state();
    let article = seed_burger(&state).await;
    let salz = article.ingredients[2].id;
    let admin = test_helpers::actor("u4", Role::Admin);

    let patch = IngredientPatch {
        used_quantity: Some(50.0),
        reference_quantity: Some(0.0),
        ..IngredientPatch::default()
    };
    let err = update_ingredient(&state, &admin, article.id, salz, patch).await.unwrap_err();
    assert!(matches!(err, CalculatorError::Validation(_)));

    let stored = &state.articles.read().await[0].ingredients[2];
    assert!(close(stored.used_quantity, 5.0));
    assert!(close(stored.reference_quantity, 100.0));
}

#[tokio::test]
async fn remove_ingredient_drops_one_line() {
    let state = test_helpers::test_app_state();
    let article = seed_burger(&state).await;
    let bun = article.ingredients[0].id;
    let admin = test_helpers::actor("u4", Role::Admin);

    let view = remove_ingredient(&state, &admin, article.id, bun).await.unwrap();
    assert_eq!(view.ingredients.len(), 2);
    assert!(close(view.total_cost, 1.65));

    let again = remove_ingredient(&state, &admin, article.id, bun).await.unwrap_err();
    assert!(matches!(again, CalculatorError::IngredientNotFound { .. }));
}

#[tokio::test]
async fn unknown_article() {
    let state = test_helpers::test_app_state();
    let admin = test_helpers::actor("u4", Role::Admin);
    let err = get_article(&state, &admin, Uuid::nil()).await.unwrap_err();
    assert!(matches!(err, CalculatorError::NotFound(id) if id.is_nil()));
}
