use super::*;
use crate::routes::test_helpers::{call, login_as};
use crate::services::seed;
use crate::state::{Role, test_helpers};
use axum::http::Method;
use serde_json::json;

fn close(value: &serde_json::Value, expected: f64) -> bool {
    value.as_f64().is_some_and(|v| (v - expected).abs() < 1e-9)
}

#[tokio::test]
async fn burger_total_over_http() {
    let state = test_helpers::test_app_state();
    let burger = seed::burger_article();
    let article_id = burger.id;
    state.articles.write().await.push(burger);
    let board = login_as(&state, "u3", Role::Vorstand).await;

    let (status, view) = call(&state, Method::GET, &format!("/api/articles/{article_id}"), Some(&board), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(close(&view["total_cost"], 2.45));
    assert_eq!(view["ingredients"][2]["unit"], "g");
}

#[tokio::test]
async fn ingredient_lifecycle_over_http() {
    let state = test_helpers::test_app_state();
    let admin = login_as(&state, "u4", Role::Admin).await;

    let (status, article) =
        call(&state, Method::POST, "/api/articles", Some(&admin), Some(json!({ "name": "Bratwurst" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    let article_id = article["id"].as_str().unwrap().to_owned();

    let (status, added) = call(
        &state,
        Method::POST,
        &format!("/api/articles/{article_id}/ingredients"),
        Some(&admin),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(added["ingredients"][0]["name"], "Neue Zutat");
    let ingredient_id = added["ingredients"][0]["id"].as_str().unwrap().to_owned();
    let line_uri = format!("/api/articles/{article_id}/ingredients/{ingredient_id}");

    let (status, patched) = call(
        &state,
        Method::PATCH,
        &line_uri,
        Some(&admin),
        Some(json!({ "name": "Wurst", "used_quantity": 1, "reference_quantity": 1, "reference_price": 1.2, "unit": "piece" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(close(&patched["total_cost"], 1.2));

    let (status, body) =
        call(&state, Method::PATCH, &line_uri, Some(&admin), Some(json!({ "reference_quantity": 0 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E_VALIDATION");

    let (status, emptied) = call(&state, Method::DELETE, &line_uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(close(&emptied["total_cost"], 0.0));
}

#[tokio::test]
async fn calculator_is_closed_to_members() {
    let state = test_helpers::test_app_state();
    let user = login_as(&state, "u2", Role::User).await;

    let (status, body) = call(&state, Method::GET, "/api/articles", Some(&user), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "E_FORBIDDEN");
}
