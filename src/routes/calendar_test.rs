use super::*;
use crate::routes::test_helpers::{call, login_as};
use crate::state::{Role, test_helpers};
use axum::http::Method;
use serde_json::json;

#[tokio::test]
async fn quick_create_then_month_view() {
    let state = test_helpers::test_app_state();
    let board = login_as(&state, "u3", Role::Vorstand).await;

    let (status, created) = call(
        &state,
        Method::POST,
        "/api/calendar/2024-07-19/polls",
        Some(&board),
        Some(json!({ "question": "Grillfest?", "options": ["Ja", "Nein"], "time": "17:00" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["event_date"], "2024-07-19");
    assert_eq!(created["event_time"], "17:00");

    let (status, month) = call(&state, Method::GET, "/api/calendar?year=2024&month=7", Some(&board), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(month["leading_blanks"], 0);
    assert_eq!(month["days_in_month"], 31);
    assert_eq!(month["events"]["2024-07-19"][0]["question"], "Grillfest?");

    let (status, year) = call(&state, Method::GET, "/api/calendar/2024", Some(&board), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(year.as_array().unwrap().len(), 12);
    assert_eq!(year[6]["count"], 1);
}

#[tokio::test]
async fn quick_create_rejects_bad_date() {
    let state = test_helpers::test_app_state();
    let board = login_as(&state, "u3", Role::Vorstand).await;

    let (status, body) = call(
        &state,
        Method::POST,
        "/api/calendar/2024-02-30/polls",
        Some(&board),
        Some(json!({ "question": "Q?", "options": ["A", "B"] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E_BAD_REQUEST");
    assert!(state.polls.read().await.is_empty());
}

#[tokio::test]
async fn month_out_of_range_is_a_bad_request() {
    let state = test_helpers::test_app_state();
    let user = login_as(&state, "u2", Role::User).await;

    let (status, body) = call(&state, Method::GET, "/api/calendar?year=2024&month=13", Some(&user), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E_VALIDATION");
}
