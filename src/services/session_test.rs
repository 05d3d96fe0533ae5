use super::*;
use crate::state::test_helpers;

// =============================================================================
// bytes_to_hex
// =============================================================================

#[test]
fn bytes_to_hex_empty() {
    assert_eq!(bytes_to_hex(&[]), "");
}

#[test]
fn bytes_to_hex_leading_zero() {
    assert_eq!(bytes_to_hex(&[0x0a]), "0a");
}

#[test]
fn bytes_to_hex_multi_byte() {
    assert_eq!(bytes_to_hex(&[0xde, 0xad, 0xbe, 0xef]), "deadbeef");
}

// =============================================================================
// generate_token
// =============================================================================

#[test]
fn generate_token_is_64_hex_chars() {
    let token = generate_token();
    assert_eq!(token.len(), 64);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn generate_token_two_calls_differ() {
    assert_ne!(generate_token(), generate_token());
}

// =============================================================================
// session lifecycle
// =============================================================================

#[tokio::test]
async fn validate_session_resolves_member() {
    let state = test_helpers::test_app_state();
    test_helpers::seed_member(&state, "u2", "Sabine Maier", Role::User).await;

    let token = create_session(&state, "u2").await;
    let user = validate_session(&state, &token).await.unwrap();
    assert_eq!(user.id, "u2");
    assert_eq!(user.name, "Sabine Maier");
    assert_eq!(user.role, Role::User);
}

#[tokio::test]
async fn validate_session_sees_role_changes() {
    let state = test_helpers::test_app_state();
    test_helpers::seed_member(&state, "1", "Max Mustermann", Role::Visitor).await;
    let token = create_session(&state, "1").await;

    state.members.write().await[0].role = Role::User;

    let user = validate_session(&state, &token).await.unwrap();
    assert_eq!(user.role, Role::User);
}

#[tokio::test]
async fn validate_session_unknown_token() {
    let state = test_helpers::test_app_state();
    assert!(validate_session(&state, "deadbeef").await.is_none());
}

#[tokio::test]
async fn validate_session_member_removed() {
    let state = test_helpers::test_app_state();
    let token = create_session(&state, "ghost").await;
    assert!(validate_session(&state, &token).await.is_none());
}

#[tokio::test]
async fn delete_session_invalidates_token() {
    let state = test_helpers::test_app_state();
    test_helpers::seed_member(&state, "u2", "Sabine Maier", Role::User).await;
    let token = create_session(&state, "u2").await;

    assert!(delete_session(&state, &token).await);
    assert!(!delete_session(&state, &token).await);
    assert!(validate_session(&state, &token).await.is_none());
}
