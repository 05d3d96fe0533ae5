//! Session token management.
//!
//! ARCHITECTURE
//! ============
//! Tokens map to member ids, not to a frozen copy of the member. The role is
//! looked up in the directory on every validation so a promotion applies to
//! sessions that are already open.

use std::fmt::Write;

use rand::Rng;

use crate::state::{AppState, Role, UserId};

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

/// The acting user of a request.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SessionUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Create a session for the given member, returning the token.
pub async fn create_session(state: &AppState, user_id: &str) -> String {
    let token = generate_token();
    state
        .sessions
        .write()
        .await
        .insert(token.clone(), user_id.to_owned());
    token
}

/// Resolve a session token to the member it belongs to.
///
/// Returns `None` for unknown tokens and for tokens whose member has since
/// disappeared from the directory.
pub async fn validate_session(state: &AppState, token: &str) -> Option<SessionUser> {
    let user_id = state.sessions.read().await.get(token).cloned()?;
    let members = state.members.read().await;
    members
        .iter()
        .find(|m| m.id == user_id)
        .map(|m| SessionUser { id: m.id.clone(), name: m.name.clone(), email: m.email.clone(), role: m.role })
}

/// Delete a session. Returns whether the token existed.
pub async fn delete_session(state: &AppState, token: &str) -> bool {
    state.sessions.write().await.remove(token).is_some()
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
