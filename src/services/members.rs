//! Member directory — listing, search, and role promotion.
//!
//! DESIGN
//! ======
//! Promotion is a direct overwrite of the stored role. The rules are
//! deliberately narrow: Admins admit Visitors as members or board
//! (`Vorstand`), and only the Superadmin appoints Admins. Nobody creates a
//! Superadmin and there is no demotion path.

use serde::{Deserialize, Serialize};
use time::Date;
use tracing::info;
use uuid::Uuid;

use crate::dates;
use crate::services::session::SessionUser;
use crate::services::{Forbidden, require};
use crate::state::{AppState, Capability, Role, UserId};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedUser {
    pub id: UserId,
    pub name: String,
    /// Stored lower-cased and trimmed.
    pub email: String,
    pub role: Role,
    #[serde(with = "dates::date")]
    pub joined: Date,
}

#[derive(Debug, thiserror::Error)]
pub enum MemberError {
    #[error("member not found: {0}")]
    NotFound(UserId),
    #[error("email already registered: {0}")]
    EmailTaken(String),
    #[error("{} may not change a {} to {}", .actor.as_str(), .current.as_str(), .requested.as_str())]
    RoleChangeRefused { actor: Role, current: Role, requested: Role },
    #[error(transparent)]
    Forbidden(#[from] Forbidden),
}

impl crate::error::ErrorCode for MemberError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_MEMBER_NOT_FOUND",
            Self::EmailTaken(_) => "E_EMAIL_TAKEN",
            Self::RoleChangeRefused { .. } => "E_ROLE_CHANGE_REFUSED",
            Self::Forbidden(_) => "E_FORBIDDEN",
        }
    }
}

#[must_use]
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

/// Case-insensitive substring match on name or email. An empty query matches.
#[must_use]
pub fn matches_query(user: &ManagedUser, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    needle.is_empty() || user.name.to_lowercase().contains(&needle) || user.email.to_lowercase().contains(&needle)
}

/// Whether `actor` may move a member from `current` to `requested`.
#[must_use]
pub fn can_assign_role(actor: Role, current: Role, requested: Role) -> bool {
    match requested {
        Role::User | Role::Vorstand => matches!(actor, Role::Admin | Role::Superadmin) && current == Role::Visitor,
        Role::Admin => actor == Role::Superadmin && !matches!(current, Role::Admin | Role::Superadmin),
        Role::Superadmin | Role::Visitor => false,
    }
}

// =============================================================================
// QUERIES
// =============================================================================

/// List directory members, optionally filtered by a search query.
///
/// # Errors
///
/// Returns `Forbidden` unless the actor may view the directory.
pub async fn list_members(
    state: &AppState,
    actor: &SessionUser,
    query: Option<&str>,
) -> Result<Vec<ManagedUser>, MemberError> {
    require(actor, Capability::ViewMembers)?;
    let members = state.members.read().await;
    Ok(members
        .iter()
        .filter(|m| query.is_none_or(|q| matches_query(m, q)))
        .cloned()
        .collect())
}

pub(crate) async fn find_by_email(state: &AppState, email: &str) -> Option<ManagedUser> {
    let email = normalize_email(email);
    let members = state.members.read().await;
    members.iter().find(|m| m.email == email).cloned()
}

// =============================================================================
// MUTATIONS
// =============================================================================

/// Add a member to the directory with a fresh id and today's join date.
///
/// # Errors
///
/// Returns `EmailTaken` if a member with the same email exists.
pub(crate) async fn insert_member(
    state: &AppState,
    name: &str,
    email: &str,
    role: Role,
) -> Result<ManagedUser, MemberError> {
    let email = normalize_email(email);
    let mut members = state.members.write().await;
    if members.iter().any(|m| m.email == email) {
        return Err(MemberError::EmailTaken(email));
    }

    let user = ManagedUser {
        id: Uuid::new_v4().to_string(),
        name: name.trim().to_owned(),
        email,
        role,
        joined: dates::today(),
    };
    members.push(user.clone());
    info!(user_id = %user.id, role = role.as_str(), "member added");
    Ok(user)
}

/// Overwrite a member's role without the promotion rules. Used when the
/// configured superadmin email logs in.
pub(crate) async fn force_role(state: &AppState, user_id: &str, role: Role) -> Option<ManagedUser> {
    let mut members = state.members.write().await;
    let member = members.iter_mut().find(|m| m.id == user_id)?;
    if member.role != role {
        info!(%user_id, from = member.role.as_str(), to = role.as_str(), "member role forced");
        member.role = role;
    }
    Some(member.clone())
}

/// Change a member's role, subject to [`can_assign_role`].
///
/// # Errors
///
/// Returns `Forbidden` without `AssignRoles`, `NotFound` for unknown ids,
/// and `RoleChangeRefused` when the transition is not allowed.
pub async fn promote(
    state: &AppState,
    actor: &SessionUser,
    user_id: &str,
    requested: Role,
) -> Result<ManagedUser, MemberError> {
    require(actor, Capability::AssignRoles)?;

    let mut members = state.members.write().await;
    let member = members
        .iter_mut()
        .find(|m| m.id == user_id)
        .ok_or_else(|| MemberError::NotFound(user_id.to_owned()))?;

    if !can_assign_role(actor.role, member.role, requested) {
        return Err(MemberError::RoleChangeRefused { actor: actor.role, current: member.role, requested });
    }

    let previous = member.role;
    member.role = requested;
    info!(%user_id, from = previous.as_str(), to = requested.as_str(), by = %actor.id, "member role changed");
    Ok(member.clone())
}

#[cfg(test)]
#[path = "members_test.rs"]
mod tests;
