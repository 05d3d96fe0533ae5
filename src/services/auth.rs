//! Auth service — email login, captcha-guarded registration.
//!
//! DESIGN
//! ======
//! Login is a gate, not a credential check: any well-formed email with a
//! non-empty password gets a session. The configured superadmin email always
//! resolves to the Superadmin; every other address is looked up in (or added
//! to) the member directory. Registration adds a `Visitor` and is guarded by
//! a single-use arithmetic captcha.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::dates;
use crate::error::ErrorCode;
use crate::services::members::{self, ManagedUser, MemberError};
use crate::services::session::{self, SessionUser};
use crate::state::{AppState, Role};

pub const SUPERADMIN_NAME: &str = "System Admin";

/// Role given to addresses that log in without being in the directory.
pub const DEFAULT_MEMBER_ROLE: Role = Role::User;

/// Captchas older than this are purged and no longer accepted.
pub const CAPTCHA_TTL_MS: i64 = 10 * 60 * 1000;

/// Upper bound on outstanding captchas; the oldest is evicted beyond it.
pub const MAX_PENDING_CAPTCHAS: usize = 1024;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid email")]
    InvalidEmail,
    #[error("password must not be empty")]
    MissingPassword,
    #[error("name must not be empty")]
    MissingName,
    #[error("captcha answer does not match")]
    CaptchaMismatch,
    #[error(transparent)]
    Member(#[from] MemberError),
}

impl ErrorCode for AuthError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidEmail => "E_INVALID_EMAIL",
            Self::MissingPassword => "E_MISSING_PASSWORD",
            Self::MissingName => "E_MISSING_NAME",
            Self::CaptchaMismatch => "E_CAPTCHA_MISMATCH",
            Self::Member(err) => err.error_code(),
        }
    }
}

/// A fresh session and the member it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub token: String,
    pub user: SessionUser,
}

#[derive(Debug, Clone, Serialize)]
pub struct Captcha {
    pub id: Uuid,
    pub a: u8,
    pub b: u8,
    pub question: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub captcha_id: Uuid,
    pub captcha_answer: i64,
}

/// Lower-cased email with a non-empty local part and domain.
#[must_use]
pub fn normalize_email(raw: &str) -> Option<String> {
    let normalized = members::normalize_email(raw);
    let (local, domain) = normalized.split_once('@')?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return None;
    }
    Some(normalized)
}

fn name_from_email(email: &str) -> String {
    email
        .split('@')
        .next()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or("user")
        .to_owned()
}

fn session_user(member: ManagedUser) -> SessionUser {
    SessionUser { id: member.id, name: member.name, email: member.email, role: member.role }
}

async fn open_session(state: &AppState, member: ManagedUser) -> AuthSession {
    let token = session::create_session(state, &member.id).await;
    AuthSession { token, user: session_user(member) }
}

/// Directory entry for `email`, created with `name` and `role` if missing.
async fn find_or_insert(state: &AppState, email: &str, name: &str, role: Role) -> Result<ManagedUser, AuthError> {
    if let Some(existing) = members::find_by_email(state, email).await {
        return Ok(existing);
    }
    match members::insert_member(state, name, email, role).await {
        Ok(created) => Ok(created),
        // Lost a race with a concurrent login for the same address.
        Err(MemberError::EmailTaken(_)) => members::find_by_email(state, email)
            .await
            .ok_or_else(|| AuthError::Member(MemberError::EmailTaken(email.to_owned()))),
        Err(other) => Err(other.into()),
    }
}

// =============================================================================
// LOGIN
// =============================================================================

/// Log in by email and open a session.
///
/// # Errors
///
/// Returns `InvalidEmail` for a malformed address and `MissingPassword` for
/// an empty password.
pub async fn login(state: &AppState, email: &str, password: &str) -> Result<AuthSession, AuthError> {
    let email = normalize_email(email).ok_or(AuthError::InvalidEmail)?;
    if password.is_empty() {
        return Err(AuthError::MissingPassword);
    }

    let member = if email == state.config.superadmin_email {
        let member = find_or_insert(state, &email, SUPERADMIN_NAME, Role::Superadmin).await?;
        members::force_role(state, &member.id, Role::Superadmin)
            .await
            .ok_or_else(|| AuthError::Member(MemberError::NotFound(member.id.clone())))?
    } else {
        find_or_insert(state, &email, &name_from_email(&email), DEFAULT_MEMBER_ROLE).await?
    };

    info!(user_id = %member.id, role = member.role.as_str(), "login");
    Ok(open_session(state, member).await)
}

// =============================================================================
// REGISTRATION
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingCaptcha {
    pub answer: u8,
    pub issued_ms: i64,
}

impl PendingCaptcha {
    fn is_expired(&self, now_ms: i64) -> bool {
        now_ms - self.issued_ms >= CAPTCHA_TTL_MS
    }
}

/// Issue a single-use arithmetic captcha with addends in `1..=10`.
///
/// Expired captchas are purged first. If the store is still full, the
/// oldest outstanding captcha is evicted.
pub async fn issue_captcha(state: &AppState) -> Captcha {
    let (a, b) = {
        let mut rng = rand::rng();
        (rng.random_range(1..=10u8), rng.random_range(1..=10u8))
    };
    let id = Uuid::new_v4();
    let now = dates::now_ms();

    let mut captchas = state.captchas.write().await;
    captchas.retain(|_, pending| !pending.is_expired(now));
    while captchas.len() >= MAX_PENDING_CAPTCHAS {
        let Some(oldest) = captchas.iter().min_by_key(|(_, p)| p.issued_ms).map(|(id, _)| *id) else {
            break;
        };
        captchas.remove(&oldest);
    }
    captchas.insert(id, PendingCaptcha { answer: a + b, issued_ms: now });
    drop(captchas);

    Captcha { id, a, b, question: format!("{a} + {b} = ?") }
}

/// Register a new `Visitor` and open a session for them.
///
/// The captcha is consumed by every attempt, whether or not it matches.
///
/// # Errors
///
/// Returns `CaptchaMismatch` for a wrong answer or an unknown or expired captcha, field
/// validation errors, and `EmailTaken` (via `Member`) for a known address.
pub async fn register(state: &AppState, input: Registration) -> Result<AuthSession, AuthError> {
    let now = dates::now_ms();
    let expected = state
        .captchas
        .write()
        .await
        .remove(&input.captcha_id)
        .filter(|pending| !pending.is_expired(now))
        .map(|pending| i64::from(pending.answer));
    if expected != Some(input.captcha_answer) {
        warn!(captcha_id = %input.captcha_id, "captcha mismatch");
        return Err(AuthError::CaptchaMismatch);
    }

    let name = input.name.trim();
    if name.is_empty() {
        return Err(AuthError::MissingName);
    }
    let email = normalize_email(&input.email).ok_or(AuthError::InvalidEmail)?;
    if input.password.is_empty() {
        return Err(AuthError::MissingPassword);
    }

    let member = members::insert_member(state, name, &email, Role::Visitor).await?;
    info!(user_id = %member.id, "registered");
    Ok(open_session(state, member).await)
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
