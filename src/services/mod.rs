//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own business logic and capability checks so route
//! handlers can stay focused on JSON translation and session plumbing.
//! Every mutating operation receives the acting [`session::SessionUser`] and
//! calls [`require`] before it touches state.

pub mod auth;
pub mod calculator;
pub mod calendar;
pub mod members;
pub mod navigation;
pub mod poll;
pub mod seed;
pub mod session;
pub mod settings;

use crate::state::{Capability, Role, role_satisfies};

/// The actor's role does not grant the capability an operation needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("role {} lacks capability {}", .role.as_str(), .capability.as_str())]
pub struct Forbidden {
    pub role: Role,
    pub capability: Capability,
}

/// Capability check at the service boundary.
///
/// # Errors
///
/// Returns `Forbidden` if `actor`'s role does not satisfy `capability`.
pub fn require(actor: &session::SessionUser, capability: Capability) -> Result<(), Forbidden> {
    if role_satisfies(actor.role, capability) {
        Ok(())
    } else {
        tracing::debug!(user_id = %actor.id, role = actor.role.as_str(), capability = capability.as_str(), "capability refused");
        Err(Forbidden { role: actor.role, capability })
    }
}
