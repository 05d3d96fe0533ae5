//! Navigation table and roles matrix.
//!
//! Both are static and advisory: they tell the client what to show. The
//! operations behind each screen still enforce capabilities themselves.

use serde::Serialize;

use crate::state::{Capability, Role, role_satisfies};

const EVERYONE: &[Role] = &[Role::Visitor, Role::User, Role::Vorstand, Role::Admin, Role::Superadmin];
const MEMBERS: &[Role] = &[Role::User, Role::Vorstand, Role::Admin, Role::Superadmin];
const BOARD: &[Role] = &[Role::Vorstand, Role::Admin, Role::Superadmin];
const ADMINS: &[Role] = &[Role::Admin, Role::Superadmin];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub id: &'static str,
    pub label: &'static str,
    pub allowed_roles: &'static [Role],
}

pub const NAVIGATION_ITEMS: [NavItem; 9] = [
    NavItem { id: "overview", label: "Übersicht", allowed_roles: EVERYONE },
    NavItem { id: "calendar", label: "Kalender", allowed_roles: MEMBERS },
    NavItem { id: "polls", label: "Umfragen", allowed_roles: MEMBERS },
    NavItem { id: "members", label: "Nutzer-Pool", allowed_roles: BOARD },
    NavItem { id: "logic", label: "Kalkulator", allowed_roles: BOARD },
    NavItem { id: "spec", label: "Spezifikation", allowed_roles: ADMINS },
    NavItem { id: "roles", label: "Rollen & Rechte", allowed_roles: ADMINS },
    NavItem { id: "data", label: "Datenmodell", allowed_roles: ADMINS },
    NavItem { id: "settings", label: "Optionen", allowed_roles: EVERYONE },
];

/// Items the role may open, in table order.
#[must_use]
pub fn visible_items(role: Role) -> Vec<NavItem> {
    NAVIGATION_ITEMS
        .iter()
        .copied()
        .filter(|item| item.allowed_roles.contains(&role))
        .collect()
}

/// One row of the roles matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityRow {
    pub capability: Capability,
    pub name: &'static str,
    pub description: &'static str,
    pub roles: Vec<Role>,
}

#[must_use]
pub fn roles_matrix() -> Vec<CapabilityRow> {
    Capability::ALL
        .into_iter()
        .map(|capability| {
            let (name, description) = capability.label();
            CapabilityRow {
                capability,
                name,
                description,
                roles: Role::ALL.into_iter().filter(|r| role_satisfies(*r, capability)).collect(),
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "navigation_test.rs"]
mod tests;
