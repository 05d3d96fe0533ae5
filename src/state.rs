//! Shared application state and the records it owns.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! Every store is an `Arc<RwLock<..>>`; mutations take the write lock for
//! the whole read-modify-write so vote counters never interleave. Nothing
//! is persisted: the process is the source of truth.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::{Date, Time};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::dates;
use crate::services::auth::PendingCaptcha;
use crate::services::calculator::SalesArticle;
use crate::services::members::ManagedUser;
use crate::services::settings::UserSettings;

/// Directory identifier of a club member.
pub type UserId = String;

// =============================================================================
// ROLES & CAPABILITIES
// =============================================================================

/// Club roles, highest privilege first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Superadmin,
    Admin,
    Vorstand,
    User,
    Visitor,
}

impl Role {
    pub const ALL: [Role; 5] = [Role::Superadmin, Role::Admin, Role::Vorstand, Role::User, Role::Visitor];

    /// Superadmin, Admin and Vorstand see every poll and may create them.
    #[must_use]
    pub fn is_elevated(self) -> bool {
        matches!(self, Role::Superadmin | Role::Admin | Role::Vorstand)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Superadmin => "Superadmin",
            Role::Admin => "Admin",
            Role::Vorstand => "Vorstand",
            Role::User => "User",
            Role::Visitor => "Visitor",
        }
    }

    /// Case-insensitive parse of the role name.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL.into_iter().find(|role| role.as_str().eq_ignore_ascii_case(raw))
    }
}

/// Actions gated by role. Mirrors the club's roles matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ManageAdmins,
    ManageUsers,
    AssignRoles,
    CreatePolls,
    AssignTasks,
    Vote,
    UploadReceipts,
    ViewApp,
    ViewMembers,
    EditCalculator,
}

impl Capability {
    pub const ALL: [Capability; 10] = [
        Capability::ManageAdmins,
        Capability::ManageUsers,
        Capability::AssignRoles,
        Capability::CreatePolls,
        Capability::AssignTasks,
        Capability::Vote,
        Capability::UploadReceipts,
        Capability::ViewApp,
        Capability::ViewMembers,
        Capability::EditCalculator,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Capability::ManageAdmins => "manage_admins",
            Capability::ManageUsers => "manage_users",
            Capability::AssignRoles => "assign_roles",
            Capability::CreatePolls => "create_polls",
            Capability::AssignTasks => "assign_tasks",
            Capability::Vote => "vote",
            Capability::UploadReceipts => "upload_receipts",
            Capability::ViewApp => "view_app",
            Capability::ViewMembers => "view_members",
            Capability::EditCalculator => "edit_calculator",
        }
    }

    /// Display name and short description, as shown in the roles matrix.
    #[must_use]
    pub fn label(self) -> (&'static str, &'static str) {
        match self {
            Capability::ManageAdmins => ("Admin Management", "Admins ernennen"),
            Capability::ManageUsers => ("User Management", "Sperren/Freischalten"),
            Capability::AssignRoles => ("Rollen-Zuweisung", "Rechte ändern"),
            Capability::CreatePolls => ("Umfragen", "Neu anlegen"),
            Capability::AssignTasks => ("Tasks", "Zuweisen"),
            Capability::Vote => ("Abstimmen", "Teilnahme"),
            Capability::UploadReceipts => ("Beleg-Upload", "Einreichung"),
            Capability::ViewApp => ("App View", "Lesezugriff"),
            Capability::ViewMembers => ("Nutzer-Pool", "Einsehen"),
            Capability::EditCalculator => ("Kalkulator", "Bearbeiten"),
        }
    }
}

/// Whether `role` grants `capability`.
#[must_use]
pub fn role_satisfies(role: Role, capability: Capability) -> bool {
    match capability {
        Capability::ManageAdmins => role == Role::Superadmin,
        Capability::ManageUsers | Capability::AssignRoles => matches!(role, Role::Superadmin | Role::Admin),
        Capability::CreatePolls | Capability::AssignTasks | Capability::ViewMembers | Capability::EditCalculator => {
            role.is_elevated()
        }
        Capability::Vote | Capability::UploadReceipts => role != Role::Visitor,
        Capability::ViewApp => true,
    }
}

// =============================================================================
// POLL RECORDS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollOption {
    pub id: Uuid,
    pub text: String,
    pub votes: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Open,
    Completed,
}

impl TaskStatus {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            TaskStatus::Open => TaskStatus::Completed,
            TaskStatus::Completed => TaskStatus::Open,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub assigned_user_id: UserId,
    pub status: TaskStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: UserId,
    pub sender_name: String,
    pub text: String,
    /// Milliseconds since Unix epoch, captured when the message was posted.
    pub ts: i64,
}

/// A poll ("case"): question, options, votes, plus its tasks and chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poll {
    pub id: Uuid,
    pub question: String,
    pub options: Vec<PollOption>,
    pub total_votes: u32,
    /// Append-only; one entry per successful vote.
    pub voted_user_ids: Vec<UserId>,
    pub target_groups: Vec<Role>,
    pub target_user_ids: Vec<UserId>,
    pub is_all_targeted: bool,
    pub tasks: Vec<Task>,
    pub messages: Vec<Message>,
    #[serde(with = "dates::date")]
    pub created_at: Date,
    pub created_by: Option<UserId>,
    #[serde(with = "dates::option_date", default, skip_serializing_if = "Option::is_none")]
    pub event_date: Option<Date>,
    #[serde(with = "dates::option_time", default, skip_serializing_if = "Option::is_none")]
    pub event_time: Option<Time>,
}

impl Poll {
    #[must_use]
    pub fn has_voted(&self, user_id: &str) -> bool {
        self.voted_user_ids.iter().any(|id| id == user_id)
    }

    /// Elevated roles see everything; others need all-targeting, a matching
    /// group, or an explicit user target.
    #[must_use]
    pub fn is_visible_to(&self, user_id: &str, role: Role) -> bool {
        role.is_elevated()
            || self.is_all_targeted
            || self.target_groups.contains(&role)
            || self.target_user_ids.iter().any(|id| id == user_id)
    }

    /// Sum of per-option votes. Always equals `total_votes`.
    #[must_use]
    pub fn vote_sum(&self) -> u32 {
        self.options.iter().map(|o| o.votes).sum()
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Polls, most recently created first.
    pub polls: Arc<RwLock<Vec<Poll>>>,
    pub members: Arc<RwLock<Vec<ManagedUser>>>,
    pub articles: Arc<RwLock<Vec<SalesArticle>>>,
    pub settings: Arc<RwLock<HashMap<UserId, UserSettings>>>,
    /// Session token -> member id.
    pub sessions: Arc<RwLock<HashMap<String, UserId>>>,
    /// Outstanding captchas. Entries are consumed on first use and purged
    /// once expired.
    pub captchas: Arc<RwLock<HashMap<Uuid, PendingCaptcha>>>,
}

impl AppState {
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config: Arc::new(config),
            polls: Arc::new(RwLock::new(Vec::new())),
            members: Arc::new(RwLock::new(Vec::new())),
            articles: Arc::new(RwLock::new(Vec::new())),
            settings: Arc::new(RwLock::new(HashMap::new())),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            captchas: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
