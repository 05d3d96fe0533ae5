//! Poll service — the case lifecycle: create, vote, task, chat.
//!
//! DESIGN
//! ======
//! Polls live in one `Vec` ordered most-recent-first. Each operation checks
//! the actor's capability, resolves the poll through the visibility policy
//! (an invisible poll answers `NotFound`, the same as a missing one), then
//! mutates under the store's write lock and returns a viewer-specific
//! snapshot.
//!
//! INVARIANTS
//! ==========
//! - `total_votes == Σ option.votes` for every poll, always.
//! - A voter id appears at most once in `voted_user_ids`; a second vote is
//!   refused with `AlreadyVoted` before any counter moves.
//! - Options are fixed at creation; tasks and messages are append-only.

use serde::{Deserialize, Serialize};
use time::{Date, Time};
use tracing::{info, warn};
use uuid::Uuid;

use crate::dates;
use crate::services::session::SessionUser;
use crate::services::{Forbidden, require};
use crate::state::{AppState, Capability, Message, Poll, PollOption, Role, Task, TaskStatus, UserId};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("invalid poll input: {0}")]
    Validation(&'static str),
    #[error("poll not found: {0}")]
    NotFound(Uuid),
    #[error("option {option_id} does not belong to poll {poll_id}")]
    OptionNotFound { poll_id: Uuid, option_id: Uuid },
    #[error("task {task_id} not found on poll {poll_id}")]
    TaskNotFound { poll_id: Uuid, task_id: Uuid },
    #[error("user {user_id} already voted on poll {poll_id}")]
    AlreadyVoted { poll_id: Uuid, user_id: UserId },
    #[error(transparent)]
    Forbidden(#[from] Forbidden),
}

impl crate::error::ErrorCode for PollError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "E_VALIDATION",
            Self::NotFound(_) => "E_POLL_NOT_FOUND",
            Self::OptionNotFound { .. } => "E_OPTION_NOT_FOUND",
            Self::TaskNotFound { .. } => "E_TASK_NOT_FOUND",
            Self::AlreadyVoted { .. } => "E_ALREADY_VOTED",
            Self::Forbidden(_) => "E_FORBIDDEN",
        }
    }
}

/// Who may see a poll. Elevated roles always can.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Targeting {
    #[serde(default)]
    pub groups: Vec<Role>,
    #[serde(default)]
    pub user_ids: Vec<UserId>,
    #[serde(default)]
    pub all: bool,
}

impl Default for Targeting {
    fn default() -> Self {
        Self { groups: vec![Role::Admin, Role::Vorstand, Role::User], user_ids: Vec::new(), all: true }
    }
}

/// Input for [`create_poll`].
#[derive(Debug, Clone, Default)]
pub struct NewPoll {
    pub question: String,
    pub options: Vec<String>,
    pub targeting: Option<Targeting>,
    pub event_date: Option<Date>,
    pub event_time: Option<Time>,
}

/// A poll as seen by one viewer.
#[derive(Debug, Clone, Serialize)]
pub struct PollView {
    #[serde(flatten)]
    pub poll: Poll,
    pub has_voted: bool,
    pub created_at_label: String,
}

impl PollView {
    #[must_use]
    pub fn for_viewer(poll: Poll, viewer_id: &str) -> Self {
        let has_voted = poll.has_voted(viewer_id);
        let created_at_label = dates::german_long_date(poll.created_at);
        Self { poll, has_voted, created_at_label }
    }
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Trim option texts, drop empties, collapse duplicates to the first
/// occurrence. Fewer than two survivors is a validation error.
///
/// # Errors
///
/// Returns `Validation` if fewer than two distinct non-empty texts remain.
pub fn normalize_options(raw: &[String]) -> Result<Vec<String>, PollError> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for text in raw.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        if !out.iter().any(|existing| existing == text) {
            out.push(text.to_owned());
        }
    }
    if out.len() < 2 {
        return Err(PollError::Validation("at least two distinct options are required"));
    }
    Ok(out)
}

fn fresh_id(existing: &[Poll]) -> Uuid {
    loop {
        let id = Uuid::new_v4();
        if !existing.iter().any(|p| p.id == id) {
            return id;
        }
    }
}

/// Find a poll the actor is allowed to see.
fn visible_mut<'a>(polls: &'a mut [Poll], actor: &SessionUser, poll_id: Uuid) -> Result<&'a mut Poll, PollError> {
    polls
        .iter_mut()
        .find(|p| p.id == poll_id && p.is_visible_to(&actor.id, actor.role))
        .ok_or(PollError::NotFound(poll_id))
}

// =============================================================================
// CREATE
// =============================================================================

/// Create a poll and prepend it to the store.
///
/// # Errors
///
/// Returns `Forbidden` without `CreatePolls`, and `Validation` for an empty
/// question or fewer than two distinct options. Nothing is stored on error.
pub async fn create_poll(state: &AppState, actor: &SessionUser, input: NewPoll) -> Result<PollView, PollError> {
    require(actor, Capability::CreatePolls)?;

    let question = input.question.trim();
    if question.is_empty() {
        return Err(PollError::Validation("question must not be empty"));
    }
    let texts = normalize_options(&input.options)?;
    let targeting = input.targeting.unwrap_or_default();

    let mut polls = state.polls.write().await;
    let poll = Poll {
        id: fresh_id(&polls),
        question: question.to_owned(),
        options: texts
            .into_iter()
            .map(|text| PollOption { id: Uuid::new_v4(), text, votes: 0 })
            .collect(),
        total_votes: 0,
        voted_user_ids: Vec::new(),
        target_groups: targeting.groups,
        target_user_ids: targeting.user_ids,
        is_all_targeted: targeting.all,
        tasks: Vec::new(),
        messages: Vec::new(),
        created_at: dates::today(),
        created_by: Some(actor.id.clone()),
        event_date: input.event_date,
        event_time: input.event_time,
    };

    polls.insert(0, poll.clone());
    info!(poll_id = %poll.id, options = poll.options.len(), created_by = %actor.id, "poll created");
    Ok(PollView::for_viewer(poll, &actor.id))
}

// =============================================================================
// QUERIES
// =============================================================================

/// All polls visible to the actor, in store order (newest first).
pub async fn visible_polls(state: &AppState, actor: &SessionUser) -> Vec<PollView> {
    let polls = state.polls.read().await;
    polls
        .iter()
        .filter(|p| p.is_visible_to(&actor.id, actor.role))
        .map(|p| PollView::for_viewer(p.clone(), &actor.id))
        .collect()
}

/// A single visible poll.
///
/// # Errors
///
/// Returns `NotFound` if the poll is missing or hidden from the actor.
pub async fn get_poll(state: &AppState, actor: &SessionUser, poll_id: Uuid) -> Result<PollView, PollError> {
    let polls = state.polls.read().await;
    polls
        .iter()
        .find(|p| p.id == poll_id && p.is_visible_to(&actor.id, actor.role))
        .map(|p| PollView::for_viewer(p.clone(), &actor.id))
        .ok_or(PollError::NotFound(poll_id))
}

// =============================================================================
// VOTE
// =============================================================================

/// Cast the actor's single vote.
///
/// # Errors
///
/// Returns `Forbidden` for visitors, `NotFound` / `OptionNotFound` for
/// unknown ids, and `AlreadyVoted` on a repeat attempt. Counters are only
/// touched once every check has passed.
pub async fn cast_vote(
    state: &AppState,
    actor: &SessionUser,
    poll_id: Uuid,
    option_id: Uuid,
) -> Result<PollView, PollError> {
    require(actor, Capability::Vote)?;

    let mut polls = state.polls.write().await;
    let poll = visible_mut(&mut polls, actor, poll_id)?;

    if poll.has_voted(&actor.id) {
        warn!(%poll_id, user_id = %actor.id, "duplicate vote refused");
        return Err(PollError::AlreadyVoted { poll_id, user_id: actor.id.clone() });
    }
    let option = poll
        .options
        .iter_mut()
        .find(|o| o.id == option_id)
        .ok_or(PollError::OptionNotFound { poll_id, option_id })?;

    option.votes += 1;
    poll.total_votes += 1;
    poll.voted_user_ids.push(actor.id.clone());
    debug_assert_eq!(poll.total_votes, poll.vote_sum());

    info!(%poll_id, %option_id, user_id = %actor.id, total = poll.total_votes, "vote cast");
    Ok(PollView::for_viewer(poll.clone(), &actor.id))
}

// =============================================================================
// TASKS
// =============================================================================

/// Append an `OPEN` task to a poll.
///
/// # Errors
///
/// Returns `Forbidden` without `AssignTasks`, `Validation` for a blank title
/// or assignee, and `NotFound` for unknown polls.
pub async fn add_task(
    state: &AppState,
    actor: &SessionUser,
    poll_id: Uuid,
    title: &str,
    assignee_id: &str,
) -> Result<PollView, PollError> {
    require(actor, Capability::AssignTasks)?;

    let title = title.trim();
    let assignee_id = assignee_id.trim();
    if title.is_empty() {
        return Err(PollError::Validation("task title must not be empty"));
    }
    if assignee_id.is_empty() {
        return Err(PollError::Validation("task assignee must not be empty"));
    }

    let mut polls = state.polls.write().await;
    let poll = visible_mut(&mut polls, actor, poll_id)?;
    let task = Task {
        id: Uuid::new_v4(),
        title: title.to_owned(),
        assigned_user_id: assignee_id.to_owned(),
        status: TaskStatus::Open,
    };
    info!(%poll_id, task_id = %task.id, %assignee_id, "task added");
    poll.tasks.push(task);
    Ok(PollView::for_viewer(poll.clone(), &actor.id))
}

/// Flip a task between `OPEN` and `COMPLETED`.
///
/// # Errors
///
/// Returns `Forbidden` for visitors and `NotFound` / `TaskNotFound` for
/// unknown ids.
pub async fn toggle_task_status(
    state: &AppState,
    actor: &SessionUser,
    poll_id: Uuid,
    task_id: Uuid,
) -> Result<PollView, PollError> {
    require(actor, Capability::Vote)?;

    let mut polls = state.polls.write().await;
    let poll = visible_mut(&mut polls, actor, poll_id)?;
    let task = poll
        .tasks
        .iter_mut()
        .find(|t| t.id == task_id)
        .ok_or(PollError::TaskNotFound { poll_id, task_id })?;

    task.status = task.status.toggled();
    info!(%poll_id, %task_id, status = ?task.status, "task toggled");
    Ok(PollView::for_viewer(poll.clone(), &actor.id))
}

// =============================================================================
// CHAT
// =============================================================================

/// Append a chat message from the actor.
///
/// # Errors
///
/// Returns `Forbidden` for visitors, `Validation` for blank text, and
/// `NotFound` for unknown polls.
pub async fn post_message(
    state: &AppState,
    actor: &SessionUser,
    poll_id: Uuid,
    text: &str,
) -> Result<PollView, PollError> {
    require(actor, Capability::Vote)?;

    let text = text.trim();
    if text.is_empty() {
        return Err(PollError::Validation("message text must not be empty"));
    }

    let mut polls = state.polls.write().await;
    let poll = visible_mut(&mut polls, actor, poll_id)?;
    let message = Message {
        id: Uuid::new_v4(),
        sender_id: actor.id.clone(),
        sender_name: actor.name.clone(),
        text: text.to_owned(),
        ts: dates::now_ms(),
    };
    info!(%poll_id, message_id = %message.id, sender_id = %actor.id, "message posted");
    poll.messages.push(message);
    Ok(PollView::for_viewer(poll.clone(), &actor.id))
}

#[cfg(test)]
#[path = "poll_test.rs"]
mod tests;
