//! Per-user display and notification preferences.

use serde::{Deserialize, Serialize};
use time::Time;
use time::macros::time;
use tracing::info;

use crate::dates;
use crate::services::session::SessionUser;
use crate::state::AppState;

/// Daily window in which notifications are held back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuietHours {
    pub enabled: bool,
    #[serde(with = "dates::time_of_day")]
    pub start: Time,
    #[serde(with = "dates::time_of_day")]
    pub end: Time,
}

impl Default for QuietHours {
    fn default() -> Self {
        Self { enabled: false, start: time!(22:00), end: time!(7:00) }
    }
}

impl QuietHours {
    /// Whether `t` falls in `[start, end)`. A window with `start > end`
    /// wraps past midnight; `start == end` is empty.
    #[must_use]
    pub fn contains(&self, t: Time) -> bool {
        if self.start <= self.end {
            self.start <= t && t < self.end
        } else {
            t >= self.start || t < self.end
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    pub dark_mode: bool,
    pub notifications_enabled: bool,
    pub quiet_hours: QuietHours,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self { dark_mode: true, notifications_enabled: true, quiet_hours: QuietHours::default() }
    }
}

/// Partial update; absent fields are left as they are.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsPatch {
    pub dark_mode: Option<bool>,
    pub notifications_enabled: Option<bool>,
    pub quiet_hours_enabled: Option<bool>,
    #[serde(with = "dates::option_time", default)]
    pub quiet_hours_start: Option<Time>,
    #[serde(with = "dates::option_time", default)]
    pub quiet_hours_end: Option<Time>,
}

/// Whether a notification at `t` should be delivered.
#[must_use]
pub fn should_notify(settings: &UserSettings, t: Time) -> bool {
    settings.notifications_enabled && !(settings.quiet_hours.enabled && settings.quiet_hours.contains(t))
}

/// Whether the actor's own settings let a notification through at `at`.
pub async fn notify_at(state: &AppState, actor: &SessionUser, at: Time) -> bool {
    should_notify(&get(state, actor).await, at)
}

/// Stored settings for the actor, or the defaults.
pub async fn get(state: &AppState, actor: &SessionUser) -> UserSettings {
    state.settings.read().await.get(&actor.id).copied().unwrap_or_default()
}

/// Apply `patch` to the actor's settings and return the result.
pub async fn update(state: &AppState, actor: &SessionUser, patch: SettingsPatch) -> UserSettings {
    let mut all = state.settings.write().await;
    let settings = all.entry(actor.id.clone()).or_default();

    if let Some(v) = patch.dark_mode {
        settings.dark_mode = v;
    }
    if let Some(v) = patch.notifications_enabled {
        settings.notifications_enabled = v;
    }
    if let Some(v) = patch.quiet_hours_enabled {
        settings.quiet_hours.enabled = v;
    }
    if let Some(t) = patch.quiet_hours_start {
        settings.quiet_hours.start = t;
    }
    if let Some(t) = patch.quiet_hours_end {
        settings.quiet_hours.end = t;
    }

    info!(user_id = %actor.id, "settings updated");
    *settings
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
