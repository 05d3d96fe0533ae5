use super::*;
use crate::state::{Role, test_helpers};

fn window(start: Time, end: Time) -> QuietHours {
    QuietHours { enabled: true, start, end }
}

// =============================================================================
// QuietHours
// =============================================================================

#[test]
fn overnight_window_wraps_midnight() {
    let quiet = window(time!(22:00), time!(7:00));
    assert!(quiet.contains(time!(23:30)));
    assert!(quiet.contains(time!(6:59)));
    assert!(quiet.contains(time!(22:00)));
    assert!(!quiet.contains(time!(7:00)));
    assert!(!quiet.contains(time!(12:00)));
}

#[test]
fn daytime_window_is_half_open() {
    let quiet = window(time!(12:00), time!(14:00));
    assert!(quiet.contains(time!(12:00)));
    assert!(quiet.contains(time!(13:59)));
    assert!(!quiet.contains(time!(14:00)));
    assert!(!quiet.contains(time!(23:00)));
}

#[test]
fn equal_bounds_are_empty() {
    let quiet = window(time!(8:00), time!(8:00));
    assert!(!quiet.contains(time!(8:00)));
    assert!(!quiet.contains(time!(20:00)));
}

#[test]
fn should_notify_honours_switches() {
    let mut settings = UserSettings::default();
    assert!(should_notify(&settings, time!(23:30)));

    settings.quiet_hours.enabled = true;
    assert!(!should_notify(&settings, time!(23:30)));
    assert!(should_notify(&settings, time!(12:00)));

    settings.notifications_enabled = false;
    assert!(!should_notify(&settings, time!(12:00)));
}

#[test]
fn settings_serialize_times_as_hh_mm() {
    let json = serde_json::to_value(UserSettings::default()).unwrap();
    assert_eq!(json["dark_mode"], true);
    assert_eq!(json["quiet_hours"]["enabled"], false);
    assert_eq!(json["quiet_hours"]["start"], "22:00");
    assert_eq!(json["quiet_hours"]["end"], "07:00");
}

// =============================================================================
// get / update
// =============================================================================

#[tokio::test]
async fn get_returns_defaults_for_new_user() {
    let state = test_helpers::test_app_state();
    let user = test_helpers::actor("u2", Role::User);
    assert_eq!(get(&state, &user).await, UserSettings::default());
}

#[tokio::test]
async fn update_applies_only_given_fields() {
    let state = test_helpers::test_app_state();
    let user = test_helpers::actor("u2", Role::User);

    let patch: SettingsPatch =
        serde_json::from_str(r#"{"dark_mode": false, "quiet_hours_enabled": true, "quiet_hours_start": "21:30"}"#)
            .unwrap();
    let updated = update(&state, &user, patch).await;

    assert!(!updated.dark_mode);
    assert!(updated.notifications_enabled);
    assert!(updated.quiet_hours.enabled);
    assert_eq!(updated.quiet_hours.start, time!(21:30));
    assert_eq!(updated.quiet_hours.end, time!(7:00));
    assert_eq!(get(&state, &user).await, updated);
}

#[tokio::test]
async fn settings_are_per_user() {
    let state = test_helpers::test_app_state();
    let sabine = test_helpers::actor("u2", Role::User);
    let thomas = test_helpers::actor("u3", Role::Vorstand);

    let patch = SettingsPatch { notifications_enabled: Some(false), ..SettingsPatch::default() };
    update(&state, &sabine, patch).await;

    assert!(!get(&state, &sabine).await.notifications_enabled);
    assert!(get(&state, &thomas).await.notifications_enabled);
}

#[tokio::test]
async fn notify_at_reads_stored_quiet_hours() {
    let state = test_helpers::test_app_state();
    let user = test_helpers::actor("u2", Role::User);
    assert!(notify_at(&state, &user, time!(23:30)).await);

    let patch = SettingsPatch { quiet_hours_enabled: Some(true), ..SettingsPatch::default() };
    update(&state, &user, patch).await;

    assert!(!notify_at(&state, &user, time!(23:30)).await);
    assert!(notify_at(&state, &user, time!(7:00)).await);
}
