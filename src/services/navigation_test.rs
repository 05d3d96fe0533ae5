use super::*;

fn ids(role: Role) -> Vec<&'static str> {
    visible_items(role).iter().map(|item| item.id).collect()
}

#[test]
fn visitor_sees_overview_and_settings_only() {
    assert_eq!(ids(Role::Visitor), vec!["overview", "settings"]);
}

#[test]
fn user_gets_calendar_and_polls() {
    assert_eq!(ids(Role::User), vec!["overview", "calendar", "polls", "settings"]);
}

#[test]
fn vorstand_adds_members_and_calculator() {
    assert_eq!(ids(Role::Vorstand), vec!["overview", "calendar", "polls", "members", "logic", "settings"]);
}

#[test]
fn admins_see_everything_in_table_order() {
    let all: Vec<&str> = NAVIGATION_ITEMS.iter().map(|item| item.id).collect();
    assert_eq!(ids(Role::Admin), all);
    assert_eq!(ids(Role::Superadmin), all);
}

#[test]
fn roles_matrix_covers_every_capability() {
    let matrix = roles_matrix();
    assert_eq!(matrix.len(), Capability::ALL.len());

    let manage_admins = &matrix[0];
    assert_eq!(manage_admins.capability, Capability::ManageAdmins);
    assert_eq!(manage_admins.roles, vec![Role::Superadmin]);

    let view_app = matrix.iter().find(|row| row.capability == Capability::ViewApp).unwrap();
    assert_eq!(view_app.roles.len(), 5);

    let vote = matrix.iter().find(|row| row.capability == Capability::Vote).unwrap();
    assert!(!vote.roles.contains(&Role::Visitor));
}

#[test]
fn nav_item_serializes_roles_by_name() {
    let json = serde_json::to_value(NAVIGATION_ITEMS[3]).unwrap();
    assert_eq!(json["id"], "members");
    assert_eq!(json["allowed_roles"], serde_json::json!(["Vorstand", "Admin", "Superadmin"]));
}
