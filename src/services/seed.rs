//! Demo club data loaded at startup when `GUG_SEED_DEMO` is on.

use time::macros::{date, datetime, time};
use tracing::info;
use uuid::Uuid;

use crate::services::calculator::{Ingredient, SalesArticle, Unit};
use crate::services::members::ManagedUser;
use crate::state::{AppState, Message, Poll, PollOption, Role, Task, TaskStatus};

fn option(text: &str, votes: u32) -> PollOption {
    PollOption { id: Uuid::new_v4(), text: text.to_owned(), votes }
}

fn member(id: &str, name: &str, email: &str, role: Role, joined: time::Date) -> ManagedUser {
    ManagedUser { id: id.to_owned(), name: name.to_owned(), email: email.to_owned(), role, joined }
}

fn ingredient(name: &str, used: f64, reference: f64, price: f64, unit: Unit) -> Ingredient {
    Ingredient {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        used_quantity: used,
        reference_quantity: reference,
        reference_price: price,
        unit,
    }
}

#[must_use]
pub fn barbecue_poll() -> Poll {
    let options = vec![
        option("Samstag, 12. Juli", 12),
        option("Sonntag, 13. Juli", 8),
        option("Samstag, 19. Juli", 15),
    ];
    let total_votes = options.iter().map(|o| o.votes).sum();

    Poll {
        id: Uuid::new_v4(),
        question: "Wann soll das nächste Grillfest stattfinden?".into(),
        options,
        total_votes,
        voted_user_ids: vec!["u1".into(), "u2".into(), "u3".into()],
        target_groups: vec![Role::Admin, Role::Vorstand, Role::User],
        target_user_ids: Vec::new(),
        is_all_targeted: true,
        tasks: vec![Task {
            id: Uuid::new_v4(),
            title: "Grillkohle besorgen".into(),
            assigned_user_id: "u2".into(),
            status: TaskStatus::Open,
        }],
        messages: vec![Message {
            id: Uuid::new_v4(),
            sender_id: "u2".into(),
            sender_name: "Sabine Maier".into(),
            text: "Freue mich schon!".into(),
            ts: datetime!(2024-05-20 12:00 UTC).unix_timestamp() * 1000,
        }],
        created_at: date!(2024 - 05 - 20),
        created_by: None,
        event_date: Some(date!(2024 - 07 - 19)),
        event_time: Some(time!(17:00)),
    }
}

#[must_use]
pub fn demo_members() -> Vec<ManagedUser> {
    vec![
        member("1", "Max Mustermann", "max@gug.de", Role::Visitor, date!(2025 - 02 - 12)),
        member("2", "Sabine Grill", "sabine@gug.de", Role::User, date!(2025 - 01 - 05)),
        member("3", "Thomas Vorstand", "thomas@gug.de", Role::Vorstand, date!(2024 - 12 - 20)),
    ]
}

#[must_use]
pub fn burger_article() -> SalesArticle {
    SalesArticle {
        id: Uuid::new_v4(),
        name: "Burger".into(),
        ingredients: vec![
            ingredient("Bun", 1.0, 1.0, 0.8, Unit::Piece),
            ingredient("Patty", 1.0, 1.0, 1.5, Unit::Piece),
            ingredient("Salz", 5.0, 100.0, 3.0, Unit::G),
        ],
    }
}

/// Load the demo data into empty stores. Stores that already hold records
/// are left alone.
pub async fn seed_demo(state: &AppState) {
    {
        let mut polls = state.polls.write().await;
        if polls.is_empty() {
            polls.push(barbecue_poll());
        }
    }
    {
        let mut members = state.members.write().await;
        if members.is_empty() {
            members.extend(demo_members());
        }
    }
    {
        let mut articles = state.articles.write().await;
        if articles.is_empty() {
            articles.push(burger_article());
        }
    }
    info!("demo data seeded");
}

#[cfg(test)]
#[path = "seed_test.rs"]
mod tests;
