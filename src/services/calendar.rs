//! Calendar projection — polls grouped by their scheduled event date.
//!
//! DESIGN
//! ======
//! The calendar owns no data. Every view is computed from the poll store on
//! demand, filtered by the same visibility policy as the poll list. Month
//! grids are Monday-first, matching the club's printed calendar.

use std::collections::BTreeMap;

use serde::Serialize;
use time::{Date, Month, Time};

use crate::dates;
use crate::error::ErrorCode;
use crate::services::poll::{self, NewPoll, PollError, PollView};
use crate::services::session::SessionUser;
use crate::state::{AppState, Poll};

#[derive(Debug, thiserror::Error)]
pub enum CalendarError {
    #[error("invalid calendar request: {0}")]
    Validation(&'static str),
    #[error(transparent)]
    Poll(#[from] PollError),
}

impl ErrorCode for CalendarError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "E_VALIDATION",
            Self::Poll(err) => err.error_code(),
        }
    }
}

/// One month of the calendar grid.
#[derive(Debug, Clone, Serialize)]
pub struct MonthView {
    pub year: i32,
    pub month: u8,
    pub month_name: &'static str,
    /// Empty cells before the 1st in a Monday-first week row.
    pub leading_blanks: u8,
    pub days_in_month: u8,
    /// `YYYY-MM-DD` -> polls scheduled that day, in store order.
    pub events: BTreeMap<String, Vec<PollView>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthCount {
    pub month: u8,
    pub month_name: &'static str,
    pub count: usize,
}

/// Index polls that carry an event date by that date.
#[must_use]
pub fn events_by_date(polls: &[Poll]) -> BTreeMap<Date, Vec<Poll>> {
    let mut by_date: BTreeMap<Date, Vec<Poll>> = BTreeMap::new();
    for poll in polls {
        if let Some(date) = poll.event_date {
            by_date.entry(date).or_default().push(poll.clone());
        }
    }
    by_date
}

fn first_of_month(year: i32, month: u8) -> Result<Date, CalendarError> {
    let month = Month::try_from(month).map_err(|_| CalendarError::Validation("month must be between 1 and 12"))?;
    Date::from_calendar_date(year, month, 1).map_err(|_| CalendarError::Validation("year out of range"))
}

fn last_day_of_month(first: Date) -> u8 {
    first.month().length(first.year())
}

async fn visible_events(state: &AppState, actor: &SessionUser) -> BTreeMap<Date, Vec<Poll>> {
    let polls = state.polls.read().await;
    let visible: Vec<Poll> = polls
        .iter()
        .filter(|p| p.is_visible_to(&actor.id, actor.role))
        .cloned()
        .collect();
    events_by_date(&visible)
}

/// Month grid with the visible polls scheduled in it.
///
/// # Errors
///
/// Returns `Validation` for a month outside 1..=12 or an unsupported year.
pub async fn month_view(state: &AppState, actor: &SessionUser, year: i32, month: u8) -> Result<MonthView, CalendarError> {
    let first = first_of_month(year, month)?;
    let events = visible_events(state, actor)
        .await
        .into_iter()
        .filter(|(date, _)| date.year() == year && date.month() == first.month())
        .map(|(date, polls)| {
            let views = polls.into_iter().map(|p| PollView::for_viewer(p, &actor.id)).collect();
            (dates::format_date(date), views)
        })
        .collect();

    Ok(MonthView {
        year,
        month,
        month_name: dates::german_month_name(first.month()),
        leading_blanks: first.weekday().number_days_from_monday(),
        days_in_month: last_day_of_month(first),
        events,
    })
}

/// Number of visible scheduled polls per month of `year`.
pub async fn year_overview(state: &AppState, actor: &SessionUser, year: i32) -> Vec<MonthCount> {
    let events = visible_events(state, actor).await;
    let mut month = Month::January;
    let mut out = Vec::with_capacity(12);
    for _ in 0..12 {
        let count = events
            .iter()
            .filter(|(date, _)| date.year() == year && date.month() == month)
            .map(|(_, polls)| polls.len())
            .sum();
        out.push(MonthCount { month: u8::from(month), month_name: dates::german_month_name(month), count });
        month = month.next();
    }
    out
}

/// Create a poll scheduled on `date`, with default all-targeting.
///
/// # Errors
///
/// Propagates every [`PollError`] from [`poll::create_poll`].
pub async fn quick_create(
    state: &AppState,
    actor: &SessionUser,
    date: Date,
    question: String,
    options: Vec<String>,
    time: Option<Time>,
) -> Result<PollView, CalendarError> {
    let input = NewPoll { question, options, targeting: None, event_date: Some(date), event_time: time };
    Ok(poll::create_poll(state, actor, input).await?)
}

#[cfg(test)]
#[path = "calendar_test.rs"]
mod tests;
