//! Canonical week mapping for the price cycle.
//!
//! # Responsibility
//! - Map any event date or timestamp onto the week it belongs to.
//!
//! # Invariants
//! - A week is identified by its start: the most recent Sunday at or before
//!   the event date.
//! - `week_start` is idempotent on its own output (a Sunday maps to itself).

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};

/// Returns the canonical week start for `date`.
///
/// Total over every date a caller can reach: the result is `date` itself on
/// Sundays and at most six days earlier otherwise.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let days_past_sunday = u64::from(date.weekday().num_days_from_sunday());
    // Only fails within a week of NaiveDate::MIN, which no event timestamp
    // can produce.
    date.checked_sub_days(Days::new(days_past_sunday))
        .unwrap_or(date)
}

/// Returns the week start for the date component of `timestamp`.
///
/// Both base-price and observation submissions resolve through this, so a
/// mid-week message attaches to the week opened by that user's most recent
/// Sunday, never to a fresh one.
pub fn week_start_at(timestamp: DateTime<Utc>) -> NaiveDate {
    week_start(timestamp.date_naive())
}
