//! Persistent entities of the weekly price cycle.
//!
//! # Responsibility
//! - Define the typed shapes of the three stored tables.
//!
//! # Invariants
//! - `Week::week_start` is always a Sunday, derived by the store, never
//!   user-supplied.
//! - Prices are non-negative; the store enforces this at the schema level.

use crate::model::slot::{slot_index, HalfDay, Weekday};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Store-assigned row id for a user.
pub type UserId = i64;
/// Store-assigned row id for a week.
pub type WeekId = i64;
/// Store-assigned row id for an observation.
pub type ObservationId = i64;

/// One tracked person, created on first submission and never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Stable identity supplied by the transport layer (e.g. a chat user id).
    pub external_id: String,
    /// Informational only; refreshed on every submission.
    pub display_name: String,
}

/// One user's record for one calendar week, anchored by the Sunday base price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Week {
    pub id: WeekId,
    pub user_id: UserId,
    /// Canonical Sunday identifying the week.
    pub week_start: NaiveDate,
    /// Sunday selling price; overwritten by later submissions for this week.
    pub base_price: u32,
}

/// A single half-day buy-price reading within a week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub id: ObservationId,
    pub week_id: WeekId,
    pub day: Weekday,
    pub half_day: HalfDay,
    pub price: u32,
}

impl Observation {
    /// Position of this observation in the week's 13-slot encoding.
    pub fn slot(&self) -> usize {
        slot_index(self.day, self.half_day)
    }
}
