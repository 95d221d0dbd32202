//! Weekday/half-day vocabulary and the positional slot layout.
//!
//! # Responsibility
//! - Validate day and half-day names at the input boundary.
//! - Map (weekday, half-day) pairs onto the fixed 13-slot week layout.
//!
//! # Invariants
//! - Slot 0 is reserved for the Sunday base price.
//! - `slot_index` is a bijection from the 12 observation slots onto 1..=12.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Number of positions in a week's encoded record: the base price plus
/// twelve half-day observations.
pub const SLOT_COUNT: usize = 13;

/// Position reserved for the Sunday base price.
pub const BASE_SLOT: usize = 0;

/// Hour (24h clock) before which a submission with no explicit half-day is
/// read as a morning observation. Policy threshold, not a physical constant.
pub const MORNING_CUTOFF_HOUR: u32 = 11;

/// Input error for the day / half-day vocabulary.
///
/// Raised at the boundary, before any store access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    /// Day name is not one of Monday..Saturday.
    UnknownDay(String),
    /// Half-day marker is not a recognized morning/afternoon spelling.
    UnknownHalfDay(String),
    /// Sunday carries the base price and has no half-day observation slots.
    SundayObservation,
}

impl Display for SlotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownDay(name) => write!(f, "unrecognized day name `{name}`"),
            Self::UnknownHalfDay(name) => {
                write!(f, "half-day marker `{name}` must be am or pm")
            }
            Self::SundayObservation => {
                write!(f, "Sunday takes a base price, not a half-day observation")
            }
        }
    }
}

impl Error for SlotError {}

/// Observation weekday. Sunday is deliberately unrepresentable: its price
/// lives in the week's base slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    /// All observation weekdays in calendar order.
    pub const ALL: [Self; 6] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
    ];

    /// 1-based position within the observable week (Monday = 1, Saturday = 6).
    pub fn ordinal(self) -> usize {
        match self {
            Self::Monday => 1,
            Self::Tuesday => 2,
            Self::Wednesday => 3,
            Self::Thursday => 4,
            Self::Friday => 5,
            Self::Saturday => 6,
        }
    }

    /// Inverse of [`Weekday::ordinal`].
    pub fn from_ordinal(ordinal: usize) -> Option<Self> {
        Self::ALL.get(ordinal.checked_sub(1)?).copied()
    }

    /// Parses a day name; case-insensitive, accepts three-letter short forms.
    ///
    /// Sunday is rejected with its own error so callers can explain the
    /// base-price rule instead of reporting a typo.
    pub fn from_name(name: &str) -> Result<Self, SlotError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "monday" | "mon" => Ok(Self::Monday),
            "tuesday" | "tue" | "tues" => Ok(Self::Tuesday),
            "wednesday" | "wed" => Ok(Self::Wednesday),
            "thursday" | "thu" | "thur" | "thurs" => Ok(Self::Thursday),
            "friday" | "fri" => Ok(Self::Friday),
            "saturday" | "sat" => Ok(Self::Saturday),
            "sunday" | "sun" => Err(SlotError::SundayObservation),
            _ => Err(SlotError::UnknownDay(name.trim().to_string())),
        }
    }

    /// Converts a calendar weekday; `None` for Sunday.
    pub fn from_chrono(day: chrono::Weekday) -> Option<Self> {
        match day {
            chrono::Weekday::Mon => Some(Self::Monday),
            chrono::Weekday::Tue => Some(Self::Tuesday),
            chrono::Weekday::Wed => Some(Self::Wednesday),
            chrono::Weekday::Thu => Some(Self::Thursday),
            chrono::Weekday::Fri => Some(Self::Friday),
            chrono::Weekday::Sat => Some(Self::Saturday),
            chrono::Weekday::Sun => None,
        }
    }
}

impl Display for Weekday {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
        };
        f.write_str(name)
    }
}

/// Morning/afternoon half of an observation day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HalfDay {
    Morning,
    Afternoon,
}

impl HalfDay {
    /// Parses a half-day marker; accepts `am`/`pm` and the long forms.
    pub fn from_name(name: &str) -> Result<Self, SlotError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "am" | "morning" => Ok(Self::Morning),
            "pm" | "afternoon" => Ok(Self::Afternoon),
            _ => Err(SlotError::UnknownHalfDay(name.trim().to_string())),
        }
    }

    /// Infers the half-day from a 24h submission hour.
    pub fn from_hour(hour: u32) -> Self {
        if hour < MORNING_CUTOFF_HOUR {
            Self::Morning
        } else {
            Self::Afternoon
        }
    }
}

impl Display for HalfDay {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Morning => "am",
            Self::Afternoon => "pm",
        })
    }
}

/// Returns the encoded position of a half-day observation, in 1..=12.
///
/// Layout: [Sun, Mon-am, Mon-pm, Tue-am, Tue-pm, .., Sat-am, Sat-pm].
pub fn slot_index(day: Weekday, half_day: HalfDay) -> usize {
    let morning = 2 * (day.ordinal() - 1) + 1;
    match half_day {
        HalfDay::Morning => morning,
        HalfDay::Afternoon => morning + 1,
    }
}
