//! Price tracking use-case service.
//!
//! # Responsibility
//! - Implement the three logical requests the transport layer issues:
//!   record a base price, record an observation, render the week chart.
//! - Resolve omitted day/half-day markers from the event timestamp.
//!
//! # Invariants
//! - `InvalidInput` is decided before the store is touched.
//! - A failed base-price gate leaves no observation row behind.

use crate::calendar::week_start_at;
use crate::chart;
use crate::model::entity::{ObservationId, WeekId};
use crate::model::slot::{HalfDay, SlotError, Weekday};
use crate::repo::price_repo::{PriceRepository, StoreError};
use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RequestResult<T> = Result<T, RequestError>;

/// Classified failure of one transport-level request.
#[derive(Debug)]
pub enum RequestError {
    /// Malformed day or half-day vocabulary; rejected before any store
    /// access so the caller can ask the user to correct it.
    InvalidInput(SlotError),
    /// The workflow gate: the user's week has no base price yet (or the
    /// user has never submitted at all).
    NoBasePrice { week_start: NaiveDate },
    /// Backing store failure, fatal for this request; retry policy belongs
    /// to the transport layer.
    StoreUnavailable(StoreError),
}

impl RequestError {
    /// True for the recoverable "submit a base price first" condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NoBasePrice { .. })
    }
}

impl Display for RequestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(err) => write!(f, "{err}"),
            Self::NoBasePrice { week_start } => write!(
                f,
                "no base price recorded yet for the week of {week_start}"
            ),
            Self::StoreUnavailable(err) => write!(f, "price store unavailable: {err}"),
        }
    }
}

impl Error for RequestError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidInput(err) => Some(err),
            Self::NoBasePrice { .. } => None,
            Self::StoreUnavailable(err) => Some(err),
        }
    }
}

impl From<SlotError> for RequestError {
    fn from(value: SlotError) -> Self {
        Self::InvalidInput(value)
    }
}

impl From<StoreError> for RequestError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::WeekNotFound { week_start, .. } => Self::NoBasePrice { week_start },
            other => Self::StoreUnavailable(other),
        }
    }
}

/// A base-price submission, already parsed by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasePriceEntry {
    pub external_id: String,
    pub display_name: String,
    pub event_time: DateTime<Utc>,
    pub price: u32,
}

/// An observation submission. Day and half-day are the raw optional tokens
/// from the command text; omitted markers are inferred from `event_time`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationEntry {
    pub external_id: String,
    pub display_name: String,
    pub event_time: DateTime<Utc>,
    pub day: Option<String>,
    pub half_day: Option<String>,
    pub price: u32,
}

/// Use-case service over a price repository.
pub struct PriceService<R: PriceRepository> {
    repo: R,
}

impl<R: PriceRepository> PriceService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Records (or overwrites) the base price for the submitter's current
    /// week, creating the user and week rows as needed.
    pub fn record_base_price(&self, entry: &BasePriceEntry) -> RequestResult<WeekId> {
        let user_id = self
            .repo
            .get_or_create_user(&entry.external_id, &entry.display_name)?;
        let week_id =
            self.repo
                .upsert_week(user_id, entry.event_time.date_naive(), entry.price)?;

        info!(
            "event=base_price_recorded module=service status=ok user_id={user_id} \
             week_id={week_id} price={}",
            entry.price
        );
        Ok(week_id)
    }

    /// Records (or overwrites) one half-day observation for the submitter's
    /// current week.
    ///
    /// Fails with `NoBasePrice` before writing anything when the week has
    /// not been opened by a base-price submission.
    pub fn record_observation(&self, entry: &ObservationEntry) -> RequestResult<ObservationId> {
        let (day, half_day) = resolve_slot(entry)?;

        let user_id = self
            .repo
            .get_or_create_user(&entry.external_id, &entry.display_name)?;
        let week = self
            .repo
            .get_week(user_id, entry.event_time.date_naive())?;
        let observation_id = self
            .repo
            .upsert_observation(week.id, day, half_day, entry.price)?;

        info!(
            "event=observation_recorded module=service status=ok user_id={user_id} \
             week_id={} observation_id={observation_id} day={day} half_day={half_day} price={}",
            week.id, entry.price
        );
        Ok(observation_id)
    }

    /// Renders the chart URL for the submitter's current week.
    ///
    /// Never creates rows: an unknown user is reported through the same
    /// `NoBasePrice` gate as a week without a base price.
    pub fn chart_url(
        &self,
        external_id: &str,
        event_time: DateTime<Utc>,
    ) -> RequestResult<String> {
        let Some(user) = self.repo.find_user(external_id)? else {
            return Err(RequestError::NoBasePrice {
                week_start: week_start_at(event_time),
            });
        };

        let week = self.repo.get_week(user.id, event_time.date_naive())?;
        let observations = self.repo.list_observations(week.id)?;

        info!(
            "event=chart_rendered module=service status=ok user_id={} week_id={} \
             observation_count={}",
            user.id,
            week.id,
            observations.len()
        );
        Ok(chart::chart_url(week.base_price, &observations))
    }
}

/// Resolves the observation slot from explicit tokens or the event time.
///
/// Explicit tokens win; an omitted day falls back to the timestamp's
/// weekday (rejected on Sundays) and an omitted half-day to the submission
/// hour.
fn resolve_slot(entry: &ObservationEntry) -> Result<(Weekday, HalfDay), RequestError> {
    let day = match &entry.day {
        Some(name) => Weekday::from_name(name)?,
        None => Weekday::from_chrono(entry.event_time.weekday())
            .ok_or(RequestError::InvalidInput(SlotError::SundayObservation))?,
    };

    let half_day = match &entry.half_day {
        Some(name) => HalfDay::from_name(name)?,
        None => HalfDay::from_hour(entry.event_time.hour()),
    };

    Ok((day, half_day))
}

#[cfg(test)]
mod tests {
    use super::{resolve_slot, ObservationEntry, RequestError};
    use crate::model::slot::{HalfDay, SlotError, Weekday};
    use chrono::{TimeZone, Utc};

    fn entry(day: Option<&str>, half_day: Option<&str>) -> ObservationEntry {
        ObservationEntry {
            external_id: "user-1".to_string(),
            display_name: "Tester".to_string(),
            // 2020-04-01 was a Wednesday.
            event_time: Utc.with_ymd_and_hms(2020, 4, 1, 9, 0, 0).unwrap(),
            day: day.map(str::to_string),
            half_day: half_day.map(str::to_string),
            price: 90,
        }
    }

    #[test]
    fn omitted_markers_are_inferred_from_the_event_time() {
        let resolved = resolve_slot(&entry(None, None)).unwrap();
        assert_eq!(resolved, (Weekday::Wednesday, HalfDay::Morning));
    }

    #[test]
    fn explicit_tokens_override_inference() {
        let resolved = resolve_slot(&entry(Some("friday"), Some("pm"))).unwrap();
        assert_eq!(resolved, (Weekday::Friday, HalfDay::Afternoon));
    }

    #[test]
    fn sunday_event_time_without_explicit_day_is_invalid() {
        let mut sunday_entry = entry(None, None);
        sunday_entry.event_time = Utc.with_ymd_and_hms(2020, 3, 29, 9, 0, 0).unwrap();
        let err = resolve_slot(&sunday_entry).unwrap_err();
        assert!(matches!(
            err,
            RequestError::InvalidInput(SlotError::SundayObservation)
        ));
    }

    #[test]
    fn afternoon_inference_at_the_cutoff() {
        let mut late_entry = entry(None, None);
        late_entry.event_time = Utc.with_ymd_and_hms(2020, 4, 1, 11, 0, 0).unwrap();
        let resolved = resolve_slot(&late_entry).unwrap();
        assert_eq!(resolved.1, HalfDay::Afternoon);
    }
}
