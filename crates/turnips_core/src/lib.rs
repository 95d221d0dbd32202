//! Core domain logic for the weekly turnip price tracker.
//! This crate is the single source of truth for the week/slot invariants.

pub mod calendar;
pub mod chart;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use calendar::{week_start, week_start_at};
pub use chart::{chart_url, CHART_BASE_URL};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::entity::{Observation, ObservationId, User, UserId, Week, WeekId};
pub use model::slot::{slot_index, HalfDay, SlotError, Weekday, BASE_SLOT, SLOT_COUNT};
pub use repo::price_repo::{PriceRepository, SqlitePriceRepository, StoreError, StoreResult};
pub use service::price_service::{
    BasePriceEntry, ObservationEntry, PriceService, RequestError, RequestResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
