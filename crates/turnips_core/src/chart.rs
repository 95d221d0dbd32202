//! Positional chart encoding for a tracked week.
//!
//! # Responsibility
//! - Encode the base price plus a sparse observation set into the fixed
//!   13-slot URL consumed by the external chart renderer.
//!
//! # Invariants
//! - Output depends only on slot contents, never on insertion order.
//! - Unfilled slots encode as the literal price 0; the format has no null.

use crate::model::entity::Observation;
use crate::model::slot::{BASE_SLOT, SLOT_COUNT};

/// Address prefix of the external chart renderer. The thirteen prices are
/// appended as `-`-separated decimal values.
pub const CHART_BASE_URL: &str = "https://ac-turnip.com/p-";

/// Encodes one week as a chart URL.
///
/// Slot 0 is the base price; each observation lands at its slot index. When
/// the input carries duplicate slots the later element wins, though the
/// store's uniqueness constraints never produce duplicates.
pub fn chart_url(base_price: u32, observations: &[Observation]) -> String {
    let mut slots = [0u32; SLOT_COUNT];
    slots[BASE_SLOT] = base_price;
    for observation in observations {
        slots[observation.slot()] = observation.price;
    }

    let mut url = String::from(CHART_BASE_URL);
    for (position, price) in slots.iter().enumerate() {
        if position > BASE_SLOT {
            url.push('-');
        }
        url.push_str(&price.to_string());
    }
    url
}
