//! Domain model for users, weeks and half-day price observations.
//!
//! # Responsibility
//! - Define the canonical entities persisted by the price store.
//! - Define the fixed 13-slot vocabulary of a tracked week.
//!
//! # Invariants
//! - A week is identified by (user, week start) and holds one base price.
//! - An observation is identified by (week, weekday, half-day).

pub mod entity;
pub mod slot;
