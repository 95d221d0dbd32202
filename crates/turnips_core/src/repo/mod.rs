//! Repository layer: the persistence contract and its SQLite implementation.
//!
//! # Responsibility
//! - Define the data-access contract used by the request-level service.
//! - Keep SQL and row decoding inside the persistence boundary.
//!
//! # Invariants
//! - Every upsert is a single atomic SQL statement; concurrent writers for
//!   the same key converge on one row with the last writer's price.
//! - Expected absence is a semantic `NotFound` result, distinct from
//!   transport errors.

pub mod price_repo;
