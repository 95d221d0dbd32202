//! Request-level orchestration for the chat-command boundary.
//!
//! # Responsibility
//! - Turn validated transport requests into store operations and chart
//!   output.
//! - Classify every failure before it returns to the transport layer.
//!
//! # Invariants
//! - Input vocabulary is validated before any store access.
//! - The base-price gate holds: no observation row is written for a week
//!   that has no base price.

pub mod price_service;
