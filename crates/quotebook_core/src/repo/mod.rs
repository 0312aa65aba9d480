//! Store layer contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define entity-level data access contracts for authors and quotes.
//! - Isolate SQL details from the facade/use-case layer.
//!
//! # Invariants
//! - Store writes enforce record validation before persistence.
//! - Lookups return `Ok(None)`/empty lists for missing rows, never errors.

pub mod author_repo;
pub mod quote_repo;
