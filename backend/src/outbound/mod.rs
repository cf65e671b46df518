//! Outbound adapters implementing the domain ports.
//!
//! - `persistence`: PostgreSQL through Diesel and a bb8 pool.
//! - `memory`: a single-process store for local runs and tests.
//! - `cache`: file-backed and in-memory `KeyValueCache` implementations.
//!
//! Adapters translate between domain values and their storage form and hold
//! no business rules beyond the atomicity the ports promise.

pub mod cache;
pub mod memory;
pub mod persistence;
