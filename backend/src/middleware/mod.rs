//! Request middleware.
//!
//! Purpose: request lifecycle concerns that sit outside individual handlers,
//! currently per-request trace identifiers.

pub mod trace;

pub use trace::{TRACE_ID_HEADER, Trace};
