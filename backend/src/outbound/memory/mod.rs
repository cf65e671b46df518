//! Single-process store implementing every persistence port.
//!
//! Used when no database URL is configured and by end-to-end tests. All
//! state sits behind one async mutex, so each port call is atomic with
//! respect to every other call.

mod reports;
mod store;

pub use store::InMemoryStore;
