//! Pointsboard library modules.
//!
//! The crate follows a hexagonal layout: `domain` holds entities, rules and
//! services over port traits; `outbound` implements those ports for
//! PostgreSQL, process memory and the cache; `inbound::http` exposes the
//! services as a JSON API.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

#[cfg(test)]
mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
