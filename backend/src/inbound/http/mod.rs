//! HTTP inbound adapter exposing the JSON API.
//!
//! Handlers translate requests into service calls and wrap results in the
//! response envelope from [`envelope`]. Authentication, CSRF checks and role
//! reloading happen in the [`session::Caller`] extractor.

pub mod auth;
pub mod claims;
pub mod envelope;
pub mod error;
pub mod events;
pub mod health;
pub mod leaderboard;
pub mod notifications;
pub mod points;
pub mod reports;
pub mod routes;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod stands;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod throttle;
pub mod tournaments;
pub mod users;
pub mod validation;

pub use error::ApiResult;
