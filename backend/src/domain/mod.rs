//! Domain primitives, aggregates and services.
//!
//! Purpose: define strongly typed entities, the rules they enforce and the
//! services that coordinate them through the ports in [`ports`]. Nothing in
//! this module performs I/O directly.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - RuleViolation / ValidationErrors: expected rejections.
//! - Entities: User, Event, Tournament, Stand, Product, Claim,
//!   PointTransaction, Notification.
//! - Services: one per use-case area, bundled in [`Services`].

pub mod auth;
pub mod claim;
pub mod error;
pub mod event;
pub mod ids;
pub mod leaderboard;
pub mod notification;
pub mod points;
pub mod ports;
pub mod reports;
pub mod role;
pub mod rules;
pub mod stand;
pub mod tournament;
pub mod trace_id;
pub mod user;
pub mod validation;

mod claim_service;
mod event_service;
mod leaderboard_service;
mod notification_service;
mod points_service;
mod reports_service;
mod services;
mod stand_service;
mod tournament_service;
mod user_service;

pub use self::auth::{LoginCredentials, LoginValidationError, hash_password, verify_password};
pub use self::claim::{Claim, ClaimStatus, NewClaim};
pub use self::error::{DomainError, Error, ErrorCode};
pub use self::event::{Event, EventDraft};
pub use self::ids::{
    ClaimId, EventId, NotificationId, ProductId, StandId, TournamentId, TransactionId, UserId,
};
pub use self::leaderboard::{ContextEntry, LeaderboardEntry, Standing};
pub use self::notification::{Notification, NotificationContent, NotificationKind};
pub use self::points::{AssignPointsRequest, NewPointTransaction, PointSource, PointTransaction};
pub use self::reports::{
    DashboardStats, EventReport, ProductSummary, StandReport, StandSummary, TournamentSummary,
};
pub use self::role::{RequestContext, Role, UnknownRole};
pub use self::rules::RuleViolation;
pub use self::stand::{Product, ProductDraft, Stand, StandDraft};
pub use self::tournament::{Tournament, TournamentDraft, TournamentStatus};
pub use self::trace_id::TraceId;
pub use self::user::{Email, NewUser, Nickname, Registration, User};
pub use self::validation::{FieldError, ValidationErrors};

pub use self::claim_service::{ClaimService, CreateClaim};
pub use self::event_service::EventService;
pub use self::leaderboard_service::LeaderboardService;
pub use self::notification_service::NotificationService;
pub use self::points_service::PointsService;
pub use self::reports_service::ReportsService;
pub use self::services::{CacheTtls, Services};
pub use self::stand_service::StandService;
pub use self::tournament_service::TournamentService;
pub use self::user_service::UserService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use pointsboard::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
