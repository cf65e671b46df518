//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (the relational store, the in-memory store and the cache). Adapters map
//! their failures into the typed errors declared here.

use std::sync::Arc;

mod cache;
mod claim_repository;
mod event_repository;
mod macros;
mod notification_repository;
mod points_ledger;
mod reports_repository;
mod repository_error;
mod stand_repository;
mod tournament_repository;
mod user_repository;

pub(crate) use macros::define_port_error;

pub use cache::{
    CacheError, CacheKey, CacheKeyValidationError, KeyValueCache, LEADERBOARD_PREFIX,
    STATS_PREFIX, cached_or_compute, invalidate, read_cached, write_cached,
};
pub use claim_repository::{ClaimRepository, ClaimWriteOutcome};
pub use event_repository::EventRepository;
pub use notification_repository::NotificationRepository;
pub use points_ledger::{LedgerWriteOutcome, PointsLedger};
pub use reports_repository::ReportsRepository;
pub use repository_error::{DeleteOutcome, RepositoryError};
pub use stand_repository::{ProductRepository, StandRepository};
pub use tournament_repository::TournamentRepository;
pub use user_repository::{UserInsertOutcome, UserRepository};

#[cfg(test)]
pub use cache::MockKeyValueCache;
#[cfg(test)]
pub use claim_repository::MockClaimRepository;
#[cfg(test)]
pub use event_repository::MockEventRepository;
#[cfg(test)]
pub use notification_repository::MockNotificationRepository;
#[cfg(test)]
pub use points_ledger::MockPointsLedger;
#[cfg(test)]
pub use reports_repository::MockReportsRepository;
#[cfg(test)]
pub use stand_repository::{MockProductRepository, MockStandRepository};
#[cfg(test)]
pub use tournament_repository::MockTournamentRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;

/// Every persistence port, bundled for service construction.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub events: Arc<dyn EventRepository>,
    pub tournaments: Arc<dyn TournamentRepository>,
    pub stands: Arc<dyn StandRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub claims: Arc<dyn ClaimRepository>,
    pub ledger: Arc<dyn PointsLedger>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub reports: Arc<dyn ReportsRepository>,
}

impl Repositories {
    /// Use one store for every port.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: UserRepository
            + EventRepository
            + TournamentRepository
            + StandRepository
            + ProductRepository
            + ClaimRepository
            + PointsLedger
            + NotificationRepository
            + ReportsRepository
            + 'static,
    {
        Self {
            users: store.clone(),
            events: store.clone(),
            tournaments: store.clone(),
            stands: store.clone(),
            products: store.clone(),
            claims: store.clone(),
            ledger: store.clone(),
            notifications: store.clone(),
            reports: store,
        }
    }
}
