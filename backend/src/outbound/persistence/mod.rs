//! PostgreSQL persistence adapters using Diesel.
//!
//! Each repository translates between domain values and the row structs in
//! `models`; neither those rows nor `schema` leave this module. Writes that
//! touch both the ledger and `users.total_points` run in one transaction.

mod diesel_claim_repository;
mod diesel_event_repository;
mod diesel_notification_repository;
mod diesel_points_ledger;
mod diesel_reports_repository;
mod diesel_stand_repository;
mod diesel_tournament_repository;
mod diesel_user_repository;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

use std::sync::Arc;

use crate::domain::ports::Repositories;

pub use diesel_claim_repository::DieselClaimRepository;
pub use diesel_event_repository::DieselEventRepository;
pub use diesel_notification_repository::DieselNotificationRepository;
pub use diesel_points_ledger::DieselPointsLedger;
pub use diesel_reports_repository::DieselReportsRepository;
pub use diesel_stand_repository::{DieselProductRepository, DieselStandRepository};
pub use diesel_tournament_repository::DieselTournamentRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::run_migrations;
pub use pool::{DbPool, PoolConfig, PoolError};

/// Wire every port to PostgreSQL through one shared pool.
pub fn postgres_repositories(pool: &DbPool) -> Repositories {
    Repositories {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        events: Arc::new(DieselEventRepository::new(pool.clone())),
        tournaments: Arc::new(DieselTournamentRepository::new(pool.clone())),
        stands: Arc::new(DieselStandRepository::new(pool.clone())),
        products: Arc::new(DieselProductRepository::new(pool.clone())),
        claims: Arc::new(DieselClaimRepository::new(pool.clone())),
        ledger: Arc::new(DieselPointsLedger::new(pool.clone())),
        notifications: Arc::new(DieselNotificationRepository::new(pool.clone())),
        reports: Arc::new(DieselReportsRepository::new(pool.clone())),
    }
}
