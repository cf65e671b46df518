//! Service wiring shared by the server and the integration tests.

use std::sync::Arc;
use std::time::Duration;

use mockable::Clock;

use crate::domain::ports::{KeyValueCache, Repositories};
use crate::domain::{
    ClaimService, EventService, LeaderboardService, NotificationService, PointsService,
    ReportsService, StandService, TournamentService, UserService,
};

/// Lifetimes of derived cache entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    pub leaderboard: Duration,
    pub stats: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            leaderboard: Duration::from_secs(300),
            stats: Duration::from_secs(600),
        }
    }
}

/// Every domain service, built over one set of ports.
#[derive(Clone)]
pub struct Services {
    pub users: UserService,
    pub events: EventService,
    pub tournaments: TournamentService,
    pub stands: StandService,
    pub points: PointsService,
    pub leaderboard: LeaderboardService,
    pub claims: ClaimService,
    pub notifications: NotificationService,
    pub reports: ReportsService,
}

impl Services {
    pub fn new(
        repos: &Repositories,
        cache: Arc<dyn KeyValueCache>,
        clock: Arc<dyn Clock>,
        ttls: CacheTtls,
    ) -> Self {
        let notifications = NotificationService::new(
            repos.notifications.clone(),
            repos.users.clone(),
            clock.clone(),
        );
        Self {
            users: UserService::new(
                repos.users.clone(),
                notifications.clone(),
                cache.clone(),
                clock.clone(),
            ),
            events: EventService::new(repos.events.clone(), cache.clone(), clock.clone()),
            tournaments: TournamentService::new(
                repos.tournaments.clone(),
                repos.events.clone(),
                cache.clone(),
                clock.clone(),
            ),
            stands: StandService::new(
                repos.stands.clone(),
                repos.products.clone(),
                repos.events.clone(),
                repos.users.clone(),
                clock.clone(),
            ),
            points: PointsService::new(repos, notifications.clone(), cache.clone(), clock.clone()),
            leaderboard: LeaderboardService::new(
                repos.ledger.clone(),
                cache.clone(),
                ttls.leaderboard,
            ),
            claims: ClaimService::new(repos, notifications.clone(), cache.clone(), clock.clone()),
            reports: ReportsService::new(
                repos.reports.clone(),
                repos.stands.clone(),
                cache,
                clock,
                ttls.stats,
            ),
            notifications,
        }
    }
}
