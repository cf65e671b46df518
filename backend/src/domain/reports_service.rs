//! Aggregate reporting.

use std::sync::Arc;
use std::time::Duration;

use mockable::Clock;

use crate::domain::ports::{
    CacheKey, KeyValueCache, ReportsRepository, STATS_PREFIX, StandRepository, cached_or_compute,
};
use crate::domain::{
    DashboardStats, Error, EventId, EventReport, RequestContext, Role, StandId, StandReport,
};

#[derive(Clone)]
pub struct ReportsService {
    reports: Arc<dyn ReportsRepository>,
    stands: Arc<dyn StandRepository>,
    cache: Arc<dyn KeyValueCache>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl ReportsService {
    pub fn new(
        reports: Arc<dyn ReportsRepository>,
        stands: Arc<dyn StandRepository>,
        cache: Arc<dyn KeyValueCache>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
    ) -> Self {
        Self {
            reports,
            stands,
            cache,
            clock,
            ttl,
        }
    }

    /// Platform statistics. Admin only; cached under `stats:dashboard`.
    pub async fn dashboard(&self, ctx: &RequestContext) -> Result<DashboardStats, Error> {
        ctx.require(Role::Admin)?;
        cached_or_compute(
            self.cache.as_ref(),
            STATS_PREFIX,
            &CacheKey::stats_dashboard(),
            self.ttl,
            || async { Ok::<_, Error>(self.reports.dashboard(self.clock.utc()).await?) },
        )
        .await
    }

    /// Tournament and stand breakdown for one event. Admin only.
    pub async fn event_report(
        &self,
        ctx: &RequestContext,
        event_id: EventId,
    ) -> Result<EventReport, Error> {
        ctx.require(Role::Admin)?;
        self.reports
            .event_report(&event_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("event {event_id} not found")))
    }

    /// Product breakdown for one stand. Its manager or an admin.
    pub async fn stand_report(
        &self,
        ctx: &RequestContext,
        stand_id: StandId,
    ) -> Result<StandReport, Error> {
        self.stands
            .find_by_id(&stand_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("stand {stand_id} not found")))?
            .require_manager(ctx)?;
        self.reports
            .stand_report(&stand_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("stand {stand_id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::UserId;
    use crate::domain::ports::{MockReportsRepository, MockStandRepository};
    use crate::outbound::cache::MemoryCache;
    use crate::test_support::{MutableClock, sample_now};
    use rstest::rstest;

    fn service(reports: MockReportsRepository) -> ReportsService {
        let clock: Arc<dyn Clock> = Arc::new(MutableClock::new(sample_now()));
        ReportsService::new(
            Arc::new(reports),
            Arc::new(MockStandRepository::new()),
            Arc::new(MemoryCache::new(clock.clone())),
            clock,
            Duration::from_secs(60),
        )
    }

    #[rstest]
    #[tokio::test]
    async fn dashboard_is_cached() {
        let mut reports = MockReportsRepository::new();
        reports.expect_dashboard().times(1).returning(|_| {
            Ok(DashboardStats {
                total_users: 7,
                ..DashboardStats::default()
            })
        });
        let service = service(reports);
        let admin = RequestContext::new(UserId::random(), Role::Admin);
        let first = service.dashboard(&admin).await.expect("stats");
        let second = service.dashboard(&admin).await.expect("cached stats");
        assert_eq!(first, second);
        assert_eq!(second.total_users, 7);
    }

    #[rstest]
    #[tokio::test]
    async fn dashboard_requires_admin() {
        let manager = RequestContext::new(UserId::random(), Role::StandManager);
        let err = service(MockReportsRepository::new())
            .dashboard(&manager)
            .await
            .expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }
}
