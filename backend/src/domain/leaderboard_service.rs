//! Leaderboard queries over the cached full ranking.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::leaderboard::{
    DEFAULT_WINDOW, MAX_WINDOW, clamp_limit, context_window, rank_of, rank_standings,
};
use crate::domain::ports::{
    CacheKey, KeyValueCache, LEADERBOARD_PREFIX, PointsLedger, cached_or_compute,
};
use crate::domain::{ContextEntry, Error, LeaderboardEntry, UserId};

#[derive(Clone)]
pub struct LeaderboardService {
    ledger: Arc<dyn PointsLedger>,
    cache: Arc<dyn KeyValueCache>,
    ttl: Duration,
}

impl LeaderboardService {
    pub fn new(ledger: Arc<dyn PointsLedger>, cache: Arc<dyn KeyValueCache>, ttl: Duration) -> Self {
        Self { ledger, cache, ttl }
    }

    /// Full ordering, served from the cache when present.
    async fn ranking(&self) -> Result<Vec<LeaderboardEntry>, Error> {
        cached_or_compute(
            self.cache.as_ref(),
            LEADERBOARD_PREFIX,
            &CacheKey::leaderboard_full(),
            self.ttl,
            || async { Ok::<_, Error>(rank_standings(self.ledger.standings().await?)) },
        )
        .await
    }

    /// Top `limit` users (default 10, at most 100).
    pub async fn leaderboard(&self, limit: Option<usize>) -> Result<Vec<LeaderboardEntry>, Error> {
        let mut ranking = self.ranking().await?;
        ranking.truncate(clamp_limit(limit));
        Ok(ranking)
    }

    /// Position in the full ordering; `None` until the user earns points.
    pub async fn user_rank(&self, user_id: UserId) -> Result<Option<usize>, Error> {
        Ok(rank_of(&self.ranking().await?, user_id))
    }

    /// The user's row with up to `window` neighbours on each side.
    pub async fn user_context(
        &self,
        user_id: UserId,
        window: Option<usize>,
    ) -> Result<Vec<ContextEntry>, Error> {
        let window = window.unwrap_or(DEFAULT_WINDOW).min(MAX_WINDOW);
        Ok(context_window(&self.ranking().await?, user_id, window))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockPointsLedger, invalidate};
    use crate::domain::{Nickname, Standing};
    use crate::outbound::cache::MemoryCache;
    use crate::test_support::{MutableClock, sample_now};
    use chrono::TimeDelta;
    use futures_util::FutureExt;
    use mockall::Sequence;
    use rstest::rstest;

    fn standings() -> Vec<Standing> {
        ["ada", "bob", "cy", "dee"]
            .iter()
            .enumerate()
            .map(|(index, name)| Standing {
                user_id: UserId::random(),
                nickname: Nickname::new(format!("{name}_x")).expect("nickname"),
                profile_image: None,
                total_points: 100 - i64::try_from(index).unwrap_or(0) * 10,
                first_transaction_at: sample_now() + TimeDelta::minutes(1),
            })
            .collect()
    }

    fn service(ledger: MockPointsLedger) -> LeaderboardService {
        let clock = Arc::new(MutableClock::new(sample_now()));
        LeaderboardService::new(
            Arc::new(ledger),
            Arc::new(MemoryCache::new(clock)),
            Duration::from_secs(60),
        )
    }

    #[rstest]
    #[tokio::test]
    async fn ranking_is_computed_once_then_cached() {
        let mut ledger = MockPointsLedger::new();
        ledger
            .expect_standings()
            .times(1)
            .returning(|| Ok(standings()));
        let service = service(ledger);
        let top = service.leaderboard(Some(2)).await.expect("leaderboard");
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].rank, 1);
        let all = service.leaderboard(None).await.expect("cached leaderboard");
        assert_eq!(all.len(), 4);
    }

    #[rstest]
    #[tokio::test]
    async fn rank_and_context_agree() {
        let rows = standings();
        let third = rows[2].user_id;
        let mut ledger = MockPointsLedger::new();
        ledger.expect_standings().returning(move || Ok(rows.clone()));
        let service = service(ledger);
        assert_eq!(service.user_rank(third).await.expect("rank"), Some(3));
        let context = service.user_context(third, Some(1)).await.expect("context");
        let ranks: Vec<_> = context.iter().map(|row| row.entry.rank).collect();
        assert_eq!(ranks, vec![2, 3, 4]);
        assert_eq!(service.user_rank(UserId::random()).await.expect("rank"), None);
    }

    #[rstest]
    #[tokio::test]
    async fn ranking_read_during_a_write_is_not_cached() {
        let clock = Arc::new(MutableClock::new(sample_now()));
        let cache: Arc<dyn KeyValueCache> = Arc::new(MemoryCache::new(clock));
        let before = standings();
        let mut after = before.clone();
        after[3].total_points = 500;
        let mut ledger = MockPointsLedger::new();
        let mut seq = Sequence::new();
        let writer = cache.clone();
        ledger
            .expect_standings()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move || {
                let _ = invalidate(writer.as_ref(), &[LEADERBOARD_PREFIX]).now_or_never();
                Ok(before.clone())
            });
        ledger
            .expect_standings()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move || Ok(after.clone()));
        let service = LeaderboardService::new(Arc::new(ledger), cache, Duration::from_secs(60));

        let first = service.leaderboard(None).await.expect("leaderboard");
        assert_eq!(first[0].total_points, 100);
        let second = service.leaderboard(None).await.expect("recomputed leaderboard");
        assert_eq!(second[0].total_points, 500);
    }
}
