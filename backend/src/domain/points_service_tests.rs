//! Tests for points assignment.

use std::sync::Arc;

use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{CacheKey, KeyValueCache};
use crate::domain::{ErrorCode, Tournament, TournamentStatus};
use crate::outbound::cache::MemoryCache;
use crate::test_support::{
    MutableClock, RepoMocks, notification_service, sample_event, sample_now, sample_user,
};

struct Harness {
    service: PointsService,
    cache: Arc<MemoryCache>,
}

fn harness(mocks: RepoMocks) -> Harness {
    let clock: Arc<dyn Clock> = Arc::new(MutableClock::new(sample_now()));
    let cache = Arc::new(MemoryCache::new(clock.clone()));
    let repos = mocks.allow_notifications().into_repositories();
    let notifications = notification_service(&repos, clock.clone());
    Harness {
        service: PointsService::new(&repos, notifications, cache.clone(), clock),
        cache,
    }
}

#[fixture]
fn assistant() -> RequestContext {
    RequestContext::new(UserId::random(), Role::Assistant)
}

fn bonus(user_id: UserId, amount: i64) -> AssignPointsRequest {
    AssignPointsRequest {
        user_id,
        amount,
        source: PointSource::Bonus,
        tournament_id: None,
        notes: Some("good sport".to_owned()),
    }
}

fn tournament_in(event: &Event, reward: i64) -> Tournament {
    Tournament {
        id: TournamentId::random(),
        event_id: event.id,
        name: "Finals".to_owned(),
        scheduled_time: event.start_date,
        points_reward: reward,
        specifications: Default::default(),
        status: TournamentStatus::Active,
        created_at: event.created_at,
    }
}

fn recorded(entries: &[NewPointTransaction]) -> LedgerWriteOutcome {
    LedgerWriteOutcome::Recorded(
        entries
            .iter()
            .cloned()
            .map(NewPointTransaction::into_stored)
            .collect(),
    )
}

#[rstest]
#[tokio::test]
async fn assignment_requires_active_event(assistant: RequestContext) {
    let mut mocks = RepoMocks::default();
    mocks.events.expect_find_active().returning(|_| Ok(None));
    mocks.ledger.expect_record().times(0);
    let err = harness(mocks)
        .service
        .assign(&assistant, bonus(UserId::random(), 10))
        .await
        .expect_err("no active event");
    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(err.details().expect("details")["rule"], "no_active_event");
}

#[rstest]
#[tokio::test]
async fn plain_users_cannot_assign() {
    let ctx = RequestContext::new(UserId::random(), Role::User);
    let err = harness(RepoMocks::default())
        .service
        .assign(&ctx, bonus(UserId::random(), 10))
        .await
        .expect_err("forbidden");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn validation_reports_every_failure(assistant: RequestContext) {
    let mut mocks = RepoMocks::default();
    mocks
        .events
        .expect_find_active()
        .returning(|_| Ok(Some(sample_event())));
    mocks.users.expect_find_by_id().returning(|_| Ok(None));
    mocks.ledger.expect_record().times(0);
    let err = harness(mocks)
        .service
        .assign(&assistant, bonus(UserId::random(), 0))
        .await
        .expect_err("invalid");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    let details = err.details().expect("details");
    let fields: Vec<_> = details["errors"]
        .as_array()
        .expect("error list")
        .iter()
        .map(|e| e["field"].as_str().unwrap_or_default().to_owned())
        .collect();
    assert_eq!(fields, vec!["amount", "userId"]);
}

#[rstest]
#[tokio::test]
async fn tournament_must_belong_to_active_event(assistant: RequestContext) {
    let active = sample_event();
    let other = sample_event();
    let tournament = tournament_in(&other, 50);
    let tournament_id = tournament.id;
    let user = sample_user("ada", Role::User, 0);
    let user_id = user.id;

    let mut mocks = RepoMocks::default();
    mocks
        .events
        .expect_find_active()
        .returning(move |_| Ok(Some(active.clone())));
    mocks
        .users
        .expect_find_by_id()
        .returning(move |_| Ok(Some(user.clone())));
    mocks
        .tournaments
        .expect_find_by_id()
        .returning(move |_| Ok(Some(tournament.clone())));
    mocks.ledger.expect_record().times(0);

    let request = AssignPointsRequest {
        user_id,
        amount: 50,
        source: PointSource::Tournament,
        tournament_id: Some(tournament_id),
        notes: None,
    };
    let err = harness(mocks)
        .service
        .assign(&assistant, request)
        .await
        .expect_err("foreign tournament");
    assert_eq!(
        err.message(),
        "tournament does not belong to the active event"
    );
}

#[rstest]
#[tokio::test]
async fn assignment_records_entry_and_invalidates_caches(assistant: RequestContext) {
    let user = sample_user("ada", Role::User, 0);
    let user_id = user.id;
    let mut mocks = RepoMocks::default();
    mocks
        .events
        .expect_find_active()
        .returning(|_| Ok(Some(sample_event())));
    mocks
        .users
        .expect_find_by_id()
        .returning(move |_| Ok(Some(user.clone())));
    mocks
        .ledger
        .expect_record()
        .withf(move |entries| {
            entries.len() == 1 && entries[0].points == 25 && entries[0].user_id == user_id
        })
        .times(1)
        .returning(|entries| Ok(recorded(entries)));

    let harness = harness(mocks);
    let key = CacheKey::leaderboard_full();
    harness
        .cache
        .set(&key, &serde_json::json!([]), std::time::Duration::from_secs(60))
        .await
        .expect("seed cache");

    let entry = harness
        .service
        .assign(&assistant, bonus(user_id, 25))
        .await
        .expect("assigned");
    assert_eq!(entry.points, 25);
    assert_eq!(entry.created_by, assistant.user_id());
    assert_eq!(entry.notes.as_deref(), Some("good sport"));
    assert!(harness.cache.get(&key).await.expect("cache read").is_none());
}

#[rstest]
#[tokio::test]
async fn award_tournament_deduplicates_and_writes_once(assistant: RequestContext) {
    let event = sample_event();
    let tournament = tournament_in(&event, 40);
    let tournament_id = tournament.id;
    let ada = sample_user("ada", Role::User, 0);
    let bob = sample_user("bob", Role::User, 0);
    let ids = vec![ada.id, bob.id, ada.id];

    let mut mocks = RepoMocks::default();
    mocks
        .events
        .expect_find_active()
        .returning(move |_| Ok(Some(event.clone())));
    mocks
        .tournaments
        .expect_find_by_id()
        .returning(move |_| Ok(Some(tournament.clone())));
    mocks
        .users
        .expect_find_by_id()
        .times(2)
        .returning(|id| {
            let mut user = sample_user("someone", Role::User, 0);
            user.id = *id;
            Ok(Some(user))
        });
    mocks
        .ledger
        .expect_record()
        .withf(|entries| entries.len() == 2 && entries.iter().all(|e| e.points == 40))
        .times(1)
        .returning(|entries| Ok(recorded(entries)));

    let awarded = harness(mocks)
        .service
        .award_tournament(&assistant, tournament_id, ids, None)
        .await
        .expect("awarded");
    assert_eq!(awarded.len(), 2);
}

#[rstest]
#[tokio::test]
async fn award_tournament_writes_nothing_when_any_user_is_missing(assistant: RequestContext) {
    let event = sample_event();
    let tournament = tournament_in(&event, 40);
    let tournament_id = tournament.id;
    let known = sample_user("ada", Role::User, 0);
    let known_id = known.id;

    let mut mocks = RepoMocks::default();
    mocks
        .events
        .expect_find_active()
        .returning(move |_| Ok(Some(event.clone())));
    mocks
        .tournaments
        .expect_find_by_id()
        .returning(move |_| Ok(Some(tournament.clone())));
    mocks.users.expect_find_by_id().returning(move |id| {
        Ok((*id == known_id).then(|| known.clone()))
    });
    mocks.ledger.expect_record().times(0);

    let err = harness(mocks)
        .service
        .award_tournament(&assistant, tournament_id, vec![known_id, UserId::random()], None)
        .await
        .expect_err("missing user");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn history_of_other_users_requires_assistant() {
    let ctx = RequestContext::new(UserId::random(), Role::User);
    let err = harness(RepoMocks::default())
        .service
        .history(&ctx, UserId::random(), None)
        .await
        .expect_err("forbidden");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn history_reads_own_ledger() {
    let user = sample_user("ada", Role::User, 0);
    let ctx = RequestContext::new(user.id, Role::User);
    let mut mocks = RepoMocks::default();
    mocks
        .users
        .expect_find_by_id()
        .returning(move |_| Ok(Some(user.clone())));
    mocks
        .ledger
        .expect_history()
        .withf(|_, limit| *limit == DEFAULT_HISTORY_LIMIT)
        .times(1)
        .returning(|_, _| Ok(Vec::new()));
    let history = harness(mocks)
        .service
        .history(&ctx, ctx.user_id(), None)
        .await
        .expect("history");
    assert!(history.is_empty());
}
