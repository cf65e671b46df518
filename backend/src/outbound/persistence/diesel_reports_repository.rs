//! PostgreSQL-backed `ReportsRepository`.
//!
//! Each report reads inside one transaction so all of its queries observe
//! the same snapshot.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::{count_star, sql};
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{RepositoryError, ReportsRepository};
use crate::domain::{
    ClaimStatus, DashboardStats, EventId, EventReport, PointSource, ProductSummary, Role,
    StandId, StandReport, StandSummary, Tournament, TournamentStatus, TournamentSummary,
};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{ProductRow, TournamentRow, convert_all};
use super::pool::DbPool;
use super::schema::{claims, events, point_transactions, products, stands, tournaments, users};

#[derive(Clone)]
pub struct DieselReportsRepository {
    pool: DbPool,
}

impl DieselReportsRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Counters keyed by every known storage name, overlaid with the grouped
/// counts the database returned.
fn counted<'a>(
    names: impl IntoIterator<Item = &'a str>,
    rows: Vec<(String, i64)>,
) -> BTreeMap<String, i64> {
    let mut map: BTreeMap<String, i64> = names.into_iter().map(|n| (n.to_owned(), 0)).collect();
    for (name, count) in rows {
        map.insert(name, count);
    }
    map
}

struct RawEventReport {
    name: String,
    tournaments: Vec<TournamentRow>,
    /// (tournament, user, points) for every ledger row of the event's
    /// tournaments.
    ledger: Vec<(Option<Uuid>, Uuid, i64)>,
    stands: Vec<(Uuid, String)>,
    completed: Vec<(Uuid, i64)>,
}

fn assemble_event_report(
    event_id: EventId,
    raw: RawEventReport,
) -> Result<EventReport, RepositoryError> {
    let mut awarded: HashMap<Uuid, i64> = HashMap::new();
    let mut participants: HashMap<Uuid, BTreeSet<Uuid>> = HashMap::new();
    for (tournament, user, points) in raw.ledger {
        let Some(tournament) = tournament else {
            continue;
        };
        *awarded.entry(tournament).or_default() += points;
        participants.entry(tournament).or_default().insert(user);
    }
    let tournaments: Vec<Tournament> = convert_all(raw.tournaments)?;
    let tournaments = tournaments
        .into_iter()
        .map(|t| {
            let key = *t.id.as_uuid();
            TournamentSummary {
                tournament_id: t.id,
                name: t.name,
                status: t.status,
                points_reward: t.points_reward,
                points_awarded: awarded.get(&key).copied().unwrap_or(0),
                participants: participants
                    .get(&key)
                    .map_or(0, |users| i64::try_from(users.len()).unwrap_or(i64::MAX)),
            }
        })
        .collect();
    let completed: HashMap<Uuid, i64> = raw.completed.into_iter().collect();
    let stands = raw
        .stands
        .into_iter()
        .map(|(id, name)| StandSummary {
            stand_id: StandId::from_uuid(id),
            name,
            completed_claims: completed.get(&id).copied().unwrap_or(0),
        })
        .collect();
    Ok(EventReport::new(event_id, raw.name, tournaments, stands))
}

/// Per-product summaries from the stand's products and its claim rows
/// `(product, status, points_spent)`.
fn assemble_products(
    products: Vec<ProductRow>,
    claims: &[(Uuid, String, i64)],
) -> Vec<ProductSummary> {
    products
        .into_iter()
        .map(|product| {
            let mut summary = ProductSummary {
                product_id: product.id.into(),
                name: product.name,
                points_required: product.points_required,
                completed_claims: 0,
                pending_claims: 0,
                points_spent: 0,
            };
            for (_, status, spent) in claims.iter().filter(|(id, _, _)| *id == product.id) {
                if status == ClaimStatus::Completed.as_str() {
                    summary.completed_claims += 1;
                    summary.points_spent += spent;
                } else {
                    summary.pending_claims += 1;
                }
            }
            summary
        })
        .collect()
}

#[async_trait]
impl ReportsRepository for DieselReportsRepository {
    async fn dashboard(&self, now: DateTime<Utc>) -> Result<DashboardStats, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| {
            async move {
                let total_users: i64 = users::table.count().get_result(conn).await?;
                let by_role: Vec<(String, i64)> = users::table
                    .group_by(users::role)
                    .select((users::role, count_star()))
                    .load(conn)
                    .await?;
                let points_awarded: i64 = point_transactions::table
                    .filter(point_transactions::points.gt(0))
                    .select(sql::<BigInt>("COALESCE(SUM(points), 0)::BIGINT"))
                    .get_result(conn)
                    .await?;
                let points_redeemed: i64 = point_transactions::table
                    .filter(point_transactions::source.eq(PointSource::Redemption.as_str()))
                    .select(sql::<BigInt>("COALESCE(-SUM(points), 0)::BIGINT"))
                    .get_result(conn)
                    .await?;
                let by_claim_status: Vec<(String, i64)> = claims::table
                    .group_by(claims::status)
                    .select((claims::status, count_star()))
                    .load(conn)
                    .await?;
                let active_events: i64 = events::table
                    .filter(events::is_active.eq(true))
                    .filter(events::start_date.le(now))
                    .filter(events::end_date.ge(now))
                    .count()
                    .get_result(conn)
                    .await?;
                let by_tournament_status: Vec<(String, i64)> = tournaments::table
                    .group_by(tournaments::status)
                    .select((tournaments::status, count_star()))
                    .load(conn)
                    .await?;
                Ok(DashboardStats {
                    total_users,
                    users_by_role: counted(Role::ALL.map(Role::as_str), by_role),
                    points_awarded,
                    points_redeemed,
                    claims_by_status: counted(
                        ClaimStatus::ALL.map(ClaimStatus::as_str),
                        by_claim_status,
                    ),
                    active_events,
                    tournaments_by_status: counted(
                        TournamentStatus::ALL.map(TournamentStatus::as_str),
                        by_tournament_status,
                    ),
                })
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn event_report(&self, id: &EventId) -> Result<Option<EventReport>, RepositoryError> {
        let event_id = *id;
        let id = *id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let raw = conn
            .transaction(|conn| {
                async move {
                    let name: Option<String> = events::table
                        .find(id)
                        .select(events::name)
                        .first(conn)
                        .await
                        .optional()?;
                    let Some(name) = name else {
                        return Ok(None);
                    };
                    let tournament_rows: Vec<TournamentRow> = tournaments::table
                        .filter(tournaments::event_id.eq(id))
                        .order((tournaments::scheduled_time.asc(), tournaments::id.asc()))
                        .select(TournamentRow::as_select())
                        .load(conn)
                        .await?;
                    let tournament_ids: Vec<Uuid> =
                        tournament_rows.iter().map(|row| row.id).collect();
                    let ledger: Vec<(Option<Uuid>, Uuid, i64)> = point_transactions::table
                        .filter(point_transactions::tournament_id.eq_any(&tournament_ids))
                        .select((
                            point_transactions::tournament_id,
                            point_transactions::user_id,
                            point_transactions::points,
                        ))
                        .load(conn)
                        .await?;
                    let stand_rows: Vec<(Uuid, String)> = stands::table
                        .filter(stands::event_id.eq(id))
                        .order((stands::name.asc(), stands::id.asc()))
                        .select((stands::id, stands::name))
                        .load(conn)
                        .await?;
                    let stand_ids: Vec<Uuid> = stand_rows.iter().map(|(id, _)| *id).collect();
                    let completed: Vec<(Uuid, i64)> = claims::table
                        .filter(claims::stand_id.eq_any(&stand_ids))
                        .filter(claims::status.eq(ClaimStatus::Completed.as_str()))
                        .group_by(claims::stand_id)
                        .select((claims::stand_id, count_star()))
                        .load(conn)
                        .await?;
                    Ok(Some(RawEventReport {
                        name,
                        tournaments: tournament_rows,
                        ledger,
                        stands: stand_rows,
                        completed,
                    }))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        raw.map(|raw| assemble_event_report(event_id, raw))
            .transpose()
    }

    async fn stand_report(&self, id: &StandId) -> Result<Option<StandReport>, RepositoryError> {
        let stand_id = *id;
        let id = *id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let raw = conn
            .transaction(|conn| {
                async move {
                    let name: Option<String> = stands::table
                        .find(id)
                        .select(stands::name)
                        .first(conn)
                        .await
                        .optional()?;
                    let Some(name) = name else {
                        return Ok(None);
                    };
                    let product_rows: Vec<ProductRow> = products::table
                        .filter(products::stand_id.eq(id))
                        .order((products::name.asc(), products::id.asc()))
                        .select(ProductRow::as_select())
                        .load(conn)
                        .await?;
                    let claim_rows: Vec<(Uuid, String, i64)> = claims::table
                        .filter(claims::stand_id.eq(id))
                        .select((claims::product_id, claims::status, claims::points_spent))
                        .load(conn)
                        .await?;
                    Ok(Some((name, product_rows, claim_rows)))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        Ok(raw.map(|(name, product_rows, claim_rows)| {
            StandReport::new(stand_id, name, assemble_products(product_rows, &claim_rows))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn counted_keeps_zero_rows() {
        let map = counted(
            ClaimStatus::ALL.map(ClaimStatus::as_str),
            vec![("completed".to_owned(), 4)],
        );
        assert_eq!(map["completed"], 4);
        assert_eq!(map["pending"], 0);
    }

    #[rstest]
    fn event_report_aggregates_per_tournament() {
        let tournament = Uuid::new_v4();
        let stand = Uuid::new_v4();
        let (ada, bob) = (Uuid::new_v4(), Uuid::new_v4());
        let raw = RawEventReport {
            name: "Summer Cup".to_owned(),
            tournaments: vec![TournamentRow {
                id: tournament,
                event_id: Uuid::new_v4(),
                name: "Finals".to_owned(),
                scheduled_time: Utc::now(),
                points_reward: 50,
                specifications: json!({}),
                status: "completed".to_owned(),
                created_at: Utc::now(),
            }],
            ledger: vec![
                (Some(tournament), ada, 50),
                (Some(tournament), bob, 50),
                (Some(tournament), ada, 50),
            ],
            stands: vec![(stand, "Snacks".to_owned())],
            completed: vec![(stand, 3)],
        };
        let report = assemble_event_report(EventId::random(), raw).expect("report");
        assert_eq!(report.points_awarded, 150);
        assert_eq!(report.tournaments[0].participants, 2);
        assert_eq!(report.stands[0].completed_claims, 3);
    }

    #[rstest]
    fn stand_products_split_completed_and_pending() {
        let product = Uuid::new_v4();
        let rows = vec![ProductRow {
            id: product,
            stand_id: Uuid::new_v4(),
            name: "Mug".to_owned(),
            description: String::new(),
            points_required: 30,
            is_active: true,
            image_url: None,
            created_at: Utc::now(),
        }];
        let claims = vec![
            (product, "completed".to_owned(), 30),
            (product, "pending".to_owned(), 30),
            (Uuid::new_v4(), "completed".to_owned(), 99),
        ];
        let summaries = assemble_products(rows, &claims);
        assert_eq!(summaries[0].completed_claims, 1);
        assert_eq!(summaries[0].pending_claims, 1);
        assert_eq!(summaries[0].points_spent, 30);
    }
}
