//! Aggregate reports computed over the in-memory collections.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::store::{InMemoryStore, participants};
use crate::domain::ports::{RepositoryError, ReportsRepository};
use crate::domain::{
    ClaimStatus, DashboardStats, EventId, EventReport, PointSource, ProductSummary, Role, StandId,
    StandReport, StandSummary, TournamentStatus, TournamentSummary,
};

fn count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Zero-filled counters for every storage name, so absent categories
/// still appear.
fn zeroed<'a>(names: impl IntoIterator<Item = &'a str>) -> BTreeMap<String, i64> {
    names.into_iter().map(|name| (name.to_owned(), 0)).collect()
}

#[async_trait]
impl ReportsRepository for InMemoryStore {
    async fn dashboard(&self, now: DateTime<Utc>) -> Result<DashboardStats, RepositoryError> {
        let state = self.state.lock().await;
        let mut users_by_role = zeroed(Role::ALL.map(Role::as_str));
        for user in state.users.values() {
            *users_by_role.entry(user.role.as_str().to_owned()).or_default() += 1;
        }
        let mut claims_by_status = zeroed(ClaimStatus::ALL.map(ClaimStatus::as_str));
        for claim in state.claims.values() {
            *claims_by_status
                .entry(claim.status.as_str().to_owned())
                .or_default() += 1;
        }
        let mut tournaments_by_status = zeroed(TournamentStatus::ALL.map(TournamentStatus::as_str));
        for tournament in state.tournaments.values() {
            *tournaments_by_status
                .entry(tournament.status.as_str().to_owned())
                .or_default() += 1;
        }
        Ok(DashboardStats {
            total_users: count(state.users.len()),
            users_by_role,
            points_awarded: state.ledger.iter().map(|tx| tx.points.max(0)).sum(),
            points_redeemed: state
                .ledger
                .iter()
                .filter(|tx| tx.source == PointSource::Redemption)
                .map(|tx| tx.points.abs())
                .sum(),
            claims_by_status,
            active_events: count(state.events.values().filter(|e| e.is_active_at(now)).count()),
            tournaments_by_status,
        })
    }

    async fn event_report(&self, id: &EventId) -> Result<Option<EventReport>, RepositoryError> {
        let state = self.state.lock().await;
        let Some(event) = state.events.get(id) else {
            return Ok(None);
        };
        let mut tournaments: Vec<_> = state
            .tournaments
            .values()
            .filter(|t| t.event_id == *id)
            .collect();
        tournaments.sort_by_key(|t| (t.scheduled_time, t.id));
        let tournaments = tournaments
            .into_iter()
            .map(|t| TournamentSummary {
                tournament_id: t.id,
                name: t.name.clone(),
                status: t.status,
                points_reward: t.points_reward,
                points_awarded: state
                    .ledger
                    .iter()
                    .filter(|tx| tx.tournament_id == Some(t.id))
                    .map(|tx| tx.points)
                    .sum(),
                participants: participants(&state.ledger, t.id),
            })
            .collect();
        let mut stands: Vec<_> = state.stands.values().filter(|s| s.event_id == *id).collect();
        stands.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        let stands = stands
            .into_iter()
            .map(|s| StandSummary {
                stand_id: s.id,
                name: s.name.clone(),
                completed_claims: count(
                    state
                        .claims
                        .values()
                        .filter(|c| c.stand_id == s.id && !c.is_pending())
                        .count(),
                ),
            })
            .collect();
        Ok(Some(EventReport::new(
            event.id,
            event.name.clone(),
            tournaments,
            stands,
        )))
    }

    async fn stand_report(&self, id: &StandId) -> Result<Option<StandReport>, RepositoryError> {
        let state = self.state.lock().await;
        let Some(stand) = state.stands.get(id) else {
            return Ok(None);
        };
        let mut products: Vec<_> = state
            .products
            .values()
            .filter(|p| p.stand_id == *id)
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        let products = products
            .into_iter()
            .map(|product| {
                let claims = || state.claims.values().filter(|c| c.product_id == product.id);
                ProductSummary {
                    product_id: product.id,
                    name: product.name.clone(),
                    points_required: product.points_required,
                    completed_claims: count(claims().filter(|c| !c.is_pending()).count()),
                    pending_claims: count(claims().filter(|c| c.is_pending()).count()),
                    points_spent: claims()
                        .filter(|c| !c.is_pending())
                        .map(|c| c.points_spent)
                        .sum(),
                }
            })
            .collect();
        Ok(Some(StandReport::new(stand.id, stand.name.clone(), products)))
    }
}
