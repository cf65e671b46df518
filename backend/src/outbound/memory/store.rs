//! Repository port implementations over in-process collections.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::ports::{
    ClaimRepository, ClaimWriteOutcome, DeleteOutcome, EventRepository, LedgerWriteOutcome,
    NotificationRepository, PointsLedger, ProductRepository, RepositoryError, StandRepository,
    TournamentRepository, UserInsertOutcome, UserRepository,
};
use crate::domain::{
    Claim, ClaimId, ClaimStatus, Event, EventId, NewClaim, NewPointTransaction, NewUser,
    Notification, NotificationId, PointSource, PointTransaction, Product, ProductId, Role, Stand,
    StandId, Standing, Tournament, TournamentId, TransactionId, User, UserId,
};

#[derive(Default)]
pub(super) struct State {
    pub(super) users: HashMap<UserId, User>,
    pub(super) events: HashMap<EventId, Event>,
    pub(super) tournaments: HashMap<TournamentId, Tournament>,
    pub(super) stands: HashMap<StandId, Stand>,
    pub(super) products: HashMap<ProductId, Product>,
    pub(super) claims: HashMap<ClaimId, Claim>,
    /// Append-only, in insertion order.
    pub(super) ledger: Vec<PointTransaction>,
    pub(super) notifications: Vec<Notification>,
}

impl State {
    /// Apply entries to the ledger and running totals. Callers have already
    /// checked every user exists.
    fn append(&mut self, entries: Vec<PointTransaction>) {
        for entry in &entries {
            if let Some(user) = self.users.get_mut(&entry.user_id) {
                user.total_points += entry.points;
            }
        }
        self.ledger.extend(entries);
    }

    /// Check the balance, then store `claim` completed together with its
    /// redemption entry.
    fn redeem(
        &mut self,
        mut claim: Claim,
        processed_by: UserId,
        processed_at: DateTime<Utc>,
    ) -> ClaimWriteOutcome {
        let Some(user) = self.users.get(&claim.user_id) else {
            return ClaimWriteOutcome::NotFound;
        };
        if user.total_points < claim.points_spent {
            return ClaimWriteOutcome::Insufficient {
                available: user.total_points,
                required: claim.points_spent,
            };
        }
        claim.status = ClaimStatus::Completed;
        claim.processed_at = Some(processed_at);
        claim.processed_by = Some(processed_by);
        let redemption = PointTransaction {
            id: TransactionId::random(),
            user_id: claim.user_id,
            points: -claim.points_spent,
            source: PointSource::Redemption,
            tournament_id: None,
            claim_id: Some(claim.id),
            notes: None,
            created_at: processed_at,
            created_by: processed_by,
        };
        self.append(vec![redemption.clone()]);
        self.claims.insert(claim.id, claim.clone());
        ClaimWriteOutcome::Written {
            claim,
            redemption: Some(redemption),
        }
    }
}

/// Sort newest first, keeping insertion order reversed among equal
/// timestamps.
fn newest_first<T>(mut rows: Vec<T>, at: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    rows.reverse();
    rows.sort_by_key(|row| std::cmp::Reverse(at(row)));
    rows
}

#[derive(Default)]
pub struct InMemoryStore {
    pub(super) state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, user: &NewUser) -> Result<UserInsertOutcome, RepositoryError> {
        let mut state = self.state.lock().await;
        if state.users.values().any(|u| u.nickname == user.nickname) {
            return Ok(UserInsertOutcome::NicknameTaken);
        }
        if state.users.values().any(|u| u.email == user.email) {
            return Ok(UserInsertOutcome::EmailTaken);
        }
        let stored = User {
            id: user.id,
            nickname: user.nickname.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role,
            total_points: 0,
            profile_image: None,
            created_at: user.created_at,
        };
        state.users.insert(stored.id, stored.clone());
        Ok(UserInsertOutcome::Inserted(stored))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.state.lock().await.users.get(id).cloned())
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<User>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .find(|u| u.nickname.as_str() == login || u.email.as_str() == login)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let state = self.state.lock().await;
        let mut users: Vec<User> = state.users.values().cloned().collect();
        users.sort_by_key(|u| (u.created_at, u.id));
        Ok(users)
    }

    async fn list_ids(&self) -> Result<Vec<UserId>, RepositoryError> {
        let mut ids: Vec<UserId> = self.state.lock().await.users.keys().copied().collect();
        ids.sort();
        Ok(ids)
    }

    async fn update_role(&self, id: &UserId, role: Role) -> Result<Option<User>, RepositoryError> {
        let mut state = self.state.lock().await;
        Ok(state.users.get_mut(id).map(|user| {
            user.role = role;
            user.clone()
        }))
    }

    async fn update_profile_image(
        &self,
        id: &UserId,
        profile_image: Option<String>,
    ) -> Result<Option<User>, RepositoryError> {
        let mut state = self.state.lock().await;
        Ok(state.users.get_mut(id).map(|user| {
            user.profile_image = profile_image;
            user.clone()
        }))
    }
}

#[async_trait]
impl EventRepository for InMemoryStore {
    async fn insert(&self, event: &Event) -> Result<(), RepositoryError> {
        self.state.lock().await.events.insert(event.id, event.clone());
        Ok(())
    }

    async fn update(&self, event: &Event) -> Result<bool, RepositoryError> {
        let mut state = self.state.lock().await;
        Ok(match state.events.get_mut(&event.id) {
            Some(slot) => {
                *slot = event.clone();
                true
            }
            None => false,
        })
    }

    async fn find_by_id(&self, id: &EventId) -> Result<Option<Event>, RepositoryError> {
        Ok(self.state.lock().await.events.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Event>, RepositoryError> {
        let mut events: Vec<Event> = self.state.lock().await.events.values().cloned().collect();
        events.sort_by_key(|e| (e.start_date, e.id));
        Ok(events)
    }

    async fn find_active(&self, now: DateTime<Utc>) -> Result<Option<Event>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .events
            .values()
            .filter(|e| e.is_active_at(now))
            .max_by_key(|e| (e.start_date, e.id))
            .cloned())
    }

    async fn delete(&self, id: &EventId) -> Result<DeleteOutcome, RepositoryError> {
        let mut state = self.state.lock().await;
        if !state.events.contains_key(id) {
            return Ok(DeleteOutcome::NotFound);
        }
        let referenced = state.tournaments.values().any(|t| t.event_id == *id)
            || state.stands.values().any(|s| s.event_id == *id);
        if referenced {
            return Ok(DeleteOutcome::InUse);
        }
        state.events.remove(id);
        Ok(DeleteOutcome::Deleted)
    }
}

#[async_trait]
impl TournamentRepository for InMemoryStore {
    async fn insert(&self, tournament: &Tournament) -> Result<(), RepositoryError> {
        self.state
            .lock()
            .await
            .tournaments
            .insert(tournament.id, tournament.clone());
        Ok(())
    }

    async fn update(&self, tournament: &Tournament) -> Result<bool, RepositoryError> {
        let mut state = self.state.lock().await;
        Ok(match state.tournaments.get_mut(&tournament.id) {
            Some(slot) => {
                *slot = tournament.clone();
                true
            }
            None => false,
        })
    }

    async fn find_by_id(&self, id: &TournamentId) -> Result<Option<Tournament>, RepositoryError> {
        Ok(self.state.lock().await.tournaments.get(id).cloned())
    }

    async fn list_for_event(&self, event_id: &EventId) -> Result<Vec<Tournament>, RepositoryError> {
        let state = self.state.lock().await;
        let mut rows: Vec<Tournament> = state
            .tournaments
            .values()
            .filter(|t| t.event_id == *event_id)
            .cloned()
            .collect();
        rows.sort_by_key(|t| (t.scheduled_time, t.id));
        Ok(rows)
    }

    async fn delete(&self, id: &TournamentId) -> Result<DeleteOutcome, RepositoryError> {
        let mut state = self.state.lock().await;
        if !state.tournaments.contains_key(id) {
            return Ok(DeleteOutcome::NotFound);
        }
        if state.ledger.iter().any(|tx| tx.tournament_id == Some(*id)) {
            return Ok(DeleteOutcome::InUse);
        }
        state.tournaments.remove(id);
        Ok(DeleteOutcome::Deleted)
    }
}

#[async_trait]
impl StandRepository for InMemoryStore {
    async fn insert(&self, stand: &Stand) -> Result<(), RepositoryError> {
        self.state.lock().await.stands.insert(stand.id, stand.clone());
        Ok(())
    }

    async fn update(&self, stand: &Stand) -> Result<bool, RepositoryError> {
        let mut state = self.state.lock().await;
        Ok(match state.stands.get_mut(&stand.id) {
            Some(slot) => {
                *slot = stand.clone();
                true
            }
            None => false,
        })
    }

    async fn find_by_id(&self, id: &StandId) -> Result<Option<Stand>, RepositoryError> {
        Ok(self.state.lock().await.stands.get(id).cloned())
    }

    async fn list(&self, event_id: Option<EventId>) -> Result<Vec<Stand>, RepositoryError> {
        let state = self.state.lock().await;
        let mut rows: Vec<Stand> = state
            .stands
            .values()
            .filter(|s| event_id.is_none_or(|event| s.event_id == event))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn delete(&self, id: &StandId) -> Result<DeleteOutcome, RepositoryError> {
        let mut state = self.state.lock().await;
        if !state.stands.contains_key(id) {
            return Ok(DeleteOutcome::NotFound);
        }
        if state.claims.values().any(|c| c.stand_id == *id) {
            return Ok(DeleteOutcome::InUse);
        }
        state.products.retain(|_, p| p.stand_id != *id);
        state.stands.remove(id);
        Ok(DeleteOutcome::Deleted)
    }
}

#[async_trait]
impl ProductRepository for InMemoryStore {
    async fn insert(&self, product: &Product) -> Result<(), RepositoryError> {
        self.state
            .lock()
            .await
            .products
            .insert(product.id, product.clone());
        Ok(())
    }

    async fn update(&self, product: &Product) -> Result<bool, RepositoryError> {
        let mut state = self.state.lock().await;
        Ok(match state.products.get_mut(&product.id) {
            Some(slot) => {
                *slot = product.clone();
                true
            }
            None => false,
        })
    }

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.state.lock().await.products.get(id).cloned())
    }

    async fn list_for_stand(
        &self,
        stand_id: &StandId,
        active_only: bool,
    ) -> Result<Vec<Product>, RepositoryError> {
        let state = self.state.lock().await;
        let mut rows: Vec<Product> = state
            .products
            .values()
            .filter(|p| p.stand_id == *stand_id && (!active_only || p.is_active))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(rows)
    }
}

#[async_trait]
impl ClaimRepository for InMemoryStore {
    async fn create(&self, claim: &NewClaim) -> Result<ClaimWriteOutcome, RepositoryError> {
        let mut state = self.state.lock().await;
        let Some(user) = state.users.get(&claim.user_id) else {
            return Ok(ClaimWriteOutcome::NotFound);
        };
        let available = user.total_points;
        let duplicate = state
            .claims
            .values()
            .any(|c| c.user_id == claim.user_id && c.product_id == claim.product_id);
        if duplicate {
            return Ok(ClaimWriteOutcome::Duplicate);
        }
        if available < claim.points_required {
            return Ok(ClaimWriteOutcome::Insufficient {
                available,
                required: claim.points_required,
            });
        }
        let pending = Claim {
            id: claim.id,
            user_id: claim.user_id,
            product_id: claim.product_id,
            stand_id: claim.stand_id,
            status: ClaimStatus::Pending,
            points_spent: claim.points_required,
            created_at: claim.created_at,
            processed_at: None,
            processed_by: None,
        };
        Ok(match claim.processed_by {
            Some(processor) => state.redeem(pending, processor, claim.created_at),
            None => {
                state.claims.insert(pending.id, pending.clone());
                ClaimWriteOutcome::Written {
                    claim: pending,
                    redemption: None,
                }
            }
        })
    }

    async fn complete(
        &self,
        id: &ClaimId,
        processed_by: &UserId,
        processed_at: DateTime<Utc>,
    ) -> Result<ClaimWriteOutcome, RepositoryError> {
        let mut state = self.state.lock().await;
        let Some(claim) = state.claims.get(id).cloned() else {
            return Ok(ClaimWriteOutcome::NotFound);
        };
        if !claim.is_pending() {
            return Ok(ClaimWriteOutcome::AlreadyProcessed);
        }
        Ok(state.redeem(claim, *processed_by, processed_at))
    }

    async fn find_by_id(&self, id: &ClaimId) -> Result<Option<Claim>, RepositoryError> {
        Ok(self.state.lock().await.claims.get(id).cloned())
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Claim>, RepositoryError> {
        let state = self.state.lock().await;
        let rows = state
            .claims
            .values()
            .filter(|c| c.user_id == *user_id)
            .cloned()
            .collect();
        Ok(newest_first(rows, |c: &Claim| c.created_at))
    }

    async fn list_for_stand(
        &self,
        stand_id: &StandId,
        status: Option<ClaimStatus>,
    ) -> Result<Vec<Claim>, RepositoryError> {
        let state = self.state.lock().await;
        let rows = state
            .claims
            .values()
            .filter(|c| c.stand_id == *stand_id && status.is_none_or(|s| c.status == s))
            .cloned()
            .collect();
        Ok(newest_first(rows, |c: &Claim| c.created_at))
    }
}

#[async_trait]
impl PointsLedger for InMemoryStore {
    async fn record(
        &self,
        entries: &[NewPointTransaction],
    ) -> Result<LedgerWriteOutcome, RepositoryError> {
        let mut state = self.state.lock().await;
        if let Some(missing) = entries
            .iter()
            .find(|entry| !state.users.contains_key(&entry.user_id))
        {
            return Ok(LedgerWriteOutcome::UnknownUser(missing.user_id));
        }
        let stored: Vec<PointTransaction> = entries
            .iter()
            .cloned()
            .map(NewPointTransaction::into_stored)
            .collect();
        state.append(stored.clone());
        Ok(LedgerWriteOutcome::Recorded(stored))
    }

    async fn history(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<PointTransaction>, RepositoryError> {
        let state = self.state.lock().await;
        let rows = state
            .ledger
            .iter()
            .filter(|tx| tx.user_id == *user_id)
            .cloned()
            .collect();
        let mut rows = newest_first(rows, |tx: &PointTransaction| tx.created_at);
        rows.truncate(limit);
        Ok(rows)
    }

    async fn standings(&self) -> Result<Vec<Standing>, RepositoryError> {
        let state = self.state.lock().await;
        let mut first_seen: HashMap<UserId, DateTime<Utc>> = HashMap::new();
        for tx in &state.ledger {
            first_seen
                .entry(tx.user_id)
                .and_modify(|at| *at = (*at).min(tx.created_at))
                .or_insert(tx.created_at);
        }
        Ok(first_seen
            .into_iter()
            .filter_map(|(user_id, first_transaction_at)| {
                state.users.get(&user_id).map(|user| Standing {
                    user_id,
                    nickname: user.nickname.clone(),
                    profile_image: user.profile_image.clone(),
                    total_points: user.total_points,
                    first_transaction_at,
                })
            })
            .collect())
    }
}

#[async_trait]
impl NotificationRepository for InMemoryStore {
    async fn insert_many(&self, notifications: &[Notification]) -> Result<(), RepositoryError> {
        self.state
            .lock()
            .await
            .notifications
            .extend_from_slice(notifications);
        Ok(())
    }

    async fn list(
        &self,
        user_id: &UserId,
        unread_only: bool,
        limit: usize,
    ) -> Result<Vec<Notification>, RepositoryError> {
        let state = self.state.lock().await;
        let rows = state
            .notifications
            .iter()
            .filter(|n| n.user_id == *user_id && (!unread_only || !n.is_read))
            .cloned()
            .collect();
        let mut rows = newest_first(rows, |n: &Notification| n.created_at);
        rows.truncate(limit);
        Ok(rows)
    }

    async fn unread_count(&self, user_id: &UserId) -> Result<i64, RepositoryError> {
        let state = self.state.lock().await;
        let count = state
            .notifications
            .iter()
            .filter(|n| n.user_id == *user_id && !n.is_read)
            .count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    async fn mark_read(
        &self,
        user_id: &UserId,
        id: &NotificationId,
    ) -> Result<bool, RepositoryError> {
        let mut state = self.state.lock().await;
        Ok(state
            .notifications
            .iter_mut()
            .find(|n| n.id == *id && n.user_id == *user_id)
            .map(|n| n.is_read = true)
            .is_some())
    }

    async fn mark_all_read(&self, user_id: &UserId) -> Result<u64, RepositoryError> {
        let mut state = self.state.lock().await;
        let mut changed = 0;
        for notification in state
            .notifications
            .iter_mut()
            .filter(|n| n.user_id == *user_id && !n.is_read)
        {
            notification.is_read = true;
            changed += 1;
        }
        Ok(changed)
    }
}

/// Distinct users with ledger entries for a tournament.
pub(super) fn participants(ledger: &[PointTransaction], tournament_id: TournamentId) -> i64 {
    let users: BTreeSet<UserId> = ledger
        .iter()
        .filter(|tx| tx.tournament_id == Some(tournament_id))
        .map(|tx| tx.user_id)
        .collect();
    i64::try_from(users.len()).unwrap_or(i64::MAX)
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
