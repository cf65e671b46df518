//! Points assignment and ledger history.
//!
//! Points can only be assigned while an event is active. Each assignment
//! writes one ledger entry and bumps the recipient's total atomically, then
//! invalidates the derived leaderboard and statistics caches.

use std::collections::BTreeSet;
use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    EventRepository, KeyValueCache, LEADERBOARD_PREFIX, LedgerWriteOutcome, PointsLedger,
    Repositories, STATS_PREFIX, TournamentRepository, UserRepository, invalidate,
};
use crate::domain::{
    AssignPointsRequest, Error, Event, NewPointTransaction, NotificationKind, NotificationService,
    PointSource, PointTransaction, RequestContext, Role, RuleViolation, TournamentId,
    TransactionId, UserId, ValidationErrors,
};

/// Default page size for ledger history.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;
/// Largest ledger history page.
pub const MAX_HISTORY_LIMIT: usize = 200;

#[derive(Clone)]
pub struct PointsService {
    users: Arc<dyn UserRepository>,
    events: Arc<dyn EventRepository>,
    tournaments: Arc<dyn TournamentRepository>,
    ledger: Arc<dyn PointsLedger>,
    notifications: NotificationService,
    cache: Arc<dyn KeyValueCache>,
    clock: Arc<dyn Clock>,
}

impl PointsService {
    pub fn new(
        repos: &Repositories,
        notifications: NotificationService,
        cache: Arc<dyn KeyValueCache>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users: repos.users.clone(),
            events: repos.events.clone(),
            tournaments: repos.tournaments.clone(),
            ledger: repos.ledger.clone(),
            notifications,
            cache,
            clock,
        }
    }

    async fn active_event(&self) -> Result<Event, Error> {
        self.events
            .find_active(self.clock.utc())
            .await?
            .ok_or_else(|| RuleViolation::NoActiveEvent.into())
    }

    async fn check_tournament(
        &self,
        tournament_id: TournamentId,
        event: &Event,
        errors: &mut ValidationErrors,
    ) -> Result<(), Error> {
        match self.tournaments.find_by_id(&tournament_id).await? {
            None => errors.push("tournamentId", "tournament not found"),
            Some(tournament) if tournament.event_id != event.id => errors.push(
                "tournamentId",
                "tournament does not belong to the active event",
            ),
            Some(_) => {}
        }
        Ok(())
    }

    async fn check_user(&self, user_id: UserId, errors: &mut ValidationErrors) -> Result<(), Error> {
        if self.users.find_by_id(&user_id).await?.is_none() {
            errors.push("userId", format!("user {user_id} not found"));
        }
        Ok(())
    }

    async fn write(&self, entries: &[NewPointTransaction]) -> Result<Vec<PointTransaction>, Error> {
        match self.ledger.record(entries).await? {
            LedgerWriteOutcome::Recorded(recorded) => {
                invalidate(self.cache.as_ref(), &[LEADERBOARD_PREFIX, STATS_PREFIX]).await;
                Ok(recorded)
            }
            LedgerWriteOutcome::UnknownUser(user_id) => {
                Err(Error::not_found(format!("user {user_id} not found")))
            }
        }
    }

    async fn announce(&self, entry: &PointTransaction) {
        let message = format!("You received {} points ({})", entry.points, entry.source);
        self.notifications
            .notify_after_commit(
                entry.user_id,
                NotificationKind::PointsAwarded,
                "Points awarded",
                &message,
            )
            .await;
    }

    /// Award points to one user. Assistant or higher.
    pub async fn assign(
        &self,
        ctx: &RequestContext,
        mut request: AssignPointsRequest,
    ) -> Result<PointTransaction, Error> {
        ctx.require(Role::Assistant)?;
        let event = self.active_event().await?;

        let mut errors = request.check_shape();
        self.check_user(request.user_id, &mut errors).await?;
        if let (PointSource::Tournament, Some(tournament_id)) =
            (request.source, request.tournament_id)
        {
            self.check_tournament(tournament_id, &event, &mut errors)
                .await?;
        }
        errors.into_result(())?;

        let entry = NewPointTransaction {
            id: TransactionId::random(),
            user_id: request.user_id,
            points: request.amount,
            source: request.source,
            tournament_id: request.tournament_id,
            claim_id: None,
            notes: request.notes,
            created_at: self.clock.utc(),
            created_by: ctx.user_id(),
        };
        let recorded = self
            .write(std::slice::from_ref(&entry))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::internal("ledger returned no entry"))?;
        info!(
            user_id = %recorded.user_id,
            points = recorded.points,
            source = %recorded.source,
            assigned_by = %ctx.user_id(),
            "points assigned"
        );
        self.announce(&recorded).await;
        Ok(recorded)
    }

    /// Award a tournament's reward to each listed user. Every recipient is
    /// validated before anything is written, and the entries are recorded as
    /// one unit.
    pub async fn award_tournament(
        &self,
        ctx: &RequestContext,
        tournament_id: TournamentId,
        user_ids: Vec<UserId>,
        notes: Option<String>,
    ) -> Result<Vec<PointTransaction>, Error> {
        ctx.require(Role::Assistant)?;
        let event = self.active_event().await?;
        let tournament = self
            .tournaments
            .find_by_id(&tournament_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("tournament {tournament_id} not found")))?;

        let mut errors = ValidationErrors::new();
        errors.check(
            tournament.event_id == event.id,
            "tournamentId",
            "tournament does not belong to the active event",
        );
        errors.check(!user_ids.is_empty(), "userIds", "at least one user is required");
        let mut seen = BTreeSet::new();
        let recipients: Vec<UserId> = user_ids.into_iter().filter(|id| seen.insert(*id)).collect();
        for user_id in &recipients {
            self.check_user(*user_id, &mut errors).await?;
        }

        // Same shape rules as a single assignment, applied once.
        let mut probe = AssignPointsRequest {
            user_id: ctx.user_id(),
            amount: tournament.points_reward,
            source: PointSource::Tournament,
            tournament_id: Some(tournament_id),
            notes,
        };
        errors.extend(probe.check_shape());
        errors.into_result(())?;

        let now = self.clock.utc();
        let entries: Vec<NewPointTransaction> = recipients
            .iter()
            .map(|user_id| NewPointTransaction {
                id: TransactionId::random(),
                user_id: *user_id,
                points: tournament.points_reward,
                source: PointSource::Tournament,
                tournament_id: Some(tournament_id),
                claim_id: None,
                notes: probe.notes.clone(),
                created_at: now,
                created_by: ctx.user_id(),
            })
            .collect();
        let recorded = self.write(&entries).await?;
        info!(
            %tournament_id,
            recipients = recorded.len(),
            points = tournament.points_reward,
            "tournament points awarded"
        );
        for entry in &recorded {
            self.announce(entry).await;
        }
        Ok(recorded)
    }

    /// Ledger entries for a user, newest first. Users may read their own;
    /// assistants and above may read anyone's.
    pub async fn history(
        &self,
        ctx: &RequestContext,
        user_id: UserId,
        limit: Option<usize>,
    ) -> Result<Vec<PointTransaction>, Error> {
        ctx.require_self_or(user_id, Role::Assistant)?;
        if self.users.find_by_id(&user_id).await?.is_none() {
            return Err(Error::not_found(format!("user {user_id} not found")));
        }
        let limit = limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .clamp(1, MAX_HISTORY_LIMIT);
        Ok(self.ledger.history(&user_id, limit).await?)
    }
}

#[cfg(test)]
#[path = "points_service_tests.rs"]
mod tests;
