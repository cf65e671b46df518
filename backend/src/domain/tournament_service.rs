//! Tournament scheduling and lifecycle.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    DeleteOutcome, EventRepository, KeyValueCache, STATS_PREFIX, TournamentRepository, invalidate,
};
use crate::domain::{
    Error, Event, EventId, RequestContext, Role, RuleViolation, Tournament, TournamentDraft,
    TournamentId, TournamentStatus,
};

#[derive(Clone)]
pub struct TournamentService {
    tournaments: Arc<dyn TournamentRepository>,
    events: Arc<dyn EventRepository>,
    cache: Arc<dyn KeyValueCache>,
    clock: Arc<dyn Clock>,
}

impl TournamentService {
    pub fn new(
        tournaments: Arc<dyn TournamentRepository>,
        events: Arc<dyn EventRepository>,
        cache: Arc<dyn KeyValueCache>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tournaments,
            events,
            cache,
            clock,
        }
    }

    async fn event(&self, id: EventId) -> Result<Event, Error> {
        self.events
            .find_by_id(&id)
            .await?
            .ok_or_else(|| Error::not_found(format!("event {id} not found")))
    }

    async fn store_update(&self, tournament: &Tournament) -> Result<(), Error> {
        if !self.tournaments.update(tournament).await? {
            return Err(Error::not_found(format!(
                "tournament {} not found",
                tournament.id
            )));
        }
        invalidate(self.cache.as_ref(), &[STATS_PREFIX]).await;
        Ok(())
    }

    /// Schedule a tournament inside an active event. Assistant or higher.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        event_id: EventId,
        draft: TournamentDraft,
    ) -> Result<Tournament, Error> {
        ctx.require(Role::Assistant)?;
        let event = self.event(event_id).await?;
        if !event.is_active_at(self.clock.utc()) {
            return Err(RuleViolation::InactiveEvent.into());
        }
        let draft = draft.validate(&event)?;
        let tournament = Tournament {
            id: TournamentId::random(),
            event_id,
            name: draft.name,
            scheduled_time: draft.scheduled_time,
            points_reward: draft.points_reward,
            specifications: draft.specifications,
            status: TournamentStatus::Scheduled,
            created_at: self.clock.utc(),
        };
        self.tournaments.insert(&tournament).await?;
        info!(tournament_id = %tournament.id, %event_id, "tournament created");
        invalidate(self.cache.as_ref(), &[STATS_PREFIX]).await;
        Ok(tournament)
    }

    /// Replace the editable fields. Assistant or higher.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: TournamentId,
        draft: TournamentDraft,
    ) -> Result<Tournament, Error> {
        ctx.require(Role::Assistant)?;
        let current = self.get(id).await?;
        let event = self.event(current.event_id).await?;
        let draft = draft.validate(&event)?;
        let tournament = Tournament {
            name: draft.name,
            scheduled_time: draft.scheduled_time,
            points_reward: draft.points_reward,
            specifications: draft.specifications,
            ..current
        };
        self.store_update(&tournament).await?;
        Ok(tournament)
    }

    /// Move the status forward. Assistant or higher.
    pub async fn advance_status(
        &self,
        ctx: &RequestContext,
        id: TournamentId,
        status: TournamentStatus,
    ) -> Result<Tournament, Error> {
        ctx.require(Role::Assistant)?;
        let current = self.get(id).await?;
        let status = current.status.transition_to(status)?;
        let tournament = Tournament { status, ..current };
        self.store_update(&tournament).await?;
        info!(tournament_id = %id, %status, "tournament status changed");
        Ok(tournament)
    }

    pub async fn get(&self, id: TournamentId) -> Result<Tournament, Error> {
        self.tournaments
            .find_by_id(&id)
            .await?
            .ok_or_else(|| Error::not_found(format!("tournament {id} not found")))
    }

    pub async fn list_for_event(&self, event_id: EventId) -> Result<Vec<Tournament>, Error> {
        self.event(event_id).await?;
        Ok(self.tournaments.list_for_event(&event_id).await?)
    }

    /// Delete a tournament that has not distributed points. Admin only.
    pub async fn delete(&self, ctx: &RequestContext, id: TournamentId) -> Result<(), Error> {
        ctx.require(Role::Admin)?;
        match self.tournaments.delete(&id).await? {
            DeleteOutcome::Deleted => {
                info!(tournament_id = %id, "tournament deleted");
                invalidate(self.cache.as_ref(), &[STATS_PREFIX]).await;
                Ok(())
            }
            DeleteOutcome::NotFound => {
                Err(Error::not_found(format!("tournament {id} not found")))
            }
            DeleteOutcome::InUse => Err(RuleViolation::TournamentHasPoints.into()),
        }
    }
}
