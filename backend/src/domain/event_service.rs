//! Event administration.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use crate::domain::ports::{DeleteOutcome, EventRepository, KeyValueCache, STATS_PREFIX, invalidate};
use crate::domain::{Error, Event, EventDraft, EventId, RequestContext, Role, RuleViolation};

#[derive(Clone)]
pub struct EventService {
    events: Arc<dyn EventRepository>,
    cache: Arc<dyn KeyValueCache>,
    clock: Arc<dyn Clock>,
}

impl EventService {
    pub fn new(
        events: Arc<dyn EventRepository>,
        cache: Arc<dyn KeyValueCache>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            events,
            cache,
            clock,
        }
    }

    pub async fn create(&self, ctx: &RequestContext, draft: EventDraft) -> Result<Event, Error> {
        ctx.require(Role::Admin)?;
        let draft = draft.validate()?;
        let event = Event {
            id: EventId::random(),
            name: draft.name,
            description: draft.description,
            start_date: draft.start_date,
            end_date: draft.end_date,
            is_active: draft.is_active,
            created_by: ctx.user_id(),
            created_at: self.clock.utc(),
        };
        self.events.insert(&event).await?;
        info!(event_id = %event.id, name = %event.name, "event created");
        invalidate(self.cache.as_ref(), &[STATS_PREFIX]).await;
        Ok(event)
    }

    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: EventId,
        draft: EventDraft,
    ) -> Result<Event, Error> {
        ctx.require(Role::Admin)?;
        let draft = draft.validate()?;
        let current = self.get(id).await?;
        let event = Event {
            name: draft.name,
            description: draft.description,
            start_date: draft.start_date,
            end_date: draft.end_date,
            is_active: draft.is_active,
            ..current
        };
        if !self.events.update(&event).await? {
            return Err(Error::not_found(format!("event {id} not found")));
        }
        invalidate(self.cache.as_ref(), &[STATS_PREFIX]).await;
        Ok(event)
    }

    pub async fn get(&self, id: EventId) -> Result<Event, Error> {
        self.events
            .find_by_id(&id)
            .await?
            .ok_or_else(|| Error::not_found(format!("event {id} not found")))
    }

    pub async fn list(&self) -> Result<Vec<Event>, Error> {
        Ok(self.events.list().await?)
    }

    /// The event running now, if any.
    pub async fn active(&self) -> Result<Option<Event>, Error> {
        Ok(self.events.find_active(self.clock.utc()).await?)
    }

    /// Delete an event that owns no tournaments. Admin only.
    pub async fn delete(&self, ctx: &RequestContext, id: EventId) -> Result<(), Error> {
        ctx.require(Role::Admin)?;
        match self.events.delete(&id).await? {
            DeleteOutcome::Deleted => {
                info!(event_id = %id, "event deleted");
                invalidate(self.cache.as_ref(), &[STATS_PREFIX]).await;
                Ok(())
            }
            DeleteOutcome::NotFound => Err(Error::not_found(format!("event {id} not found"))),
            DeleteOutcome::InUse => Err(RuleViolation::EventHasTournaments.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockEventRepository;
    use crate::outbound::cache::MemoryCache;
    use crate::test_support::{MutableClock, sample_event, sample_now};
    use chrono::TimeDelta;
    use rstest::{fixture, rstest};

    fn service(events: MockEventRepository) -> EventService {
        let clock: Arc<dyn Clock> = Arc::new(MutableClock::new(sample_now()));
        EventService::new(
            Arc::new(events),
            Arc::new(MemoryCache::new(clock.clone())),
            clock,
        )
    }

    #[fixture]
    fn admin() -> RequestContext {
        RequestContext::new(crate::domain::UserId::random(), Role::Admin)
    }

    fn draft() -> EventDraft {
        EventDraft {
            name: " Summer Cup ".to_owned(),
            description: "Finals weekend".to_owned(),
            start_date: sample_now(),
            end_date: sample_now() + TimeDelta::days(2),
            is_active: true,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn create_stores_trimmed_event(admin: RequestContext) {
        let mut events = MockEventRepository::new();
        events
            .expect_insert()
            .withf(|event| event.name == "Summer Cup")
            .times(1)
            .returning(|_| Ok(()));
        let event = service(events).create(&admin, draft()).await.expect("created");
        assert_eq!(event.created_by, admin.user_id());
        assert_eq!(event.created_at, sample_now());
    }

    #[rstest]
    #[tokio::test]
    async fn only_admins_create_events() {
        let assistant = RequestContext::new(crate::domain::UserId::random(), Role::Assistant);
        let err = service(MockEventRepository::new())
            .create(&assistant, draft())
            .await
            .expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn delete_with_tournaments_is_refused(admin: RequestContext) {
        let mut events = MockEventRepository::new();
        events
            .expect_delete()
            .returning(|_| Ok(DeleteOutcome::InUse));
        let err = service(events)
            .delete(&admin, EventId::random())
            .await
            .expect_err("in use");
        assert_eq!(err.details().expect("details")["rule"], "event_has_tournaments");
    }

    #[rstest]
    #[tokio::test]
    async fn update_keeps_identity(admin: RequestContext) {
        let current = sample_event();
        let id = current.id;
        let creator = current.created_by;
        let mut events = MockEventRepository::new();
        events
            .expect_find_by_id()
            .returning(move |_| Ok(Some(current.clone())));
        events.expect_update().times(1).returning(|_| Ok(true));
        let updated = service(events)
            .update(&admin, id, draft())
            .await
            .expect("updated");
        assert_eq!(updated.id, id);
        assert_eq!(updated.created_by, creator);
        assert_eq!(updated.description, "Finals weekend");
    }
}
