//! PostgreSQL-backed `EventRepository`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{DeleteOutcome, EventRepository, RepositoryError};
use crate::domain::{Event, EventId};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::EventRow;
use super::pool::DbPool;
use super::schema::{events, stands, tournaments};

#[derive(Clone)]
pub struct DieselEventRepository {
    pool: DbPool,
}

impl DieselEventRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for DieselEventRepository {
    async fn insert(&self, event: &Event) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(events::table)
            .values(EventRow::from(event))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn update(&self, event: &Event) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(events::table.find(event.id.as_uuid()))
            .set(EventRow::from(event))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn find_by_id(&self, id: &EventId) -> Result<Option<Event>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = events::table
            .find(id.as_uuid())
            .select(EventRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Event::from))
    }

    async fn list(&self) -> Result<Vec<Event>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = events::table
            .select(EventRow::as_select())
            .order((events::start_date.asc(), events::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Event::from).collect())
    }

    async fn find_active(&self, now: DateTime<Utc>) -> Result<Option<Event>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = events::table
            .filter(events::is_active.eq(true))
            .filter(events::start_date.le(now))
            .filter(events::end_date.ge(now))
            .order((events::start_date.desc(), events::id.desc()))
            .select(EventRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Event::from))
    }

    async fn delete(&self, id: &EventId) -> Result<DeleteOutcome, RepositoryError> {
        let id = *id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| {
            async move {
                let exists: bool = diesel::select(diesel::dsl::exists(events::table.find(id)))
                    .get_result(conn)
                    .await?;
                if !exists {
                    return Ok(DeleteOutcome::NotFound);
                }
                let has_tournaments: bool = diesel::select(diesel::dsl::exists(
                    tournaments::table.filter(tournaments::event_id.eq(id)),
                ))
                .get_result(conn)
                .await?;
                let has_stands: bool = diesel::select(diesel::dsl::exists(
                    stands::table.filter(stands::event_id.eq(id)),
                ))
                .get_result(conn)
                .await?;
                if has_tournaments || has_stands {
                    return Ok(DeleteOutcome::InUse);
                }
                diesel::delete(events::table.find(id)).execute(conn).await?;
                Ok(DeleteOutcome::Deleted)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}
