//! PostgreSQL-backed `TournamentRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{DeleteOutcome, RepositoryError, TournamentRepository};
use crate::domain::{EventId, Tournament, TournamentId};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{TournamentRow, convert_all};
use super::pool::DbPool;
use super::schema::{point_transactions, tournaments};

#[derive(Clone)]
pub struct DieselTournamentRepository {
    pool: DbPool,
}

impl DieselTournamentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TournamentRepository for DieselTournamentRepository {
    async fn insert(&self, tournament: &Tournament) -> Result<(), RepositoryError> {
        let row = TournamentRow::try_from(tournament)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(tournaments::table)
            .values(row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn update(&self, tournament: &Tournament) -> Result<bool, RepositoryError> {
        let row = TournamentRow::try_from(tournament)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(tournaments::table.find(tournament.id.as_uuid()))
            .set(row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn find_by_id(&self, id: &TournamentId) -> Result<Option<Tournament>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        tournaments::table
            .find(id.as_uuid())
            .select(TournamentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(Tournament::try_from)
            .transpose()
    }

    async fn list_for_event(&self, event_id: &EventId) -> Result<Vec<Tournament>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = tournaments::table
            .filter(tournaments::event_id.eq(event_id.as_uuid()))
            .order((tournaments::scheduled_time.asc(), tournaments::id.asc()))
            .select(TournamentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        convert_all(rows)
    }

    async fn delete(&self, id: &TournamentId) -> Result<DeleteOutcome, RepositoryError> {
        let id = *id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| {
            async move {
                let exists: bool =
                    diesel::select(diesel::dsl::exists(tournaments::table.find(id)))
                        .get_result(conn)
                        .await?;
                if !exists {
                    return Ok(DeleteOutcome::NotFound);
                }
                let referenced: bool = diesel::select(diesel::dsl::exists(
                    point_transactions::table.filter(point_transactions::tournament_id.eq(id)),
                ))
                .get_result(conn)
                .await?;
                if referenced {
                    return Ok(DeleteOutcome::InUse);
                }
                diesel::delete(tournaments::table.find(id))
                    .execute(conn)
                    .await?;
                Ok(DeleteOutcome::Deleted)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}
