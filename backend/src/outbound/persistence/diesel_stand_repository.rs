//! PostgreSQL-backed `StandRepository` and `ProductRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{DeleteOutcome, ProductRepository, RepositoryError, StandRepository};
use crate::domain::{EventId, Product, ProductId, Stand, StandId};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{ProductRow, StandRow};
use super::pool::DbPool;
use super::schema::{claims, products, stands};

#[derive(Clone)]
pub struct DieselStandRepository {
    pool: DbPool,
}

impl DieselStandRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StandRepository for DieselStandRepository {
    async fn insert(&self, stand: &Stand) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(stands::table)
            .values(StandRow::from(stand))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn update(&self, stand: &Stand) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(stands::table.find(stand.id.as_uuid()))
            .set(StandRow::from(stand))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn find_by_id(&self, id: &StandId) -> Result<Option<Stand>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = stands::table
            .find(id.as_uuid())
            .select(StandRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Stand::from))
    }

    async fn list(&self, event_id: Option<EventId>) -> Result<Vec<Stand>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = stands::table
            .select(StandRow::as_select())
            .order((stands::name.asc(), stands::id.asc()))
            .into_boxed();
        if let Some(event_id) = event_id {
            query = query.filter(stands::event_id.eq(*event_id.as_uuid()));
        }
        let rows = query.load(&mut conn).await.map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Stand::from).collect())
    }

    async fn delete(&self, id: &StandId) -> Result<DeleteOutcome, RepositoryError> {
        let id = *id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| {
            async move {
                let exists: bool = diesel::select(diesel::dsl::exists(stands::table.find(id)))
                    .get_result(conn)
                    .await?;
                if !exists {
                    return Ok(DeleteOutcome::NotFound);
                }
                let has_claims: bool = diesel::select(diesel::dsl::exists(
                    claims::table.filter(claims::stand_id.eq(id)),
                ))
                .get_result(conn)
                .await?;
                if has_claims {
                    return Ok(DeleteOutcome::InUse);
                }
                diesel::delete(products::table.filter(products::stand_id.eq(id)))
                    .execute(conn)
                    .await?;
                diesel::delete(stands::table.find(id)).execute(conn).await?;
                Ok(DeleteOutcome::Deleted)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}

#[derive(Clone)]
pub struct DieselProductRepository {
    pool: DbPool,
}

impl DieselProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for DieselProductRepository {
    async fn insert(&self, product: &Product) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(products::table)
            .values(ProductRow::from(product))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn update(&self, product: &Product) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(products::table.find(product.id.as_uuid()))
            .set(ProductRow::from(product))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = products::table
            .find(id.as_uuid())
            .select(ProductRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Product::from))
    }

    async fn list_for_stand(
        &self,
        stand_id: &StandId,
        active_only: bool,
    ) -> Result<Vec<Product>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = products::table
            .filter(products::stand_id.eq(*stand_id.as_uuid()))
            .select(ProductRow::as_select())
            .order((products::name.asc(), products::id.asc()))
            .into_boxed();
        if active_only {
            query = query.filter(products::is_active.eq(true));
        }
        let rows = query.load(&mut conn).await.map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Product::from).collect())
    }
}
