//! PostgreSQL-backed `NotificationRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{NotificationRepository, RepositoryError};
use crate::domain::{Notification, NotificationId, UserId};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NotificationRow, convert_all};
use super::pool::DbPool;
use super::schema::notifications;

#[derive(Clone)]
pub struct DieselNotificationRepository {
    pool: DbPool,
}

impl DieselNotificationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for DieselNotificationRepository {
    async fn insert_many(&self, batch: &[Notification]) -> Result<(), RepositoryError> {
        if batch.is_empty() {
            return Ok(());
        }
        let rows: Vec<NotificationRow> = batch.iter().map(NotificationRow::from).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(notifications::table)
            .values(&rows)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn list(
        &self,
        user_id: &UserId,
        unread_only: bool,
        limit: usize,
    ) -> Result<Vec<Notification>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = notifications::table
            .filter(notifications::user_id.eq(*user_id.as_uuid()))
            .order((notifications::created_at.desc(), notifications::id.desc()))
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .select(NotificationRow::as_select())
            .into_boxed();
        if unread_only {
            query = query.filter(notifications::is_read.eq(false));
        }
        let rows = query.load(&mut conn).await.map_err(map_diesel_error)?;
        convert_all(rows)
    }

    async fn unread_count(&self, user_id: &UserId) -> Result<i64, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        notifications::table
            .filter(notifications::user_id.eq(user_id.as_uuid()))
            .filter(notifications::is_read.eq(false))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn mark_read(
        &self,
        user_id: &UserId,
        id: &NotificationId,
    ) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            notifications::table
                .filter(notifications::id.eq(id.as_uuid()))
                .filter(notifications::user_id.eq(user_id.as_uuid())),
        )
        .set(notifications::is_read.eq(true))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn mark_all_read(&self, user_id: &UserId) -> Result<u64, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            notifications::table
                .filter(notifications::user_id.eq(user_id.as_uuid()))
                .filter(notifications::is_read.eq(false)),
        )
        .set(notifications::is_read.eq(true))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(u64::try_from(updated).unwrap_or(u64::MAX))
    }
}
