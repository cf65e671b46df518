//! PostgreSQL-backed `UserRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{RepositoryError, UserInsertOutcome, UserRepository};
use crate::domain::{NewUser, Role, User, UserId};

use super::error_mapping::{map_diesel_error, map_pool_error, unique_violation};
use super::models::{NewUserRow, UserRow, convert_all};
use super::pool::DbPool;
use super::schema::users;

#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &NewUser) -> Result<UserInsertOutcome, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let result = diesel::insert_into(users::table)
            .values(NewUserRow::from(user))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await;
        match result {
            Ok(row) => Ok(UserInsertOutcome::Inserted(row.try_into()?)),
            Err(err) => match unique_violation(&err) {
                Some("users_nickname_key") => Ok(UserInsertOutcome::NicknameTaken),
                Some("users_email_key") => Ok(UserInsertOutcome::EmailTaken),
                _ => Err(map_diesel_error(err)),
            },
        }
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(User::try_from)
            .transpose()
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<User>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        users::table
            .filter(users::nickname.eq(login).or(users::email.eq(login)))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(User::try_from)
            .transpose()
    }

    async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = users::table
            .select(UserRow::as_select())
            .order((users::created_at.asc(), users::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        convert_all(rows)
    }

    async fn list_ids(&self) -> Result<Vec<UserId>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let ids: Vec<uuid::Uuid> = users::table
            .select(users::id)
            .order(users::id.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(ids.into_iter().map(UserId::from_uuid).collect())
    }

    async fn update_role(&self, id: &UserId, role: Role) -> Result<Option<User>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(users::table.find(id.as_uuid()))
            .set(users::role.eq(role.as_str()))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(User::try_from)
            .transpose()
    }

    async fn update_profile_image(
        &self,
        id: &UserId,
        profile_image: Option<String>,
    ) -> Result<Option<User>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(users::table.find(id.as_uuid()))
            .set(users::profile_image.eq(profile_image))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(User::try_from)
            .transpose()
    }
}
