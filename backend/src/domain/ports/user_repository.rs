//! Port for account persistence.

use async_trait::async_trait;

use crate::domain::{NewUser, Role, User, UserId};

use super::RepositoryError;

/// Result of inserting an account; uniqueness is enforced by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserInsertOutcome {
    Inserted(User),
    NicknameTaken,
    EmailTaken,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account with zero points.
    async fn insert(&self, user: &NewUser) -> Result<UserInsertOutcome, RepositoryError>;

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError>;

    /// Look up by exact nickname or by (lower-cased) e-mail address.
    async fn find_by_login(&self, login: &str) -> Result<Option<User>, RepositoryError>;

    /// Every account, oldest first.
    async fn list(&self) -> Result<Vec<User>, RepositoryError>;

    /// Every account id; used for broadcasts.
    async fn list_ids(&self) -> Result<Vec<UserId>, RepositoryError>;

    /// Change the role, returning the updated account when it exists.
    async fn update_role(&self, id: &UserId, role: Role) -> Result<Option<User>, RepositoryError>;

    async fn update_profile_image(
        &self,
        id: &UserId,
        profile_image: Option<String>,
    ) -> Result<Option<User>, RepositoryError>;
}
