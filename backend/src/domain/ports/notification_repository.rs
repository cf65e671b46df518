//! Port for notification persistence.

use async_trait::async_trait;

use crate::domain::{Notification, NotificationId, UserId};

use super::RepositoryError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn insert_many(&self, notifications: &[Notification]) -> Result<(), RepositoryError>;

    /// Newest first.
    async fn list(
        &self,
        user_id: &UserId,
        unread_only: bool,
        limit: usize,
    ) -> Result<Vec<Notification>, RepositoryError>;

    async fn unread_count(&self, user_id: &UserId) -> Result<i64, RepositoryError>;

    /// Mark one of the user's notifications read; `false` when the user
    /// owns no notification with that id.
    async fn mark_read(
        &self,
        user_id: &UserId,
        id: &NotificationId,
    ) -> Result<bool, RepositoryError>;

    /// Mark all of the user's notifications read, returning how many changed.
    async fn mark_all_read(&self, user_id: &UserId) -> Result<u64, RepositoryError>;
}
