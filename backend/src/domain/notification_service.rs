//! Notification service: per-user inbox plus admin broadcasts.

use std::sync::Arc;

use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{NotificationRepository, UserRepository};
use crate::domain::{
    Error, Notification, NotificationContent, NotificationId, NotificationKind, RequestContext,
    Role, UserId,
};

/// Default page size for inbox listings.
pub const DEFAULT_LIST_LIMIT: usize = 50;
/// Largest inbox page.
pub const MAX_LIST_LIMIT: usize = 200;

#[derive(Clone)]
pub struct NotificationService {
    notifications: Arc<dyn NotificationRepository>,
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl NotificationService {
    pub fn new(
        notifications: Arc<dyn NotificationRepository>,
        users: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            notifications,
            users,
            clock,
        }
    }

    /// Store a notification for one user.
    pub async fn notify(
        &self,
        user_id: UserId,
        kind: NotificationKind,
        title: &str,
        message: &str,
    ) -> Result<Notification, Error> {
        let content = NotificationContent::new(kind, title, message)?;
        let notification = content.for_user(user_id, self.clock.utc());
        self.notifications
            .insert_many(std::slice::from_ref(&notification))
            .await?;
        Ok(notification)
    }

    /// Side-effect notification sent after a committed write. Failure is
    /// logged and never undoes the write.
    pub(crate) async fn notify_after_commit(
        &self,
        user_id: UserId,
        kind: NotificationKind,
        title: &str,
        message: &str,
    ) {
        if let Err(error) = self.notify(user_id, kind, title, message).await {
            warn!(%user_id, %kind, %error, "notification could not be stored");
        }
    }

    /// The caller's notifications, newest first.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        unread_only: bool,
        limit: Option<usize>,
    ) -> Result<Vec<Notification>, Error> {
        let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);
        Ok(self
            .notifications
            .list(&ctx.user_id(), unread_only, limit)
            .await?)
    }

    pub async fn unread_count(&self, ctx: &RequestContext) -> Result<i64, Error> {
        Ok(self.notifications.unread_count(&ctx.user_id()).await?)
    }

    /// Mark one of the caller's notifications read. Other users'
    /// notifications are reported as missing.
    pub async fn mark_read(&self, ctx: &RequestContext, id: NotificationId) -> Result<(), Error> {
        if self.notifications.mark_read(&ctx.user_id(), &id).await? {
            Ok(())
        } else {
            Err(Error::not_found(format!("notification {id} not found")))
        }
    }

    pub async fn mark_all_read(&self, ctx: &RequestContext) -> Result<u64, Error> {
        Ok(self.notifications.mark_all_read(&ctx.user_id()).await?)
    }

    /// Send the same notification to every account. Admin only.
    pub async fn broadcast(
        &self,
        ctx: &RequestContext,
        kind: NotificationKind,
        title: &str,
        message: &str,
    ) -> Result<usize, Error> {
        ctx.require(Role::Admin)?;
        let content = NotificationContent::new(kind, title, message)?;
        let now = self.clock.utc();
        let batch: Vec<Notification> = self
            .users
            .list_ids()
            .await?
            .into_iter()
            .map(|user_id| content.for_user(user_id, now))
            .collect();
        self.notifications.insert_many(&batch).await?;
        info!(recipients = batch.len(), %kind, "broadcast notification stored");
        Ok(batch.len())
    }
}

#[cfg(test)]
#[path = "notification_service_tests.rs"]
mod tests;
