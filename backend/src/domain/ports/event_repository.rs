//! Port for event persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Event, EventId};

use super::{DeleteOutcome, RepositoryError};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn insert(&self, event: &Event) -> Result<(), RepositoryError>;

    /// Replace a stored event; `false` when it does not exist.
    async fn update(&self, event: &Event) -> Result<bool, RepositoryError>;

    async fn find_by_id(&self, id: &EventId) -> Result<Option<Event>, RepositoryError>;

    /// Every event ordered by start date.
    async fn list(&self) -> Result<Vec<Event>, RepositoryError>;

    /// The event active at `now`. When windows overlap the most recently
    /// started one wins.
    async fn find_active(&self, now: DateTime<Utc>) -> Result<Option<Event>, RepositoryError>;

    /// Delete unless tournaments still reference the event.
    async fn delete(&self, id: &EventId) -> Result<DeleteOutcome, RepositoryError>;
}
