//! Ports for stand and product persistence.

use async_trait::async_trait;

use crate::domain::{EventId, Product, ProductId, Stand, StandId};

use super::{DeleteOutcome, RepositoryError};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StandRepository: Send + Sync {
    async fn insert(&self, stand: &Stand) -> Result<(), RepositoryError>;

    async fn update(&self, stand: &Stand) -> Result<bool, RepositoryError>;

    async fn find_by_id(&self, id: &StandId) -> Result<Option<Stand>, RepositoryError>;

    /// Stands ordered by name, optionally restricted to one event.
    async fn list(&self, event_id: Option<EventId>) -> Result<Vec<Stand>, RepositoryError>;

    /// Delete with its products unless claims reference the stand.
    async fn delete(&self, id: &StandId) -> Result<DeleteOutcome, RepositoryError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn insert(&self, product: &Product) -> Result<(), RepositoryError>;

    async fn update(&self, product: &Product) -> Result<bool, RepositoryError>;

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Products of a stand ordered by name.
    async fn list_for_stand(
        &self,
        stand_id: &StandId,
        active_only: bool,
    ) -> Result<Vec<Product>, RepositoryError>;
}
