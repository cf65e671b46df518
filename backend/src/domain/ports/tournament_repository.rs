//! Port for tournament persistence.

use async_trait::async_trait;

use crate::domain::{EventId, Tournament, TournamentId};

use super::{DeleteOutcome, RepositoryError};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TournamentRepository: Send + Sync {
    async fn insert(&self, tournament: &Tournament) -> Result<(), RepositoryError>;

    /// Replace a stored tournament; `false` when it does not exist.
    async fn update(&self, tournament: &Tournament) -> Result<bool, RepositoryError>;

    async fn find_by_id(&self, id: &TournamentId) -> Result<Option<Tournament>, RepositoryError>;

    /// Tournaments of one event ordered by scheduled time.
    async fn list_for_event(&self, event_id: &EventId) -> Result<Vec<Tournament>, RepositoryError>;

    /// Delete unless ledger entries reference the tournament.
    async fn delete(&self, id: &TournamentId) -> Result<DeleteOutcome, RepositoryError>;
}
