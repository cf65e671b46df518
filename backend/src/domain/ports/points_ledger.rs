//! Port for the append-only points ledger.

use async_trait::async_trait;

use crate::domain::{NewPointTransaction, PointTransaction, Standing, UserId};

use super::RepositoryError;

/// Result of recording ledger entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerWriteOutcome {
    Recorded(Vec<PointTransaction>),
    /// A target account disappeared; nothing was written.
    UnknownUser(UserId),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PointsLedger: Send + Sync {
    /// Append every entry and apply each to its user's `total_points` in
    /// one atomic unit. Either all entries are written or none.
    async fn record(
        &self,
        entries: &[NewPointTransaction],
    ) -> Result<LedgerWriteOutcome, RepositoryError>;

    /// Entries for one user, newest first.
    async fn history(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<PointTransaction>, RepositoryError>;

    /// One standing per user holding at least one entry.
    async fn standings(&self) -> Result<Vec<Standing>, RepositoryError>;
}
