//! Port for claim persistence.
//!
//! Claim writes and their redemption ledger entry are one atomic unit. The
//! adapter re-reads the claimant's balance inside the write so concurrent
//! claims cannot overdraw it, and reports rule outcomes as values rather
//! than errors.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Claim, ClaimId, ClaimStatus, NewClaim, PointTransaction, StandId, UserId,
};

use super::RepositoryError;

/// Result of a claim write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimWriteOutcome {
    /// The claim was stored; `redemption` is set when points were deducted.
    Written {
        claim: Claim,
        redemption: Option<PointTransaction>,
    },
    /// The user already holds a claim on this product.
    Duplicate,
    /// The user's balance no longer covers the product.
    Insufficient { available: i64, required: i64 },
    /// The claim was completed earlier.
    AlreadyProcessed,
    /// The claim or claimant does not exist.
    NotFound,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClaimRepository: Send + Sync {
    /// Insert a claim. With `processed_by` set the claim is stored completed
    /// and a redemption entry deducting `points_required` is recorded.
    async fn create(&self, claim: &NewClaim) -> Result<ClaimWriteOutcome, RepositoryError>;

    /// Complete a pending claim and record its redemption.
    async fn complete(
        &self,
        id: &ClaimId,
        processed_by: &UserId,
        processed_at: DateTime<Utc>,
    ) -> Result<ClaimWriteOutcome, RepositoryError>;

    async fn find_by_id(&self, id: &ClaimId) -> Result<Option<Claim>, RepositoryError>;

    /// Claims of one user, newest first.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Claim>, RepositoryError>;

    /// Claims at one stand, newest first, optionally filtered by status.
    async fn list_for_stand(
        &self,
        stand_id: &StandId,
        status: Option<ClaimStatus>,
    ) -> Result<Vec<Claim>, RepositoryError>;
}
