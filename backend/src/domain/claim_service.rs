//! Claim redemption workflow.
//!
//! A claim moves `pending -> completed` exactly once. Completion deducts the
//! product's price through a negative redemption entry written in the same
//! transaction as the status change; the store re-reads the balance inside
//! that transaction so concurrent claims cannot overdraw it.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    ClaimRepository, ClaimWriteOutcome, KeyValueCache, LEADERBOARD_PREFIX, ProductRepository,
    Repositories, STATS_PREFIX, StandRepository, UserRepository, invalidate,
};
use crate::domain::{
    Claim, ClaimId, ClaimStatus, Error, NewClaim, NotificationKind, NotificationService,
    ProductId, RequestContext, Role, RuleViolation, Stand, StandId, UserId, ValidationErrors,
};

/// Input for [`ClaimService::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateClaim {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub stand_id: StandId,
    /// Set for direct redemption at the stand; must be the caller.
    pub processed_by: Option<UserId>,
}

#[derive(Clone)]
pub struct ClaimService {
    users: Arc<dyn UserRepository>,
    stands: Arc<dyn StandRepository>,
    products: Arc<dyn ProductRepository>,
    claims: Arc<dyn ClaimRepository>,
    notifications: NotificationService,
    cache: Arc<dyn KeyValueCache>,
    clock: Arc<dyn Clock>,
}

fn outcome_error(outcome: ClaimWriteOutcome) -> Error {
    match outcome {
        ClaimWriteOutcome::Duplicate => RuleViolation::DuplicateClaim.into(),
        ClaimWriteOutcome::Insufficient {
            available,
            required,
        } => RuleViolation::InsufficientPoints {
            available,
            required,
        }
        .into(),
        ClaimWriteOutcome::AlreadyProcessed => RuleViolation::ClaimAlreadyProcessed.into(),
        ClaimWriteOutcome::NotFound => Error::not_found("claim or claimant not found"),
        ClaimWriteOutcome::Written { .. } => Error::internal("unexpected claim outcome"),
    }
}

impl ClaimService {
    pub fn new(
        repos: &Repositories,
        notifications: NotificationService,
        cache: Arc<dyn KeyValueCache>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users: repos.users.clone(),
            stands: repos.stands.clone(),
            products: repos.products.clone(),
            claims: repos.claims.clone(),
            notifications,
            cache,
            clock,
        }
    }

    async fn stand(&self, stand_id: StandId) -> Result<Stand, Error> {
        self.stands
            .find_by_id(&stand_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("stand {stand_id} not found")))
    }

    async fn claim(&self, claim_id: ClaimId) -> Result<Claim, Error> {
        self.claims
            .find_by_id(&claim_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("claim {claim_id} not found")))
    }

    async fn after_write(&self, claim: &Claim, redeemed: bool) {
        if redeemed {
            invalidate(self.cache.as_ref(), &[LEADERBOARD_PREFIX, STATS_PREFIX]).await;
        } else {
            invalidate(self.cache.as_ref(), &[STATS_PREFIX]).await;
        }
        let (kind, title, message) = match claim.status {
            ClaimStatus::Pending => (
                NotificationKind::ClaimCreated,
                "Claim created",
                "Your claim is waiting to be processed at the stand.".to_owned(),
            ),
            ClaimStatus::Completed => (
                NotificationKind::ClaimCompleted,
                "Claim completed",
                format!("{} points were redeemed for your claim.", claim.points_spent),
            ),
        };
        self.notifications
            .notify_after_commit(claim.user_id, kind, title, &message)
            .await;
    }

    /// Create a claim. Users claim for themselves; a stand's manager (or an
    /// admin) may claim for anyone and may redeem directly by setting
    /// `processed_by` to themselves.
    pub async fn create(&self, ctx: &RequestContext, input: CreateClaim) -> Result<Claim, Error> {
        let stand = self.stand(input.stand_id).await?;
        let manages = stand.is_managed_by(ctx);
        if input.user_id != ctx.user_id() && !manages {
            return Err(Error::forbidden("cannot create claims for other users"));
        }
        if let Some(processor) = input.processed_by {
            if processor != ctx.user_id() {
                return Err(Error::forbidden("claims can only be processed by the caller"));
            }
            stand.require_manager(ctx)?;
        }

        let mut errors = ValidationErrors::new();
        let product = self.products.find_by_id(&input.product_id).await?;
        match &product {
            None => errors.push("productId", "product not found"),
            Some(product) => {
                errors.check(
                    product.stand_id == stand.id,
                    "productId",
                    "product does not belong to this stand",
                );
                errors.check(product.is_active, "productId", "product is not active");
            }
        }
        errors.into_result(())?;
        let Some(product) = product else {
            return Err(Error::not_found("product not found"));
        };
        if self.users.find_by_id(&input.user_id).await?.is_none() {
            return Err(Error::not_found(format!("user {} not found", input.user_id)));
        }

        let new_claim = NewClaim {
            id: ClaimId::random(),
            user_id: input.user_id,
            product_id: product.id,
            stand_id: stand.id,
            points_required: product.points_required,
            processed_by: input.processed_by,
            created_at: self.clock.utc(),
        };
        match self.claims.create(&new_claim).await? {
            ClaimWriteOutcome::Written { claim, redemption } => {
                info!(
                    claim_id = %claim.id,
                    user_id = %claim.user_id,
                    status = %claim.status,
                    "claim created"
                );
                self.after_write(&claim, redemption.is_some()).await;
                Ok(claim)
            }
            other => Err(outcome_error(other)),
        }
    }

    /// Complete a pending claim. Stand manager of the claim's stand or admin.
    pub async fn process(&self, ctx: &RequestContext, claim_id: ClaimId) -> Result<Claim, Error> {
        let claim = self.claim(claim_id).await?;
        self.stand(claim.stand_id).await?.require_manager(ctx)?;
        if !claim.is_pending() {
            return Err(RuleViolation::ClaimAlreadyProcessed.into());
        }
        match self
            .claims
            .complete(&claim_id, &ctx.user_id(), self.clock.utc())
            .await?
        {
            ClaimWriteOutcome::Written { claim, .. } => {
                info!(
                    claim_id = %claim.id,
                    user_id = %claim.user_id,
                    points = claim.points_spent,
                    processed_by = %ctx.user_id(),
                    "claim completed"
                );
                self.after_write(&claim, true).await;
                Ok(claim)
            }
            other => Err(outcome_error(other)),
        }
    }

    /// A single claim, visible to its owner, the stand manager and admins.
    pub async fn get(&self, ctx: &RequestContext, claim_id: ClaimId) -> Result<Claim, Error> {
        let claim = self.claim(claim_id).await?;
        if claim.user_id != ctx.user_id() {
            self.stand(claim.stand_id).await?.require_manager(ctx)?;
        }
        Ok(claim)
    }

    /// A user's claims; their own, or anyone's for assistants and above.
    pub async fn list_for_user(
        &self,
        ctx: &RequestContext,
        user_id: UserId,
    ) -> Result<Vec<Claim>, Error> {
        ctx.require_self_or(user_id, Role::Assistant)?;
        Ok(self.claims.list_for_user(&user_id).await?)
    }

    /// Claims at a stand, for its manager or an admin.
    pub async fn list_for_stand(
        &self,
        ctx: &RequestContext,
        stand_id: StandId,
        status: Option<ClaimStatus>,
    ) -> Result<Vec<Claim>, Error> {
        self.stand(stand_id).await?.require_manager(ctx)?;
        Ok(self.claims.list_for_stand(&stand_id, status).await?)
    }
}

#[cfg(test)]
#[path = "claim_service_tests.rs"]
mod tests;
