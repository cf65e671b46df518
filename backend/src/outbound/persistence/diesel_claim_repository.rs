//! PostgreSQL-backed `ClaimRepository`.
//!
//! Every write locks the claimant's row with `SELECT ... FOR UPDATE` before
//! reading the balance, so two concurrent redemptions for one user
//! serialise and the second sees the first one's deduction. The
//! `(user_id, product_id)` unique constraint backs up the duplicate check
//! when two creates race past it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{ClaimRepository, ClaimWriteOutcome, RepositoryError};
use crate::domain::{
    Claim, ClaimId, ClaimStatus, NewClaim, PointSource, PointTransaction, StandId,
    TransactionId, UserId,
};

use super::error_mapping::{map_diesel_error, map_pool_error, unique_violation};
use super::models::{ClaimRow, TransactionRow, convert_all};
use super::pool::DbPool;
use super::schema::{claims, point_transactions, users};

const USER_PRODUCT_KEY: &str = "claims_user_product_key";

/// Failure inside a claim transaction: either a database error, or a row
/// that could not be decoded.
enum TxError {
    Diesel(DieselError),
    Decode(RepositoryError),
}

impl From<DieselError> for TxError {
    fn from(value: DieselError) -> Self {
        Self::Diesel(value)
    }
}

impl TxError {
    fn into_outcome(self) -> Result<ClaimWriteOutcome, RepositoryError> {
        match self {
            Self::Diesel(err) if unique_violation(&err) == Some(USER_PRODUCT_KEY) => {
                Ok(ClaimWriteOutcome::Duplicate)
            }
            Self::Diesel(err) => Err(map_diesel_error(err)),
            Self::Decode(err) => Err(err),
        }
    }
}

#[derive(Clone)]
pub struct DieselClaimRepository {
    pool: DbPool,
}

impl DieselClaimRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Lock the claimant and return their balance.
async fn lock_balance(
    conn: &mut AsyncPgConnection,
    user_id: Uuid,
) -> Result<Option<i64>, DieselError> {
    users::table
        .find(user_id)
        .select(users::total_points)
        .for_update()
        .first(conn)
        .await
        .optional()
}

/// With the claimant locked, check the balance and store `claim` completed
/// together with its negative redemption entry.
async fn redeem(
    conn: &mut AsyncPgConnection,
    mut claim: Claim,
    available: i64,
    processed_by: UserId,
    processed_at: DateTime<Utc>,
    insert: bool,
) -> Result<ClaimWriteOutcome, TxError> {
    if available < claim.points_spent {
        return Ok(ClaimWriteOutcome::Insufficient {
            available,
            required: claim.points_spent,
        });
    }
    claim.status = ClaimStatus::Completed;
    claim.processed_at = Some(processed_at);
    claim.processed_by = Some(processed_by);
    if insert {
        diesel::insert_into(claims::table)
            .values(ClaimRow::from(&claim))
            .execute(conn)
            .await?;
    } else {
        diesel::update(claims::table.find(claim.id.as_uuid()))
            .set((
                claims::status.eq(ClaimStatus::Completed.as_str()),
                claims::processed_at.eq(processed_at),
                claims::processed_by.eq(processed_by.as_uuid()),
            ))
            .execute(conn)
            .await?;
    }
    let redemption = PointTransaction {
        id: TransactionId::random(),
        user_id: claim.user_id,
        points: -claim.points_spent,
        source: PointSource::Redemption,
        tournament_id: None,
        claim_id: Some(claim.id),
        notes: None,
        created_at: processed_at,
        created_by: processed_by,
    };
    diesel::insert_into(point_transactions::table)
        .values(TransactionRow::from(&redemption))
        .execute(conn)
        .await?;
    diesel::update(users::table.find(claim.user_id.as_uuid()))
        .set(users::total_points.eq(users::total_points - claim.points_spent))
        .execute(conn)
        .await?;
    Ok(ClaimWriteOutcome::Written {
        claim,
        redemption: Some(redemption),
    })
}

#[async_trait]
impl ClaimRepository for DieselClaimRepository {
    async fn create(&self, new_claim: &NewClaim) -> Result<ClaimWriteOutcome, RepositoryError> {
        let new_claim = new_claim.clone();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let result = conn
            .transaction::<_, TxError, _>(|conn| {
                async move {
                    let user = *new_claim.user_id.as_uuid();
                    let Some(available) = lock_balance(conn, user).await? else {
                        return Ok(ClaimWriteOutcome::NotFound);
                    };
                    let duplicate: bool = diesel::select(diesel::dsl::exists(
                        claims::table
                            .filter(claims::user_id.eq(user))
                            .filter(claims::product_id.eq(new_claim.product_id.as_uuid())),
                    ))
                    .get_result(conn)
                    .await?;
                    if duplicate {
                        return Ok(ClaimWriteOutcome::Duplicate);
                    }
                    if available < new_claim.points_required {
                        return Ok(ClaimWriteOutcome::Insufficient {
                            available,
                            required: new_claim.points_required,
                        });
                    }
                    let claim = Claim {
                        id: new_claim.id,
                        user_id: new_claim.user_id,
                        product_id: new_claim.product_id,
                        stand_id: new_claim.stand_id,
                        status: ClaimStatus::Pending,
                        points_spent: new_claim.points_required,
                        created_at: new_claim.created_at,
                        processed_at: None,
                        processed_by: None,
                    };
                    if let Some(processor) = new_claim.processed_by {
                        return redeem(conn, claim, available, processor, new_claim.created_at, true)
                            .await;
                    }
                    diesel::insert_into(claims::table)
                        .values(ClaimRow::from(&claim))
                        .execute(conn)
                        .await?;
                    Ok(ClaimWriteOutcome::Written {
                        claim,
                        redemption: None,
                    })
                }
                .scope_boxed()
            })
            .await;
        result.or_else(TxError::into_outcome)
    }

    async fn complete(
        &self,
        id: &ClaimId,
        processed_by: &UserId,
        processed_at: DateTime<Utc>,
    ) -> Result<ClaimWriteOutcome, RepositoryError> {
        let id = *id.as_uuid();
        let processed_by = *processed_by;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let result = conn
            .transaction::<_, TxError, _>(|conn| {
                async move {
                    let row = claims::table
                        .find(id)
                        .select(ClaimRow::as_select())
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?;
                    let Some(row) = row else {
                        return Ok(ClaimWriteOutcome::NotFound);
                    };
                    let claim = Claim::try_from(row).map_err(TxError::Decode)?;
                    if !claim.is_pending() {
                        return Ok(ClaimWriteOutcome::AlreadyProcessed);
                    }
                    let Some(available) = lock_balance(conn, *claim.user_id.as_uuid()).await?
                    else {
                        return Ok(ClaimWriteOutcome::NotFound);
                    };
                    redeem(conn, claim, available, processed_by, processed_at, false).await
                }
                .scope_boxed()
            })
            .await;
        result.or_else(TxError::into_outcome)
    }

    async fn find_by_id(&self, id: &ClaimId) -> Result<Option<Claim>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        claims::table
            .find(id.as_uuid())
            .select(ClaimRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(Claim::try_from)
            .transpose()
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Claim>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = claims::table
            .filter(claims::user_id.eq(user_id.as_uuid()))
            .order((claims::created_at.desc(), claims::id.desc()))
            .select(ClaimRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        convert_all(rows)
    }

    async fn list_for_stand(
        &self,
        stand_id: &StandId,
        status: Option<ClaimStatus>,
    ) -> Result<Vec<Claim>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = claims::table
            .filter(claims::stand_id.eq(*stand_id.as_uuid()))
            .order((claims::created_at.desc(), claims::id.desc()))
            .select(ClaimRow::as_select())
            .into_boxed();
        if let Some(status) = status {
            query = query.filter(claims::status.eq(status.as_str()));
        }
        let rows = query.load(&mut conn).await.map_err(map_diesel_error)?;
        convert_all(rows)
    }
}
