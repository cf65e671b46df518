//! PostgreSQL-backed `PointsLedger`.
//!
//! Ledger rows and the `users.total_points` counters they feed are written
//! in one transaction, with the affected user rows locked first.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{LedgerWriteOutcome, PointsLedger, RepositoryError};
use crate::domain::{
    Nickname, NewPointTransaction, PointTransaction, Standing, UserId,
};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{TransactionRow, convert_all};
use super::pool::DbPool;
use super::schema::{point_transactions, users};

#[derive(Clone)]
pub struct DieselPointsLedger {
    pool: DbPool,
}

impl DieselPointsLedger {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

type StandingRow = (Uuid, String, Option<String>, i64, Option<DateTime<Utc>>);

fn standing_from_row(row: StandingRow) -> Result<Option<Standing>, RepositoryError> {
    let (id, nickname, profile_image, total_points, first) = row;
    let Some(first_transaction_at) = first else {
        return Ok(None);
    };
    Ok(Some(Standing {
        user_id: UserId::from_uuid(id),
        nickname: Nickname::new(nickname)
            .map_err(|err| RepositoryError::query(format!("invalid nickname: {err}")))?,
        profile_image,
        total_points,
        first_transaction_at,
    }))
}

#[async_trait]
impl PointsLedger for DieselPointsLedger {
    async fn record(
        &self,
        entries: &[NewPointTransaction],
    ) -> Result<LedgerWriteOutcome, RepositoryError> {
        let stored: Vec<PointTransaction> = entries
            .iter()
            .cloned()
            .map(NewPointTransaction::into_stored)
            .collect();
        let rows: Vec<TransactionRow> = stored.iter().map(TransactionRow::from).collect();
        let wanted: BTreeSet<Uuid> = rows.iter().map(|row| row.user_id).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| {
            async move {
                let ids: Vec<Uuid> = wanted.iter().copied().collect();
                let found: BTreeSet<Uuid> = users::table
                    .filter(users::id.eq_any(&ids))
                    .select(users::id)
                    .for_update()
                    .load::<Uuid>(conn)
                    .await?
                    .into_iter()
                    .collect();
                if let Some(missing) = wanted.difference(&found).next() {
                    return Ok(LedgerWriteOutcome::UnknownUser(UserId::from_uuid(*missing)));
                }
                diesel::insert_into(point_transactions::table)
                    .values(&rows)
                    .execute(conn)
                    .await?;
                for row in &rows {
                    diesel::update(users::table.find(row.user_id))
                        .set(users::total_points.eq(users::total_points + row.points))
                        .execute(conn)
                        .await?;
                }
                Ok(LedgerWriteOutcome::Recorded(stored))
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn history(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<PointTransaction>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = point_transactions::table
            .filter(point_transactions::user_id.eq(user_id.as_uuid()))
            .order((
                point_transactions::created_at.desc(),
                point_transactions::id.desc(),
            ))
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .select(TransactionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        convert_all(rows)
    }

    async fn standings(&self) -> Result<Vec<Standing>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<StandingRow> = users::table
            .inner_join(point_transactions::table)
            .group_by(users::id)
            .select((
                users::id,
                users::nickname,
                users::profile_image,
                users::total_points,
                diesel::dsl::min(point_transactions::created_at),
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let mut standings = Vec::with_capacity(rows.len());
        for row in rows {
            if let Some(standing) = standing_from_row(row)? {
                standings.push(standing);
            }
        }
        Ok(standings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn rows_without_entries_are_skipped() {
        let row: StandingRow = (Uuid::new_v4(), "ada".to_owned(), None, 0, None);
        assert_eq!(standing_from_row(row).expect("valid"), None);
    }

    #[rstest]
    fn rows_with_entries_become_standings() {
        let first = Utc::now();
        let row: StandingRow = (Uuid::new_v4(), "ada".to_owned(), None, 42, Some(first));
        let standing = standing_from_row(row).expect("valid").expect("standing");
        assert_eq!(standing.total_points, 42);
        assert_eq!(standing.first_transaction_at, first);
    }
}
