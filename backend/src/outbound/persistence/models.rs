//! Internal Diesel row structs and their domain conversions.
//!
//! These types never leave the persistence layer. Rows are converted into
//! domain values on read; string-typed enum columns that fail to parse are
//! reported as query errors.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{
    claims, events, notifications, point_transactions, products, stands, tournaments, users,
};
use crate::domain::ports::RepositoryError;
use crate::domain::{
    Claim, ClaimStatus, Email, Event, NewUser, Nickname, Notification, NotificationKind,
    PointSource, PointTransaction, Product, Role, Stand, Tournament, TournamentStatus, User,
};

fn parse_column<T>(column: &str, raw: &str) -> Result<T, RepositoryError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    T::from_str(raw).map_err(|err| RepositoryError::query(format!("invalid {column}: {err}")))
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub nickname: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub total_points: i64,
    pub profile_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            nickname: Nickname::new(row.nickname)
                .map_err(|err| RepositoryError::query(format!("invalid nickname: {err}")))?,
            email: Email::new(row.email)
                .map_err(|err| RepositoryError::query(format!("invalid email: {err}")))?,
            password_hash: row.password_hash,
            role: parse_column::<Role>("role", &row.role)?,
            total_points: row.total_points,
            profile_image: row.profile_image,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub nickname: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
    pub total_points: i64,
    pub created_at: DateTime<Utc>,
}

impl<'a> From<&'a NewUser> for NewUserRow<'a> {
    fn from(user: &'a NewUser) -> Self {
        Self {
            id: *user.id.as_uuid(),
            nickname: user.nickname.as_str(),
            email: user.email.as_str(),
            password_hash: &user.password_hash,
            role: user.role.as_str(),
            total_points: 0,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct EventRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Self {
            id: row.id.into(),
            name: row.name,
            description: row.description,
            start_date: row.start_date,
            end_date: row.end_date,
            is_active: row.is_active,
            created_by: row.created_by.into(),
            created_at: row.created_at,
        }
    }
}

impl From<&Event> for EventRow {
    fn from(event: &Event) -> Self {
        Self {
            id: *event.id.as_uuid(),
            name: event.name.clone(),
            description: event.description.clone(),
            start_date: event.start_date,
            end_date: event.end_date,
            is_active: event.is_active,
            created_by: *event.created_by.as_uuid(),
            created_at: event.created_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = tournaments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TournamentRow {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub scheduled_time: DateTime<Utc>,
    pub points_reward: i64,
    pub specifications: serde_json::Value,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<TournamentRow> for Tournament {
    type Error = RepositoryError;

    fn try_from(row: TournamentRow) -> Result<Self, Self::Error> {
        let specifications: BTreeMap<String, String> = serde_json::from_value(row.specifications)
            .map_err(|err| RepositoryError::query(format!("invalid specifications: {err}")))?;
        Ok(Self {
            id: row.id.into(),
            event_id: row.event_id.into(),
            name: row.name,
            scheduled_time: row.scheduled_time,
            points_reward: row.points_reward,
            specifications,
            status: parse_column::<TournamentStatus>("tournament status", &row.status)?,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<&Tournament> for TournamentRow {
    type Error = RepositoryError;

    fn try_from(tournament: &Tournament) -> Result<Self, Self::Error> {
        Ok(Self {
            id: *tournament.id.as_uuid(),
            event_id: *tournament.event_id.as_uuid(),
            name: tournament.name.clone(),
            scheduled_time: tournament.scheduled_time,
            points_reward: tournament.points_reward,
            specifications: serde_json::to_value(&tournament.specifications).map_err(|err| {
                RepositoryError::query(format!("serialise specifications: {err}"))
            })?,
            status: tournament.status.as_str().to_owned(),
            created_at: tournament.created_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = stands)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct StandRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub manager_id: Uuid,
    pub event_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<StandRow> for Stand {
    fn from(row: StandRow) -> Self {
        Self {
            id: row.id.into(),
            name: row.name,
            description: row.description,
            manager_id: row.manager_id.into(),
            event_id: row.event_id.into(),
            created_at: row.created_at,
        }
    }
}

impl From<&Stand> for StandRow {
    fn from(stand: &Stand) -> Self {
        Self {
            id: *stand.id.as_uuid(),
            name: stand.name.clone(),
            description: stand.description.clone(),
            manager_id: *stand.manager_id.as_uuid(),
            event_id: *stand.event_id.as_uuid(),
            created_at: stand.created_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ProductRow {
    pub id: Uuid,
    pub stand_id: Uuid,
    pub name: String,
    pub description: String,
    pub points_required: i64,
    pub is_active: bool,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id.into(),
            stand_id: row.stand_id.into(),
            name: row.name,
            description: row.description,
            points_required: row.points_required,
            is_active: row.is_active,
            image_url: row.image_url,
            created_at: row.created_at,
        }
    }
}

impl From<&Product> for ProductRow {
    fn from(product: &Product) -> Self {
        Self {
            id: *product.id.as_uuid(),
            stand_id: *product.stand_id.as_uuid(),
            name: product.name.clone(),
            description: product.description.clone(),
            points_required: product.points_required,
            is_active: product.is_active,
            image_url: product.image_url.clone(),
            created_at: product.created_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = claims)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ClaimRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub stand_id: Uuid,
    pub status: String,
    pub points_spent: i64,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub processed_by: Option<Uuid>,
}

impl TryFrom<ClaimRow> for Claim {
    type Error = RepositoryError;

    fn try_from(row: ClaimRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            user_id: row.user_id.into(),
            product_id: row.product_id.into(),
            stand_id: row.stand_id.into(),
            status: parse_column::<ClaimStatus>("claim status", &row.status)?,
            points_spent: row.points_spent,
            created_at: row.created_at,
            processed_at: row.processed_at,
            processed_by: row.processed_by.map(Into::into),
        })
    }
}

impl From<&Claim> for ClaimRow {
    fn from(claim: &Claim) -> Self {
        Self {
            id: *claim.id.as_uuid(),
            user_id: *claim.user_id.as_uuid(),
            product_id: *claim.product_id.as_uuid(),
            stand_id: *claim.stand_id.as_uuid(),
            status: claim.status.as_str().to_owned(),
            points_spent: claim.points_spent,
            created_at: claim.created_at,
            processed_at: claim.processed_at,
            processed_by: claim.processed_by.map(|id| *id.as_uuid()),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = point_transactions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TransactionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub points: i64,
    pub source: String,
    pub tournament_id: Option<Uuid>,
    pub claim_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: Uuid,
}

impl TryFrom<TransactionRow> for PointTransaction {
    type Error = RepositoryError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            user_id: row.user_id.into(),
            points: row.points,
            source: parse_column::<PointSource>("point source", &row.source)?,
            tournament_id: row.tournament_id.map(Into::into),
            claim_id: row.claim_id.map(Into::into),
            notes: row.notes,
            created_at: row.created_at,
            created_by: row.created_by.into(),
        })
    }
}

impl From<&PointTransaction> for TransactionRow {
    fn from(tx: &PointTransaction) -> Self {
        Self {
            id: *tx.id.as_uuid(),
            user_id: *tx.user_id.as_uuid(),
            points: tx.points,
            source: tx.source.as_str().to_owned(),
            tournament_id: tx.tournament_id.map(|id| *id.as_uuid()),
            claim_id: tx.claim_id.map(|id| *id.as_uuid()),
            notes: tx.notes.clone(),
            created_at: tx.created_at,
            created_by: *tx.created_by.as_uuid(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct NotificationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = RepositoryError;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            user_id: row.user_id.into(),
            kind: parse_column::<NotificationKind>("notification kind", &row.kind)?,
            title: row.title,
            message: row.message,
            is_read: row.is_read,
            created_at: row.created_at,
        })
    }
}

impl From<&Notification> for NotificationRow {
    fn from(n: &Notification) -> Self {
        Self {
            id: *n.id.as_uuid(),
            user_id: *n.user_id.as_uuid(),
            kind: n.kind.as_str().to_owned(),
            title: n.title.clone(),
            message: n.message.clone(),
            is_read: n.is_read,
            created_at: n.created_at,
        }
    }
}

/// Convert a batch of rows, failing on the first invalid one.
pub(crate) fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, RepositoryError>
where
    T: TryFrom<R, Error = RepositoryError>,
{
    rows.into_iter().map(T::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn user_row(role: &str) -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            nickname: "ada".to_owned(),
            email: "ada@example.com".to_owned(),
            password_hash: "hash".to_owned(),
            role: role.to_owned(),
            total_points: 12,
            profile_image: None,
            created_at: Utc::now(),
        }
    }

    #[rstest]
    fn user_rows_decode_roles() {
        let user = User::try_from(user_row("stand_manager")).expect("valid row");
        assert_eq!(user.role, Role::StandManager);
        assert_eq!(user.total_points, 12);
    }

    #[rstest]
    fn unknown_enum_values_are_query_errors() {
        let err = User::try_from(user_row("superuser")).expect_err("bad role");
        assert!(matches!(err, RepositoryError::Query { .. }));
        assert!(err.to_string().contains("invalid role"));
    }

    #[rstest]
    fn tournament_specifications_round_trip_through_jsonb() {
        let row = TournamentRow {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            name: "Finals".to_owned(),
            scheduled_time: Utc::now(),
            points_reward: 50,
            specifications: serde_json::json!({"format": "1v1"}),
            status: "active".to_owned(),
            created_at: Utc::now(),
        };
        let tournament = Tournament::try_from(row).expect("valid row");
        assert_eq!(tournament.status, TournamentStatus::Active);
        let back = TournamentRow::try_from(&tournament).expect("encode");
        assert_eq!(back.specifications["format"], "1v1");
    }

    #[rstest]
    fn non_string_specifications_are_rejected() {
        let row = TournamentRow {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            name: "Finals".to_owned(),
            scheduled_time: Utc::now(),
            points_reward: 50,
            specifications: serde_json::json!({"rounds": 3}),
            status: "scheduled".to_owned(),
            created_at: Utc::now(),
        };
        assert!(Tournament::try_from(row).is_err());
    }
}
