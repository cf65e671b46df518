//! Product claims: a user's request to redeem points for a product.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ClaimId, ProductId, StandId, UserId};

/// Claim lifecycle. `Completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    Pending,
    Completed,
}

impl ClaimStatus {
    pub const ALL: [Self; 2] = [Self::Pending, Self::Completed];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown claim status: {s}"))
    }
}

/// Stored claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    pub id: ClaimId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub stand_id: StandId,
    pub status: ClaimStatus,
    pub points_spent: i64,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub processed_by: Option<UserId>,
}

impl Claim {
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == ClaimStatus::Pending
    }
}

/// Claim insert request handed to the claim repository.
///
/// When `processed_by` is set the claim is stored as completed and the
/// repository records the matching redemption in the same transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClaim {
    pub id: ClaimId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub stand_id: StandId,
    pub points_required: i64,
    pub processed_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

impl NewClaim {
    /// Status the claim is stored with.
    #[must_use]
    pub fn initial_status(&self) -> ClaimStatus {
        if self.processed_by.is_some() {
            ClaimStatus::Completed
        } else {
            ClaimStatus::Pending
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn direct_redemption_starts_completed() {
        let mut claim = NewClaim {
            id: ClaimId::random(),
            user_id: UserId::random(),
            product_id: ProductId::random(),
            stand_id: StandId::random(),
            points_required: 100,
            processed_by: None,
            created_at: Utc::now(),
        };
        assert_eq!(claim.initial_status(), ClaimStatus::Pending);
        claim.processed_by = Some(UserId::random());
        assert_eq!(claim.initial_status(), ClaimStatus::Completed);
    }

    #[rstest]
    fn status_parses_storage_names() {
        assert_eq!("completed".parse::<ClaimStatus>(), Ok(ClaimStatus::Completed));
        assert!("cancelled".parse::<ClaimStatus>().is_err());
    }
}
