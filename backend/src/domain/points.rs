//! Point ledger entries and assignment requests.
//!
//! The ledger is append-only. Every entry is written together with the
//! matching change to the user's `total_points`, so the sum of a user's
//! entries always equals their total. Redemptions are stored as negative
//! entries.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ClaimId, TournamentId, TransactionId, UserId, ValidationErrors};

/// Smallest amount a single assignment may award.
pub const POINTS_MIN: i64 = 1;
/// Largest amount a single assignment may award.
pub const POINTS_MAX: i64 = 1000;
/// Maximum length of assignment notes.
pub const NOTES_MAX: usize = 500;

/// Where a ledger entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointSource {
    Tournament,
    Challenge,
    Bonus,
    /// Points spent on a claim; only written by the claim workflow.
    Redemption,
}

impl PointSource {
    pub const ALL: [Self; 4] = [
        Self::Tournament,
        Self::Challenge,
        Self::Bonus,
        Self::Redemption,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tournament => "tournament",
            Self::Challenge => "challenge",
            Self::Bonus => "bonus",
            Self::Redemption => "redemption",
        }
    }

    /// Whether staff may assign points under this source.
    #[must_use]
    pub const fn is_assignable(self) -> bool {
        !matches!(self, Self::Redemption)
    }
}

impl fmt::Display for PointSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PointSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|source| source.as_str() == s)
            .ok_or_else(|| format!("unknown point source: {s}"))
    }
}

/// Stored ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointTransaction {
    pub id: TransactionId,
    pub user_id: UserId,
    pub points: i64,
    pub source: PointSource,
    pub tournament_id: Option<TournamentId>,
    pub claim_id: Option<ClaimId>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: UserId,
}

/// Ledger entry handed to the ledger repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPointTransaction {
    pub id: TransactionId,
    pub user_id: UserId,
    pub points: i64,
    pub source: PointSource,
    pub tournament_id: Option<TournamentId>,
    pub claim_id: Option<ClaimId>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: UserId,
}

impl NewPointTransaction {
    /// Entry as it will read back once stored.
    #[must_use]
    pub fn into_stored(self) -> PointTransaction {
        PointTransaction {
            id: self.id,
            user_id: self.user_id,
            points: self.points,
            source: self.source,
            tournament_id: self.tournament_id,
            claim_id: self.claim_id,
            notes: self.notes,
            created_at: self.created_at,
            created_by: self.created_by,
        }
    }
}

/// Staff request to award points to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignPointsRequest {
    pub user_id: UserId,
    pub amount: i64,
    pub source: PointSource,
    pub tournament_id: Option<TournamentId>,
    pub notes: Option<String>,
}

impl AssignPointsRequest {
    /// Checks that need no stored state. Lookups (user, tournament, event)
    /// are appended by the service to the same error list.
    pub fn check_shape(&mut self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.check(
            (POINTS_MIN..=POINTS_MAX).contains(&self.amount),
            "amount",
            format!("amount must be between {POINTS_MIN} and {POINTS_MAX}"),
        );
        errors.check(
            self.source.is_assignable(),
            "source",
            "source must be one of tournament, challenge, bonus",
        );
        if self.source == PointSource::Tournament {
            errors.check(
                self.tournament_id.is_some(),
                "tournamentId",
                "tournament id is required for tournament points",
            );
        } else {
            self.tournament_id = None;
        }
        self.notes = self
            .notes
            .take()
            .map(|notes| notes.trim().to_owned())
            .filter(|notes| !notes.is_empty());
        errors.check(
            self.notes
                .as_ref()
                .is_none_or(|notes| notes.chars().count() <= NOTES_MAX),
            "notes",
            format!("notes must be at most {NOTES_MAX} characters"),
        );
        errors
    }
}
