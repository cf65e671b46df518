//! Read-only aggregate reports.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{EventId, ProductId, StandId, TournamentId, TournamentStatus};

/// Platform-wide statistics shown on the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: i64,
    /// Keyed by role storage name.
    pub users_by_role: BTreeMap<String, i64>,
    /// Sum of positive ledger entries.
    pub points_awarded: i64,
    /// Absolute sum of redemption entries.
    pub points_redeemed: i64,
    /// Keyed by claim status storage name.
    pub claims_by_status: BTreeMap<String, i64>,
    pub active_events: i64,
    /// Keyed by tournament status storage name.
    pub tournaments_by_status: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentSummary {
    pub tournament_id: TournamentId,
    pub name: String,
    pub status: TournamentStatus,
    pub points_reward: i64,
    /// Points distributed through this tournament.
    pub points_awarded: i64,
    pub participants: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandSummary {
    pub stand_id: StandId,
    pub name: String,
    pub completed_claims: i64,
}

/// Per-event breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventReport {
    pub event_id: EventId,
    pub name: String,
    pub tournaments: Vec<TournamentSummary>,
    pub points_awarded: i64,
    pub stands: Vec<StandSummary>,
}

impl EventReport {
    /// Build a report, deriving the event total from the tournament rows.
    #[must_use]
    pub fn new(
        event_id: EventId,
        name: String,
        tournaments: Vec<TournamentSummary>,
        stands: Vec<StandSummary>,
    ) -> Self {
        let points_awarded = tournaments.iter().map(|t| t.points_awarded).sum();
        Self {
            event_id,
            name,
            tournaments,
            points_awarded,
            stands,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub product_id: ProductId,
    pub name: String,
    pub points_required: i64,
    pub completed_claims: i64,
    pub pending_claims: i64,
    pub points_spent: i64,
}

/// Per-stand breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandReport {
    pub stand_id: StandId,
    pub name: String,
    pub products: Vec<ProductSummary>,
    pub completed_claims: i64,
    pub points_spent: i64,
}

impl StandReport {
    /// Build a report, deriving totals from the product rows.
    #[must_use]
    pub fn new(stand_id: StandId, name: String, products: Vec<ProductSummary>) -> Self {
        let completed_claims = products.iter().map(|p| p.completed_claims).sum();
        let points_spent = products.iter().map(|p| p.points_spent).sum();
        Self {
            stand_id,
            name,
            products,
            completed_claims,
            points_spent,
        }
    }
}
