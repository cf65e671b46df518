//! Business rule violations detected against current state.
//!
//! These are expected outcomes rather than faults: they are checked before any
//! write and reported to the caller as `conflict` errors with a stable
//! `details.rule` identifier.

use serde_json::json;
use thiserror::Error as ThisError;

use super::Error;

/// A business rule rejected the requested change.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum RuleViolation {
    /// Points may only be assigned while an event is running.
    #[error("no active event: points can only be assigned during an active event")]
    NoActiveEvent,
    /// Tournaments may only be scheduled under an event that is running.
    #[error("event is not active: tournaments can only be created under an active event")]
    InactiveEvent,
    /// The user already claimed this product.
    #[error("product already claimed by this user")]
    DuplicateClaim,
    /// The user's balance does not cover the product.
    #[error("insufficient points: {available} available, {required} required")]
    InsufficientPoints { available: i64, required: i64 },
    /// The claim was already completed.
    #[error("claim has already been processed")]
    ClaimAlreadyProcessed,
    /// Tournament status may only move forward.
    #[error("tournament status cannot move from {from} to {to}")]
    StatusRegression { from: String, to: String },
    /// Points were already distributed against the tournament.
    #[error("tournament has distributed points and cannot be deleted")]
    TournamentHasPoints,
    /// The event still owns tournaments or stands.
    #[error("event has tournaments or stands and cannot be deleted")]
    EventHasTournaments,
    /// The stand has claims recorded against it.
    #[error("stand has claims and cannot be deleted")]
    StandHasClaims,
    /// Nickname is registered to another account.
    #[error("nickname is already taken")]
    NicknameTaken,
    /// Email is registered to another account.
    #[error("email is already registered")]
    EmailTaken,
}

impl RuleViolation {
    /// Stable snake_case identifier exposed in error details.
    #[must_use]
    pub fn rule(&self) -> &'static str {
        match self {
            Self::NoActiveEvent => "no_active_event",
            Self::InactiveEvent => "inactive_event",
            Self::DuplicateClaim => "duplicate_claim",
            Self::InsufficientPoints { .. } => "insufficient_points",
            Self::ClaimAlreadyProcessed => "claim_already_processed",
            Self::StatusRegression { .. } => "status_regression",
            Self::TournamentHasPoints => "tournament_has_points",
            Self::EventHasTournaments => "event_has_tournaments",
            Self::StandHasClaims => "stand_has_claims",
            Self::NicknameTaken => "nickname_taken",
            Self::EmailTaken => "email_taken",
        }
    }
}

impl From<RuleViolation> for Error {
    fn from(value: RuleViolation) -> Self {
        let details = match &value {
            RuleViolation::InsufficientPoints {
                available,
                required,
            } => json!({ "rule": value.rule(), "available": available, "required": required }),
            _ => json!({ "rule": value.rule() }),
        };
        Self::conflict(value.to_string()).with_details(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(RuleViolation::NoActiveEvent, "no_active_event")]
    #[case(RuleViolation::InactiveEvent, "inactive_event")]
    #[case(RuleViolation::DuplicateClaim, "duplicate_claim")]
    #[case(RuleViolation::ClaimAlreadyProcessed, "claim_already_processed")]
    fn maps_to_conflict_with_rule(#[case] violation: RuleViolation, #[case] rule: &str) {
        let err = Error::from(violation);
        assert_eq!(err.code(), ErrorCode::Conflict);
        assert_eq!(err.details().expect("details")["rule"], rule);
    }

    #[rstest]
    fn insufficient_points_reports_balances() {
        let err = Error::from(RuleViolation::InsufficientPoints {
            available: 50,
            required: 100,
        });
        let details = err.details().expect("details");
        assert_eq!(details["available"], 50);
        assert_eq!(details["required"], 100);
        assert!(err.message().starts_with("insufficient points"));
    }
}
