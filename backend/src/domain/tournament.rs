//! Tournaments run inside an event and award a fixed number of points.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Event, EventId, RuleViolation, TournamentId, ValidationErrors};

/// Smallest reward a tournament may carry.
pub const POINTS_REWARD_MIN: i64 = 1;
/// Largest reward a tournament may carry.
pub const POINTS_REWARD_MAX: i64 = 1000;

/// Tournament lifecycle; declared in order so status only moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    Scheduled,
    Active,
    Completed,
}

impl TournamentStatus {
    /// Every status in lifecycle order.
    pub const ALL: [Self; 3] = [Self::Scheduled, Self::Active, Self::Completed];

    /// Storage and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }

    /// Check a transition; status may advance (skipping is allowed) but never
    /// stay put or regress.
    pub fn transition_to(self, next: Self) -> Result<Self, RuleViolation> {
        if next > self {
            Ok(next)
        } else {
            Err(RuleViolation::StatusRegression {
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }
}

impl fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TournamentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown tournament status: {s}"))
    }
}

/// Stored tournament.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: TournamentId,
    pub event_id: EventId,
    pub name: String,
    pub scheduled_time: DateTime<Utc>,
    pub points_reward: i64,
    pub specifications: BTreeMap<String, String>,
    pub status: TournamentStatus,
    pub created_at: DateTime<Utc>,
}

/// Editable tournament fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TournamentDraft {
    pub name: String,
    pub scheduled_time: DateTime<Utc>,
    pub points_reward: i64,
    pub specifications: BTreeMap<String, String>,
}

impl TournamentDraft {
    /// Validate against the owning event's window.
    pub fn validate(self, event: &Event) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = self.name.trim().to_owned();
        errors.check(!name.is_empty(), "name", "name must not be empty");
        errors.check(
            (POINTS_REWARD_MIN..=POINTS_REWARD_MAX).contains(&self.points_reward),
            "pointsReward",
            format!("points reward must be between {POINTS_REWARD_MIN} and {POINTS_REWARD_MAX}"),
        );
        errors.check(
            event.contains(self.scheduled_time),
            "scheduledTime",
            "scheduled time must fall within the event dates",
        );
        errors.check(
            self.specifications.keys().all(|key| !key.trim().is_empty()),
            "specifications",
            "specification keys must not be empty",
        );
        errors.into_result(Self { name, ..self })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;
    use chrono::{Duration, TimeZone};
    use rstest::rstest;

    fn event() -> Event {
        let start = Utc
            .with_ymd_and_hms(2026, 6, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp");
        Event {
            id: EventId::random(),
            name: "Summer Cup".to_owned(),
            description: String::new(),
            start_date: start,
            end_date: start + Duration::days(1),
            is_active: true,
            created_by: UserId::random(),
            created_at: start,
        }
    }

    #[rstest]
    #[case(TournamentStatus::Scheduled, TournamentStatus::Active, true)]
    #[case(TournamentStatus::Scheduled, TournamentStatus::Completed, true)]
    #[case(TournamentStatus::Active, TournamentStatus::Completed, true)]
    #[case(TournamentStatus::Active, TournamentStatus::Active, false)]
    #[case(TournamentStatus::Completed, TournamentStatus::Scheduled, false)]
    fn status_moves_forward_only(
        #[case] from: TournamentStatus,
        #[case] to: TournamentStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.transition_to(to).is_ok(), allowed);
    }

    #[rstest]
    fn draft_outside_event_window_is_rejected() {
        let event = event();
        let draft = TournamentDraft {
            name: "Finals".to_owned(),
            scheduled_time: event.end_date + Duration::hours(1),
            points_reward: 0,
            specifications: BTreeMap::new(),
        };
        let errors = draft.validate(&event).expect_err("invalid");
        let fields: Vec<_> = errors.errors().iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["pointsReward", "scheduledTime"]);
    }

    #[rstest]
    fn draft_keeps_specifications() {
        let event = event();
        let specs = BTreeMap::from([("format".to_owned(), "1v1".to_owned())]);
        let draft = TournamentDraft {
            name: " Finals ".to_owned(),
            scheduled_time: event.start_date + Duration::hours(2),
            points_reward: 50,
            specifications: specs.clone(),
        }
        .validate(&event)
        .expect("valid");
        assert_eq!(draft.name, "Finals");
        assert_eq!(draft.specifications, specs);
    }
}
