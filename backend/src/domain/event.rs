//! Events bound the time window in which tournaments run and points are
//! assigned.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{EventId, UserId, ValidationErrors};

/// Maximum event name length.
pub const EVENT_NAME_MAX: usize = 120;

/// Stored event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// An event is active when enabled and `now` lies within its window
    /// (both ends inclusive).
    #[must_use]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.start_date <= now && now <= self.end_date
    }

    /// Whether `instant` falls inside the event window.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start_date <= instant && instant <= self.end_date
    }
}

/// Editable event fields, used for both creation and full updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub name: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
}

impl EventDraft {
    /// Trim text fields and check the window.
    pub fn validate(self) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = self.name.trim().to_owned();
        errors.check(!name.is_empty(), "name", "name must not be empty");
        errors.check(
            name.chars().count() <= EVENT_NAME_MAX,
            "name",
            format!("name must be at most {EVENT_NAME_MAX} characters"),
        );
        errors.check(
            self.end_date > self.start_date,
            "endDate",
            "end date must be after start date",
        );
        errors.into_result(Self {
            name,
            description: self.description.trim().to_owned(),
            ..self
        })
    }
}
