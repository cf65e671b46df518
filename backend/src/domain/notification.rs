//! In-app notifications. Delivery is storage only; clients poll.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{NotificationId, UserId, ValidationErrors};

/// Maximum notification title length.
pub const TITLE_MAX: usize = 120;
/// Maximum notification body length.
pub const MESSAGE_MAX: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    PointsAwarded,
    ClaimCreated,
    ClaimCompleted,
    RoleChanged,
    Announcement,
}

impl NotificationKind {
    pub const ALL: [Self; 5] = [
        Self::PointsAwarded,
        Self::ClaimCreated,
        Self::ClaimCompleted,
        Self::RoleChanged,
        Self::Announcement,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PointsAwarded => "points_awarded",
            Self::ClaimCreated => "claim_created",
            Self::ClaimCompleted => "claim_completed",
            Self::RoleChanged => "role_changed",
            Self::Announcement => "announcement",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown notification kind: {s}"))
    }
}

/// Stored notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Title and body shared by single and broadcast notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

impl NotificationContent {
    pub fn new(
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<Self, ValidationErrors> {
        let title = title.into().trim().to_owned();
        let message = message.into().trim().to_owned();
        let mut errors = ValidationErrors::new();
        errors.check(!title.is_empty(), "title", "title must not be empty");
        errors.check(
            title.chars().count() <= TITLE_MAX,
            "title",
            format!("title must be at most {TITLE_MAX} characters"),
        );
        errors.check(
            message.chars().count() <= MESSAGE_MAX,
            "message",
            format!("message must be at most {MESSAGE_MAX} characters"),
        );
        errors.into_result(Self {
            kind,
            title,
            message,
        })
    }

    /// Materialise for one recipient.
    #[must_use]
    pub fn for_user(&self, user_id: UserId, created_at: DateTime<Utc>) -> Notification {
        Notification {
            id: NotificationId::random(),
            user_id,
            kind: self.kind,
            title: self.title.clone(),
            message: self.message.clone(),
            is_read: false,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn content_rejects_blank_title() {
        let errors = NotificationContent::new(NotificationKind::Announcement, " ", "hello")
            .expect_err("blank title");
        assert_eq!(errors.messages(), vec!["title must not be empty"]);
    }

    #[rstest]
    fn materialised_notifications_start_unread() {
        let content = NotificationContent::new(NotificationKind::PointsAwarded, "Points", "+10")
            .expect("valid");
        let user = UserId::random();
        let notification = content.for_user(user, Utc::now());
        assert_eq!(notification.user_id, user);
        assert!(!notification.is_read);
        let value = serde_json::to_value(&notification).expect("serialise");
        assert_eq!(value["kind"], "points_awarded");
    }
}
