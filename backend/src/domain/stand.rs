//! Vendor stands and the products they offer in exchange for points.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Error, EventId, ProductId, RequestContext, Role, StandId, UserId, ValidationErrors};

/// Stored stand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stand {
    pub id: StandId,
    pub name: String,
    pub description: String,
    pub manager_id: UserId,
    pub event_id: EventId,
    pub created_at: DateTime<Utc>,
}

impl Stand {
    /// Admins manage every stand; stand managers only the ones assigned to
    /// them.
    #[must_use]
    pub fn is_managed_by(&self, ctx: &RequestContext) -> bool {
        ctx.role().at_least(Role::Admin)
            || (ctx.user_id() == self.manager_id && ctx.role().at_least(Role::StandManager))
    }

    /// Fail with `forbidden` unless [`Self::is_managed_by`] holds.
    pub fn require_manager(&self, ctx: &RequestContext) -> Result<(), Error> {
        if self.is_managed_by(ctx) {
            Ok(())
        } else {
            Err(Error::forbidden("only the stand manager or an admin may do this"))
        }
    }
}

/// Editable stand fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandDraft {
    pub name: String,
    pub description: String,
    pub manager_id: UserId,
    pub event_id: EventId,
}

impl StandDraft {
    pub fn validate(self) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = self.name.trim().to_owned();
        errors.check(!name.is_empty(), "name", "name must not be empty");
        errors.into_result(Self {
            name,
            description: self.description.trim().to_owned(),
            ..self
        })
    }
}

/// Stored product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub stand_id: StandId,
    pub name: String,
    pub description: String,
    pub points_required: i64,
    pub is_active: bool,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Editable product fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub points_required: i64,
    pub image_url: Option<String>,
}

impl ProductDraft {
    pub fn validate(self) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = self.name.trim().to_owned();
        errors.check(!name.is_empty(), "name", "name must not be empty");
        errors.check(
            self.points_required >= 1,
            "pointsRequired",
            "points required must be at least 1",
        );
        let image_url = self
            .image_url
            .map(|url| url.trim().to_owned())
            .filter(|url| !url.is_empty());
        errors.into_result(Self {
            name,
            description: self.description.trim().to_owned(),
            image_url,
            ..self
        })
    }
}
