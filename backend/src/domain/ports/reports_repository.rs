//! Port for aggregate report queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{DashboardStats, EventId, EventReport, StandId, StandReport};

use super::RepositoryError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportsRepository: Send + Sync {
    /// Platform statistics; `now` decides which events count as active.
    async fn dashboard(&self, now: DateTime<Utc>) -> Result<DashboardStats, RepositoryError>;

    async fn event_report(&self, id: &EventId) -> Result<Option<EventReport>, RepositoryError>;

    async fn stand_report(&self, id: &StandId) -> Result<Option<StandReport>, RepositoryError>;
}
