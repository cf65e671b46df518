//! Leaderboard ordering.
//!
//! Ranking is a pure function over per-user standings so every adapter and
//! the cache share one definition of the order.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Nickname, UserId};

/// Default number of leaderboard rows.
pub const DEFAULT_LIMIT: usize = 10;
/// Largest accepted leaderboard limit.
pub const MAX_LIMIT: usize = 100;
/// Default number of neighbours shown on each side in a rank context.
pub const DEFAULT_WINDOW: usize = 2;
/// Largest accepted rank context window.
pub const MAX_WINDOW: usize = 10;

/// Per-user aggregate the ranking is computed from. Only users with at
/// least one ledger entry have a standing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    pub user_id: UserId,
    pub nickname: Nickname,
    pub profile_image: Option<String>,
    pub total_points: i64,
    pub first_transaction_at: DateTime<Utc>,
}

/// A ranked leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user_id: UserId,
    pub nickname: Nickname,
    pub profile_image: Option<String>,
    pub total_points: i64,
}

/// A row in a user's rank context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextEntry {
    #[serde(flatten)]
    pub entry: LeaderboardEntry,
    pub is_current_user: bool,
}

fn compare(a: &Standing, b: &Standing) -> Ordering {
    b.total_points
        .cmp(&a.total_points)
        .then_with(|| a.first_transaction_at.cmp(&b.first_transaction_at))
        .then_with(|| a.user_id.cmp(&b.user_id))
}

/// Order standings: points descending, then earliest first transaction,
/// then user id. Ranks are positions starting at 1.
#[must_use]
pub fn rank_standings(mut standings: Vec<Standing>) -> Vec<LeaderboardEntry> {
    standings.sort_by(compare);
    standings
        .into_iter()
        .enumerate()
        .map(|(index, standing)| LeaderboardEntry {
            rank: index + 1,
            user_id: standing.user_id,
            nickname: standing.nickname,
            profile_image: standing.profile_image,
            total_points: standing.total_points,
        })
        .collect()
}

/// 1-based rank of `user_id`, or `None` when unranked.
#[must_use]
pub fn rank_of(ranking: &[LeaderboardEntry], user_id: UserId) -> Option<usize> {
    ranking
        .iter()
        .find(|entry| entry.user_id == user_id)
        .map(|entry| entry.rank)
}

/// Rows from `rank - window` to `rank + window`, clamped to the ranking.
/// Empty when the user is unranked.
#[must_use]
pub fn context_window(
    ranking: &[LeaderboardEntry],
    user_id: UserId,
    window: usize,
) -> Vec<ContextEntry> {
    let Some(position) = ranking.iter().position(|entry| entry.user_id == user_id) else {
        return Vec::new();
    };
    let start = position.saturating_sub(window);
    let end = position.saturating_add(window).min(ranking.len() - 1);
    ranking[start..=end]
        .iter()
        .map(|entry| ContextEntry {
            is_current_user: entry.user_id == user_id,
            entry: entry.clone(),
        })
        .collect()
}

/// Clamp a caller-supplied limit into `1..=MAX_LIMIT`.
#[must_use]
pub fn clamp_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}
