//! OpenAPI schema definitions for domain types.
//!
//! Domain types stay free of `ToSchema` derives. The wrappers here mirror the
//! serialised shape of each domain type and register it under the domain
//! path with `#[schema(as = ...)]`. Every success payload is returned inside
//! the `{"success": true, "data": ...}` envelope; the schemas describe `data`.

#![expect(
    dead_code,
    reason = "Wrappers exist only for OpenAPI schema generation via utoipa"
)]

use std::collections::BTreeMap;

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// A business rule rejected the request.
    #[schema(rename = "conflict")]
    Conflict,
    /// Too many failed attempts.
    #[schema(rename = "too_many_requests")]
    TooManyRequests,
    /// A dependency is unavailable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`], the `error` member of a
/// failure envelope.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[schema(rename_all = "camelCase")]
pub struct ErrorSchema {
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    #[schema(example = "name must not be empty")]
    message: String,
    /// Rule or field details for expected rejections.
    details: Option<serde_json::Value>,
    /// Correlation identifier, also sent in the `trace-id` header.
    #[schema(example = "4b0a0c35-52f1-4d2c-b0a5-3c2a6b0c9e0f")]
    trace_id: Option<String>,
}

#[derive(ToSchema)]
#[schema(as = crate::domain::Role)]
#[schema(rename_all = "snake_case")]
pub enum RoleSchema {
    User,
    Assistant,
    StandManager,
    Admin,
}

/// OpenAPI schema for [`crate::domain::User`]. The password hash is never
/// serialised.
#[derive(ToSchema)]
#[schema(as = crate::domain::User)]
#[schema(rename_all = "camelCase")]
pub struct UserSchema {
    #[schema(value_type = String, format = Uuid)]
    id: String,
    #[schema(example = "ada_l")]
    nickname: String,
    #[schema(example = "ada@example.com")]
    email: String,
    role: RoleSchema,
    total_points: i64,
    profile_image: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
}

#[derive(ToSchema)]
#[schema(as = crate::domain::Event)]
#[schema(rename_all = "camelCase")]
pub struct EventSchema {
    #[schema(value_type = String, format = Uuid)]
    id: String,
    #[schema(example = "Summer Cup")]
    name: String,
    description: String,
    #[schema(value_type = String, format = DateTime)]
    start_date: String,
    #[schema(value_type = String, format = DateTime)]
    end_date: String,
    is_active: bool,
    #[schema(value_type = String, format = Uuid)]
    created_by: String,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
}

#[derive(ToSchema)]
#[schema(as = crate::domain::TournamentStatus)]
#[schema(rename_all = "snake_case")]
pub enum TournamentStatusSchema {
    Scheduled,
    Active,
    Completed,
}

#[derive(ToSchema)]
#[schema(as = crate::domain::Tournament)]
#[schema(rename_all = "camelCase")]
pub struct TournamentSchema {
    #[schema(value_type = String, format = Uuid)]
    id: String,
    #[schema(value_type = String, format = Uuid)]
    event_id: String,
    name: String,
    #[schema(value_type = String, format = DateTime)]
    scheduled_time: String,
    #[schema(minimum = 1, maximum = 1000)]
    points_reward: i64,
    /// Free-form key/value rules such as format or team size.
    specifications: BTreeMap<String, String>,
    status: TournamentStatusSchema,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
}

#[derive(ToSchema)]
#[schema(as = crate::domain::Stand)]
#[schema(rename_all = "camelCase")]
pub struct StandSchema {
    #[schema(value_type = String, format = Uuid)]
    id: String,
    name: String,
    description: String,
    #[schema(value_type = String, format = Uuid)]
    manager_id: String,
    #[schema(value_type = String, format = Uuid)]
    event_id: String,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
}

#[derive(ToSchema)]
#[schema(as = crate::domain::Product)]
#[schema(rename_all = "camelCase")]
pub struct ProductSchema {
    #[schema(value_type = String, format = Uuid)]
    id: String,
    #[schema(value_type = String, format = Uuid)]
    stand_id: String,
    name: String,
    description: String,
    #[schema(minimum = 1)]
    points_required: i64,
    is_active: bool,
    image_url: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
}

#[derive(ToSchema)]
#[schema(as = crate::domain::ClaimStatus)]
#[schema(rename_all = "snake_case")]
pub enum ClaimStatusSchema {
    Pending,
    Completed,
}

#[derive(ToSchema)]
#[schema(as = crate::domain::Claim)]
#[schema(rename_all = "camelCase")]
pub struct ClaimSchema {
    #[schema(value_type = String, format = Uuid)]
    id: String,
    #[schema(value_type = String, format = Uuid)]
    user_id: String,
    #[schema(value_type = String, format = Uuid)]
    product_id: String,
    #[schema(value_type = String, format = Uuid)]
    stand_id: String,
    status: ClaimStatusSchema,
    points_spent: i64,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
    #[schema(value_type = Option<String>, format = DateTime)]
    processed_at: Option<String>,
    #[schema(value_type = Option<String>, format = Uuid)]
    processed_by: Option<String>,
}

#[derive(ToSchema)]
#[schema(as = crate::domain::PointSource)]
#[schema(rename_all = "snake_case")]
pub enum PointSourceSchema {
    Tournament,
    Challenge,
    Bonus,
    Redemption,
}

/// OpenAPI schema for [`crate::domain::PointTransaction`]. Redemptions carry
/// negative `points`.
#[derive(ToSchema)]
#[schema(as = crate::domain::PointTransaction)]
#[schema(rename_all = "camelCase")]
pub struct PointTransactionSchema {
    #[schema(value_type = String, format = Uuid)]
    id: String,
    #[schema(value_type = String, format = Uuid)]
    user_id: String,
    points: i64,
    source: PointSourceSchema,
    #[schema(value_type = Option<String>, format = Uuid)]
    tournament_id: Option<String>,
    #[schema(value_type = Option<String>, format = Uuid)]
    claim_id: Option<String>,
    notes: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
    #[schema(value_type = String, format = Uuid)]
    created_by: String,
}

#[derive(ToSchema)]
#[schema(as = crate::domain::LeaderboardEntry)]
#[schema(rename_all = "camelCase")]
pub struct LeaderboardEntrySchema {
    #[schema(minimum = 1)]
    rank: usize,
    #[schema(value_type = String, format = Uuid)]
    user_id: String,
    nickname: String,
    profile_image: Option<String>,
    total_points: i64,
}

/// OpenAPI schema for [`crate::domain::ContextEntry`]: a leaderboard row
/// flagged when it belongs to the requested user.
#[derive(ToSchema)]
#[schema(as = crate::domain::ContextEntry)]
#[schema(rename_all = "camelCase")]
pub struct ContextEntrySchema {
    rank: usize,
    #[schema(value_type = String, format = Uuid)]
    user_id: String,
    nickname: String,
    profile_image: Option<String>,
    total_points: i64,
    is_current_user: bool,
}

#[derive(ToSchema)]
#[schema(as = crate::domain::NotificationKind)]
#[schema(rename_all = "snake_case")]
pub enum NotificationKindSchema {
    PointsAwarded,
    ClaimCreated,
    ClaimCompleted,
    RoleChanged,
    Announcement,
}

#[derive(ToSchema)]
#[schema(as = crate::domain::Notification)]
#[schema(rename_all = "camelCase")]
pub struct NotificationSchema {
    #[schema(value_type = String, format = Uuid)]
    id: String,
    #[schema(value_type = String, format = Uuid)]
    user_id: String,
    kind: NotificationKindSchema,
    title: String,
    message: String,
    is_read: bool,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
}

/// OpenAPI schema for [`crate::domain::DashboardStats`]. Every map lists
/// all known keys, zero-filled.
#[derive(ToSchema)]
#[schema(as = crate::domain::DashboardStats)]
#[schema(rename_all = "camelCase")]
pub struct DashboardStatsSchema {
    total_users: i64,
    users_by_role: BTreeMap<String, i64>,
    points_awarded: i64,
    points_redeemed: i64,
    claims_by_status: BTreeMap<String, i64>,
    active_events: i64,
    tournaments_by_status: BTreeMap<String, i64>,
}

#[derive(ToSchema)]
#[schema(as = crate::domain::TournamentSummary)]
#[schema(rename_all = "camelCase")]
pub struct TournamentSummarySchema {
    #[schema(value_type = String, format = Uuid)]
    tournament_id: String,
    name: String,
    status: TournamentStatusSchema,
    points_reward: i64,
    points_awarded: i64,
    participants: i64,
}

#[derive(ToSchema)]
#[schema(as = crate::domain::StandSummary)]
#[schema(rename_all = "camelCase")]
pub struct StandSummarySchema {
    #[schema(value_type = String, format = Uuid)]
    stand_id: String,
    name: String,
    completed_claims: i64,
}

#[derive(ToSchema)]
#[schema(as = crate::domain::EventReport)]
#[schema(rename_all = "camelCase")]
pub struct EventReportSchema {
    #[schema(value_type = String, format = Uuid)]
    event_id: String,
    name: String,
    tournaments: Vec<TournamentSummarySchema>,
    points_awarded: i64,
    stands: Vec<StandSummarySchema>,
}

#[derive(ToSchema)]
#[schema(as = crate::domain::ProductSummary)]
#[schema(rename_all = "camelCase")]
pub struct ProductSummarySchema {
    #[schema(value_type = String, format = Uuid)]
    product_id: String,
    name: String,
    points_required: i64,
    completed_claims: i64,
    pending_claims: i64,
    points_spent: i64,
}

#[derive(ToSchema)]
#[schema(as = crate::domain::StandReport)]
#[schema(rename_all = "camelCase")]
pub struct StandReportSchema {
    #[schema(value_type = String, format = Uuid)]
    stand_id: String,
    name: String,
    products: Vec<ProductSummarySchema>,
    completed_claims: i64,
    points_spent: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::Value;
    use utoipa::PartialSchema;

    fn schema_json<T: PartialSchema>() -> Value {
        serde_json::to_value(T::schema()).expect("schema serialises to JSON")
    }

    fn property_names(schema: &Value) -> Vec<String> {
        schema["properties"]
            .as_object()
            .map(|props| props.keys().cloned().collect())
            .unwrap_or_default()
    }

    #[rstest]
    #[case(ErrorSchema::name(), "crate.domain.Error")]
    #[case(UserSchema::name(), "crate.domain.User")]
    #[case(ClaimSchema::name(), "crate.domain.Claim")]
    #[case(DashboardStatsSchema::name(), "crate.domain.DashboardStats")]
    fn schemas_register_under_domain_paths(
        #[case] name: std::borrow::Cow<'static, str>,
        #[case] expected: &str,
    ) {
        // utoipa replaces :: with . in schema names
        assert_eq!(name, expected);
    }

    #[rstest]
    fn error_code_schema_lists_every_code() {
        let json = schema_json::<ErrorCodeSchema>().to_string();
        for code in [
            "invalid_request",
            "unauthorized",
            "forbidden",
            "not_found",
            "conflict",
            "too_many_requests",
            "service_unavailable",
            "internal_error",
        ] {
            assert!(json.contains(code), "missing {code}");
        }
    }

    #[rstest]
    fn user_schema_matches_serialised_user() {
        let names = property_names(&schema_json::<UserSchema>());
        assert!(names.contains(&"totalPoints".to_owned()));
        assert!(names.contains(&"profileImage".to_owned()));
        assert!(!names.iter().any(|name| name.contains("password")));
    }

    #[rstest]
    fn context_entry_schema_flattens_the_row() {
        let names = property_names(&schema_json::<ContextEntrySchema>());
        assert!(names.contains(&"rank".to_owned()));
        assert!(names.contains(&"isCurrentUser".to_owned()));
    }
}
