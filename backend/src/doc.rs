//! OpenAPI documentation for the JSON API.
//!
//! [`ApiDoc`] registers every handler under `inbound::http`, the schema
//! wrappers from [`crate::inbound::http::schemas`] and the session cookie
//! security scheme. Debug builds serve it through Swagger UI at `/docs`.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::schemas::{
    ClaimSchema, ClaimStatusSchema, ContextEntrySchema, DashboardStatsSchema, ErrorCodeSchema,
    ErrorSchema, EventReportSchema, EventSchema, LeaderboardEntrySchema, NotificationKindSchema,
    NotificationSchema, PointSourceSchema, PointTransactionSchema, ProductSchema,
    ProductSummarySchema, RoleSchema, StandReportSchema, StandSchema, StandSummarySchema,
    TournamentSchema, TournamentStatusSchema, TournamentSummarySchema, UserSchema,
};
use crate::inbound::http::{
    auth, claims, events, health, leaderboard, notifications, points, reports, stands,
    tournaments, users,
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);
        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/auth/login. Mutating requests \
                 also need the X-CSRF-Token header returned at login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Pointsboard API",
        description = "Tournaments, points, leaderboard and product claims for live events. \
            Success bodies are wrapped as {\"success\": true, \"data\": ...}; failures as \
            {\"success\": false, \"error\": Error}."
    ),
    servers((url = "/", description = "Relative to the deployment base URL")),
    security(("SessionCookie" = [])),
    paths(
        auth::register,
        auth::login,
        auth::logout,
        auth::me,
        users::list_users,
        users::get_user,
        users::change_role,
        users::update_profile_image,
        users::point_history,
        users::user_claims,
        events::list_events,
        events::create_event,
        events::active_event,
        events::get_event,
        events::update_event,
        events::delete_event,
        events::list_tournaments,
        events::create_tournament,
        tournaments::get_tournament,
        tournaments::update_tournament,
        tournaments::delete_tournament,
        tournaments::advance_status,
        tournaments::award_tournament,
        stands::list_stands,
        stands::create_stand,
        stands::get_stand,
        stands::update_stand,
        stands::delete_stand,
        stands::list_products,
        stands::create_product,
        stands::stand_claims,
        stands::get_product,
        stands::update_product,
        stands::set_product_active,
        points::assign_points,
        claims::create_claim,
        claims::get_claim,
        claims::process_claim,
        leaderboard::leaderboard,
        leaderboard::user_rank,
        leaderboard::user_context,
        notifications::list_notifications,
        notifications::unread_count,
        notifications::mark_read,
        notifications::mark_all_read,
        notifications::broadcast,
        reports::dashboard,
        reports::event_report,
        reports::stand_report,
        health::ready,
        health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        RoleSchema,
        UserSchema,
        EventSchema,
        TournamentSchema,
        TournamentStatusSchema,
        StandSchema,
        ProductSchema,
        ClaimSchema,
        ClaimStatusSchema,
        PointSourceSchema,
        PointTransactionSchema,
        LeaderboardEntrySchema,
        ContextEntrySchema,
        NotificationKindSchema,
        NotificationSchema,
        DashboardStatsSchema,
        TournamentSummarySchema,
        StandSummarySchema,
        EventReportSchema,
        ProductSummarySchema,
        StandReportSchema,
    )),
    tags(
        (name = "auth", description = "Registration and sessions"),
        (name = "users", description = "Accounts and roles"),
        (name = "events", description = "Events bounding point assignment"),
        (name = "tournaments", description = "Tournaments within events"),
        (name = "stands", description = "Vendor stands and products"),
        (name = "points", description = "Point ledger"),
        (name = "claims", description = "Product redemption"),
        (name = "leaderboard", description = "Public rankings"),
        (name = "notifications", description = "In-app inbox"),
        (name = "reports", description = "Aggregate statistics"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn object_fields(doc: &utoipa::openapi::OpenApi, name: &str) -> Vec<String> {
        let schemas = &doc.components.as_ref().expect("components").schemas;
        match schemas.get(name).expect("registered schema") {
            RefOr::T(Schema::Object(object)) => object.properties.keys().cloned().collect(),
            _ => panic!("expected object schema for {name}"),
        }
    }

    #[rstest]
    fn error_schema_has_envelope_fields() {
        let fields = object_fields(&ApiDoc::openapi(), "crate.domain.Error");
        for field in ["code", "message", "details", "traceId"] {
            assert!(fields.iter().any(|f| f == field), "missing {field}");
        }
    }

    #[rstest]
    #[case("/api/v1/auth/login")]
    #[case("/api/v1/points")]
    #[case("/api/v1/claims/{id}/process")]
    #[case("/api/v1/leaderboard/users/{id}/context")]
    #[case("/health/ready")]
    fn paths_are_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    fn session_cookie_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
