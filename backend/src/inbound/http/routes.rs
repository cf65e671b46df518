//! The `/api/v1` route table.
//!
//! The server mounts these routes under `/api/v1` behind the session
//! middleware; tests mount the same table over the in-memory store.
//! Literal segments are registered before `{id}` patterns that would
//! otherwise swallow them.

use actix_web::web;

use super::{auth, claims, events, leaderboard, notifications, points, reports, stands};
use super::{tournaments, users, validation};

/// Register every API handler and the extractor error handlers.
///
/// # Examples
/// ```no_run
/// use actix_web::{App, web};
/// use pointsboard::inbound::http::routes::configure_api;
///
/// let app = App::new().service(web::scope("/api/v1").configure(configure_api));
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(validation::json_config())
        .app_data(validation::path_config())
        .app_data(validation::query_config())
        // auth
        .service(auth::register)
        .service(auth::login)
        .service(auth::logout)
        .service(auth::me)
        // users
        .service(users::list_users)
        .service(users::get_user)
        .service(users::change_role)
        .service(users::update_profile_image)
        .service(users::point_history)
        .service(users::user_claims)
        // events and tournaments
        .service(events::list_events)
        .service(events::create_event)
        .service(events::active_event)
        .service(events::get_event)
        .service(events::update_event)
        .service(events::delete_event)
        .service(events::list_tournaments)
        .service(events::create_tournament)
        .service(tournaments::get_tournament)
        .service(tournaments::update_tournament)
        .service(tournaments::delete_tournament)
        .service(tournaments::advance_status)
        .service(tournaments::award_tournament)
        // stands and products
        .service(stands::list_stands)
        .service(stands::create_stand)
        .service(stands::get_stand)
        .service(stands::update_stand)
        .service(stands::delete_stand)
        .service(stands::list_products)
        .service(stands::create_product)
        .service(stands::stand_claims)
        .service(stands::get_product)
        .service(stands::update_product)
        .service(stands::set_product_active)
        // points and claims
        .service(points::assign_points)
        .service(claims::create_claim)
        .service(claims::get_claim)
        .service(claims::process_claim)
        // leaderboard
        .service(leaderboard::leaderboard)
        .service(leaderboard::user_rank)
        .service(leaderboard::user_context)
        // notifications
        .service(notifications::list_notifications)
        .service(notifications::unread_count)
        .service(notifications::mark_all_read)
        .service(notifications::broadcast)
        .service(notifications::mark_read)
        // reports
        .service(reports::dashboard)
        .service(reports::event_report)
        .service(reports::stand_report);
}
