//! Liveness and readiness probes.
//!
//! Probes answer with an empty body and `Cache-Control: no-store`. Readiness
//! additionally checks out a database connection when the server runs on
//! PostgreSQL, so a lost database takes the instance out of rotation.

use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use tracing::warn;

use crate::outbound::persistence::DbPool;

/// Probe flags shared between the server and the health handlers.
pub struct HealthState {
    ready: AtomicBool,
    live: AtomicBool,
    pool: Option<DbPool>,
}

impl HealthState {
    /// Not ready, live, with an optional database to ping on readiness.
    pub fn new(pool: Option<DbPool>) -> Self {
        Self {
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
            pool,
        }
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Fail liveness so orchestrators stop routing during shutdown.
    pub fn mark_unhealthy(&self) {
        self.live.store(false, Ordering::Release);
    }

    pub fn is_alive(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    async fn is_ready(&self) -> bool {
        if !self.ready.load(Ordering::Acquire) {
            return false;
        }
        match &self.pool {
            None => true,
            Some(pool) => match pool.get().await {
                Ok(_) => true,
                Err(error) => {
                    warn!(%error, "readiness probe could not reach the database");
                    false
                }
            },
        }
    }
}

fn probe_response(probe_ok: bool) -> HttpResponse {
    let mut response = if probe_ok {
        HttpResponse::Ok()
    } else {
        HttpResponse::ServiceUnavailable()
    };
    response
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .finish()
}

/// `200` once startup finished and the database answers, `503` otherwise.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Server is ready to handle traffic"),
        (status = 503, description = "Server is not ready")
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    probe_response(state.is_ready().await)
}

/// `200` while the process is alive, `503` once draining.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Server is alive"),
        (status = 503, description = "Server is shutting down")
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    probe_response(state.is_alive())
}
