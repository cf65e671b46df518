//! Pointsboard entry-point: loads settings, prepares storage and serves the API.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use pointsboard::inbound::http::health::HealthState;
use pointsboard::inbound::http::session_config::{BuildMode, key_fingerprint, session_settings};
use pointsboard::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use pointsboard::settings::AppSettings;
use server::{ServerConfig, build_http_state, create_server};

/// Connect to PostgreSQL and bring the schema up to date, when configured.
async fn connect_database(settings: &AppSettings) -> std::io::Result<Option<DbPool>> {
    let Some(url) = settings.database_url.as_deref() else {
        return Ok(None);
    };
    let applied = run_migrations(url)
        .await
        .map_err(|e| std::io::Error::other(format!("migrations failed: {e}")))?;
    let config = PoolConfig::new(url).with_max_size(settings.pool_size());
    info!(
        database = %config.redacted_url(),
        applied,
        pool_size = config.max_size(),
        "database ready"
    );
    let pool = DbPool::new(config)
        .await
        .map_err(|e| std::io::Error::other(format!("database pool failed: {e}")))?;
    Ok(Some(pool))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load()
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let session = session_settings(&settings, BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;
    info!(
        fingerprint = %key_fingerprint(&session.key),
        "session signing key loaded"
    );
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;

    let db_pool = connect_database(&settings).await?;
    let http_state = build_http_state(&settings, db_pool.as_ref()).await?;
    let health_state = web::Data::new(HealthState::new(db_pool));

    let server = create_server(
        health_state.clone(),
        http_state,
        ServerConfig::new(session, bind_addr),
    )?;
    info!(%bind_addr, "listening");
    let result = server.await;
    health_state.mark_unhealthy();
    result
}
