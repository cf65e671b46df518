//! Builders for the shared handler state.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use mockable::{Clock, DefaultClock};
use tracing::{debug, info, warn};

use pointsboard::domain::ports::{KeyValueCache, Repositories};
use pointsboard::domain::{Registration, Services};
use pointsboard::inbound::http::state::HttpState;
use pointsboard::inbound::http::throttle::LoginThrottle;
use pointsboard::outbound::cache::{FileCache, MemoryCache};
use pointsboard::outbound::memory::InMemoryStore;
use pointsboard::outbound::persistence::{DbPool, postgres_repositories};
use pointsboard::settings::{AppSettings, CacheBackend};

fn build_repositories(db_pool: Option<&DbPool>) -> Repositories {
    match db_pool {
        Some(pool) => postgres_repositories(pool),
        None => {
            warn!("no database configured; data lives in process memory only");
            Repositories::from_store(Arc::new(InMemoryStore::new()))
        }
    }
}

async fn build_cache(
    settings: &AppSettings,
    clock: Arc<dyn Clock>,
) -> io::Result<Arc<dyn KeyValueCache>> {
    let backend = settings.cache_backend().map_err(io::Error::other)?;
    match backend {
        CacheBackend::File => {
            let dir = settings.cache_dir();
            let cache = FileCache::open(&dir, clock).await.map_err(|e| {
                io::Error::other(format!("failed to open cache at {}: {e}", dir.display()))
            })?;
            info!(dir = %dir.display(), "using file cache");
            Ok(Arc::new(cache))
        }
        CacheBackend::Memory => {
            info!("using in-memory cache");
            Ok(Arc::new(MemoryCache::new(clock)))
        }
    }
}

/// Periodically drop expired cache entries so the file cache does not grow
/// without bound.
fn spawn_cache_sweeper(cache: Arc<dyn KeyValueCache>, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match cache.clean_expired().await {
                Ok(0) => {}
                Ok(removed) => debug!(removed, "expired cache entries swept"),
                Err(error) => warn!(%error, "cache sweep failed"),
            }
        }
    });
}

/// Create or promote the configured administrator account.
async fn ensure_bootstrap_admin(settings: &AppSettings, services: &Services) -> io::Result<()> {
    let Some(admin) = settings.bootstrap_admin().map_err(io::Error::other)? else {
        return Ok(());
    };
    let registration = Registration::try_new(&admin.nickname, &admin.email, &admin.password)
        .map_err(|e| io::Error::other(format!("invalid bootstrap admin: {e}")))?;
    services
        .users
        .ensure_admin(registration)
        .await
        .map_err(|e| io::Error::other(format!("bootstrap admin failed: {e}")))?;
    Ok(())
}

/// Assemble services, cache and login throttle for the HTTP handlers.
///
/// # Errors
/// Returns [`io::Error`] when the cache cannot be opened or the bootstrap
/// administrator cannot be created.
pub async fn build_http_state(
    settings: &AppSettings,
    db_pool: Option<&DbPool>,
) -> io::Result<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let repos = build_repositories(db_pool);
    let cache = build_cache(settings, clock.clone()).await?;
    spawn_cache_sweeper(cache.clone(), settings.cache_sweep_interval());
    let services = Services::new(&repos, cache, clock.clone(), settings.cache_ttls());
    ensure_bootstrap_admin(settings, &services).await?;
    let throttle = LoginThrottle::new(
        settings.login_attempt_limit(),
        settings.login_window(),
        clock.clone(),
    );
    Ok(HttpState::new(services, Arc::new(throttle), clock))
}
