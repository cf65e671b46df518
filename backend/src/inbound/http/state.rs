//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on domain services and remain testable against the in-memory store.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::Services;
use crate::inbound::http::throttle::LoginThrottle;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub services: Services,
    pub login_throttle: Arc<LoginThrottle>,
    pub clock: Arc<dyn Clock>,
}

impl HttpState {
    /// Construct state from the domain services, login throttle and clock.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    /// use std::time::Duration;
    ///
    /// use mockable::DefaultClock;
    /// use pointsboard::domain::ports::Repositories;
    /// use pointsboard::domain::{CacheTtls, Services};
    /// use pointsboard::inbound::http::state::HttpState;
    /// use pointsboard::inbound::http::throttle::LoginThrottle;
    /// use pointsboard::outbound::cache::MemoryCache;
    /// use pointsboard::outbound::memory::InMemoryStore;
    ///
    /// let clock = Arc::new(DefaultClock);
    /// let repos = Repositories::from_store(Arc::new(InMemoryStore::new()));
    /// let cache = Arc::new(MemoryCache::new(clock.clone()));
    /// let services = Services::new(&repos, cache, clock.clone(), CacheTtls::default());
    /// let throttle = LoginThrottle::new(5, Duration::from_secs(900), clock.clone());
    /// let state = HttpState::new(services, Arc::new(throttle), clock);
    /// ```
    #[must_use]
    pub fn new(
        services: Services,
        login_throttle: Arc<LoginThrottle>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            services,
            login_throttle,
            clock,
        }
    }
}
