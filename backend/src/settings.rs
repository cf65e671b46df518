//! Application configuration loaded via OrthoConfig.
//!
//! Every value may come from the command line, a configuration file or a
//! `POINTSBOARD_*` environment variable. Missing values fall back to defaults
//! suitable for a local run without a database.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::CacheTtls;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_POOL_SIZE: u32 = 10;
const DEFAULT_CACHE_DIR: &str = "var/cache";
const DEFAULT_LEADERBOARD_TTL_SECS: u64 = 300;
const DEFAULT_STATS_TTL_SECS: u64 = 600;
const DEFAULT_CACHE_SWEEP_SECS: u64 = 300;
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";
const DEFAULT_LOGIN_ATTEMPTS: u32 = 5;
const DEFAULT_LOGIN_WINDOW_SECS: u64 = 900;

/// Where derived data (leaderboard, statistics) is cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    /// One JSON file per key under the cache directory.
    File,
    /// Process-local concurrent map.
    Memory,
}

/// Raised when a configured value cannot be interpreted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("invalid bind address '{value}'")]
    BindAddr { value: String },
    #[error("invalid cache backend '{value}'; expected file|memory")]
    CacheBackend { value: String },
    #[error("bootstrap admin needs nickname, email and password; missing {missing}")]
    IncompleteAdmin { missing: &'static str },
}

/// Server settings.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "POINTSBOARD")]
pub struct AppSettings {
    /// Socket address the HTTP server listens on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string. Without one the in-memory store is used.
    pub database_url: Option<String>,
    /// Maximum number of pooled database connections.
    pub pool_size: Option<u32>,
    /// `file` or `memory`.
    pub cache_backend: Option<String>,
    /// Directory used by the file cache.
    pub cache_dir: Option<PathBuf>,
    /// Lifetime of the cached leaderboard, in seconds.
    pub leaderboard_ttl_secs: Option<u64>,
    /// Lifetime of cached dashboard statistics, in seconds.
    pub stats_ttl_secs: Option<u64>,
    /// Interval between sweeps of expired cache entries, in seconds.
    pub cache_sweep_secs: Option<u64>,
    /// File holding the session signing key.
    pub session_key_file: Option<PathBuf>,
    /// Mark session cookies `Secure`.
    pub cookie_secure: Option<bool>,
    /// `Strict`, `Lax` or `None`.
    pub same_site: Option<String>,
    /// Fall back to a generated session key when the key file is missing.
    pub allow_ephemeral_session_key: Option<bool>,
    /// Failed logins allowed per client inside the window.
    pub login_attempt_limit: Option<u32>,
    /// Login throttling window, in seconds.
    pub login_window_secs: Option<u64>,
    /// Nickname of the administrator created at startup when absent.
    pub admin_nickname: Option<String>,
    /// Email of the bootstrap administrator.
    pub admin_email: Option<String>,
    /// Password of the bootstrap administrator.
    pub admin_password: Option<String>,
}

/// Credentials for the administrator ensured at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapAdmin {
    pub nickname: String,
    pub email: String,
    pub password: String,
}

impl AppSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|_| SettingsError::BindAddr {
            value: raw.to_owned(),
        })
    }

    pub fn pool_size(&self) -> u32 {
        self.pool_size.unwrap_or(DEFAULT_POOL_SIZE)
    }

    /// Configured cache backend; defaults to the file cache.
    pub fn cache_backend(&self) -> Result<CacheBackend, SettingsError> {
        match self.cache_backend.as_deref().map(str::trim) {
            None | Some("file") => Ok(CacheBackend::File),
            Some("memory") => Ok(CacheBackend::Memory),
            Some(other) => Err(SettingsError::CacheBackend {
                value: other.to_owned(),
            }),
        }
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR))
    }

    pub fn cache_ttls(&self) -> CacheTtls {
        CacheTtls {
            leaderboard: Duration::from_secs(
                self.leaderboard_ttl_secs
                    .unwrap_or(DEFAULT_LEADERBOARD_TTL_SECS),
            ),
            stats: Duration::from_secs(self.stats_ttl_secs.unwrap_or(DEFAULT_STATS_TTL_SECS)),
        }
    }

    /// Sweep interval for expired cache entries; never below one second.
    pub fn cache_sweep_interval(&self) -> Duration {
        Duration::from_secs(
            self.cache_sweep_secs
                .unwrap_or(DEFAULT_CACHE_SWEEP_SECS)
                .max(1),
        )
    }

    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE))
    }

    pub fn login_attempt_limit(&self) -> u32 {
        self.login_attempt_limit
            .unwrap_or(DEFAULT_LOGIN_ATTEMPTS)
            .max(1)
    }

    pub fn login_window(&self) -> Duration {
        Duration::from_secs(self.login_window_secs.unwrap_or(DEFAULT_LOGIN_WINDOW_SECS))
    }

    /// Bootstrap administrator, when any of its fields is configured.
    ///
    /// Partial configuration is an error rather than a silent skip.
    pub fn bootstrap_admin(&self) -> Result<Option<BootstrapAdmin>, SettingsError> {
        match (
            self.admin_nickname.as_deref(),
            self.admin_email.as_deref(),
            self.admin_password.as_deref(),
        ) {
            (None, None, None) => Ok(None),
            (Some(nickname), Some(email), Some(password)) => Ok(Some(BootstrapAdmin {
                nickname: nickname.to_owned(),
                email: email.to_owned(),
                password: password.to_owned(),
            })),
            (None, _, _) => Err(SettingsError::IncompleteAdmin {
                missing: "admin_nickname",
            }),
            (_, None, _) => Err(SettingsError::IncompleteAdmin {
                missing: "admin_email",
            }),
            (_, _, None) => Err(SettingsError::IncompleteAdmin {
                missing: "admin_password",
            }),
        }
    }
}
