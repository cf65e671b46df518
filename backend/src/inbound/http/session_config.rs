//! Session cookie configuration.
//!
//! Turns the session-related [`AppSettings`] into a signing key and cookie
//! attributes. Debug builds tolerate missing values with warnings; release
//! builds insist on explicit, safe toggles.

use std::path::{Path, PathBuf};

use actix_web::cookie::{Key, SameSite};
use sha2::{Digest, Sha256};
use tracing::warn;
use zeroize::Zeroize;

use crate::settings::AppSettings;

const SESSION_KEY_MIN_LEN: usize = 64;
const FINGERPRINT_BYTES: usize = 8;
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// Build mode for session configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate defaults and emit warnings for missing toggles.
    Debug,
    /// Release builds require explicit, valid session toggles.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pointsboard::inbound::http::session_config::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// assert_eq!(mode == BuildMode::Debug, cfg!(debug_assertions));
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Validated session cookie settings.
pub struct SessionSettings {
    /// Signing and encryption key for cookie sessions.
    pub key: Key,
    /// Whether session cookies are marked `Secure`.
    pub cookie_secure: bool,
    /// `SameSite` policy for session cookies.
    pub same_site: SameSite,
}

/// Errors raised while validating session configuration.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    /// A setting required in release builds is absent.
    #[error("missing required setting: {name}")]
    Missing { name: &'static str },
    /// A setting is present but holds an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// Reading the session key file failed.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The key file is too short for release builds.
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    /// `SameSite=None` requires secure cookies in release builds.
    #[error("same_site=None requires cookie_secure=true")]
    InsecureSameSiteNone,
    /// Release builds must not fall back to a generated key.
    #[error("allow_ephemeral_session_key must be false in release builds")]
    EphemeralNotAllowed,
}

/// Build session settings for the given build mode.
///
/// # Examples
///
/// ```rust
/// use pointsboard::inbound::http::session_config::{BuildMode, session_settings};
/// use pointsboard::settings::AppSettings;
///
/// let settings = AppSettings {
///     session_key_file: Some("/nonexistent/session_key".into()),
///     ..AppSettings::default()
/// };
/// let session = session_settings(&settings, BuildMode::Debug).expect("debug tolerates gaps");
/// assert!(session.cookie_secure);
/// ```
pub fn session_settings(
    settings: &AppSettings,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let cookie_secure = cookie_secure(settings, mode)?;
    let same_site = same_site(settings, mode, cookie_secure)?;
    let allow_ephemeral = allow_ephemeral(settings, mode)?;
    let key = session_key(&settings.session_key_file(), mode, allow_ephemeral)?;
    Ok(SessionSettings {
        key,
        cookie_secure,
        same_site,
    })
}

/// Truncated SHA-256 fingerprint of the signing key, safe to log.
///
/// # Examples
///
/// ```rust
/// use actix_web::cookie::Key;
/// use pointsboard::inbound::http::session_config::key_fingerprint;
///
/// let fp = key_fingerprint(&Key::generate());
/// assert_eq!(fp.len(), 16);
/// ```
#[must_use]
pub fn key_fingerprint(key: &Key) -> String {
    let digest = Sha256::digest(key.signing());
    hex::encode(&digest[..FINGERPRINT_BYTES])
}

fn cookie_secure(settings: &AppSettings, mode: BuildMode) -> Result<bool, SessionConfigError> {
    match settings.cookie_secure {
        Some(flag) => Ok(flag),
        None if mode.is_debug() => {
            warn!("cookie_secure not set; defaulting to secure");
            Ok(true)
        }
        None => Err(SessionConfigError::Missing {
            name: "cookie_secure",
        }),
    }
}

fn same_site(
    settings: &AppSettings,
    mode: BuildMode,
    cookie_secure: bool,
) -> Result<SameSite, SessionConfigError> {
    let default = if mode.is_debug() {
        SameSite::Lax
    } else {
        SameSite::Strict
    };
    let Some(value) = settings.same_site.as_deref() else {
        if mode.is_debug() {
            return Ok(default);
        }
        return Err(SessionConfigError::Missing { name: "same_site" });
    };
    match value.to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" if cookie_secure => Ok(SameSite::None),
        "none" if mode.is_debug() => {
            warn!("same_site=None without secure cookies; browsers may reject the cookie");
            Ok(SameSite::None)
        }
        "none" => Err(SessionConfigError::InsecureSameSiteNone),
        _ if mode.is_debug() => {
            warn!(%value, "invalid same_site, using default");
            Ok(default)
        }
        _ => Err(SessionConfigError::Invalid {
            name: "same_site",
            value: value.to_owned(),
            expected: SAMESITE_EXPECTED,
        }),
    }
}

fn allow_ephemeral(settings: &AppSettings, mode: BuildMode) -> Result<bool, SessionConfigError> {
    match settings.allow_ephemeral_session_key {
        Some(true) if !mode.is_debug() => Err(SessionConfigError::EphemeralNotAllowed),
        Some(flag) => Ok(flag),
        None => Ok(false),
    }
}

fn session_key(
    path: &Path,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Key, SessionConfigError> {
    match std::fs::read(path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            if mode == BuildMode::Release && length < SESSION_KEY_MIN_LEN {
                bytes.zeroize();
                return Err(SessionConfigError::KeyTooShort {
                    path: path.to_path_buf(),
                    length,
                    min_len: SESSION_KEY_MIN_LEN,
                });
            }
            let key = Key::derive_from(&bytes);
            bytes.zeroize();
            Ok(key)
        }
        Err(error) if mode.is_debug() || allow_ephemeral => {
            warn!(path = %path.display(), %error, "using temporary session key (dev only)");
            Ok(Key::generate())
        }
        Err(source) => Err(SessionConfigError::KeyRead {
            path: path.to_path_buf(),
            source,
        }),
    }
}
