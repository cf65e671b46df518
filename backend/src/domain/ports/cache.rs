//! Key/value cache port for derived data such as the leaderboard.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use super::define_port_error;

/// Prefix shared by every leaderboard entry.
pub const LEADERBOARD_PREFIX: &str = "leaderboard:";
/// Prefix shared by every statistics entry.
pub const STATS_PREFIX: &str = "stats:";
/// Prefix of the per-prefix invalidation markers.
const GENERATION_PREFIX: &str = "generation:";
/// Lifetime of an invalidation marker. Longer than any entry it guards.
const GENERATION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Validated cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Construct a key; it must be non-empty and carry no surrounding
    /// whitespace.
    ///
    /// # Examples
    /// ```
    /// use pointsboard::domain::ports::CacheKey;
    ///
    /// let key = CacheKey::new("leaderboard:full").expect("valid key");
    /// assert_eq!(key.as_str(), "leaderboard:full");
    /// ```
    pub fn new(value: impl Into<String>) -> Result<Self, CacheKeyValidationError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(CacheKeyValidationError::Empty);
        }
        if raw.trim() != raw {
            return Err(CacheKeyValidationError::ContainsWhitespace);
        }
        Ok(Self(raw))
    }

    /// Key for a fixed, known-good name. Used for the constants below.
    fn fixed(value: &'static str) -> Self {
        Self(value.to_owned())
    }

    /// Full leaderboard ordering.
    #[must_use]
    pub fn leaderboard_full() -> Self {
        Self::fixed("leaderboard:full")
    }

    /// Dashboard statistics.
    #[must_use]
    pub fn stats_dashboard() -> Self {
        Self::fixed("stats:dashboard")
    }

    /// Invalidation marker for every entry under `prefix`.
    fn generation(prefix: &str) -> Self {
        Self(format!("{GENERATION_PREFIX}{prefix}"))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Validation errors returned when constructing [`CacheKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheKeyValidationError {
    #[error("cache key must not be empty")]
    Empty,
    #[error("cache key must not contain surrounding whitespace")]
    ContainsWhitespace,
}

define_port_error! {
    /// Errors surfaced by cache adapters.
    pub enum CacheError {
        /// Storage backing the cache failed.
        Backend { message: String } => "cache backend failure: {message}",
        /// Stored content could not be encoded or decoded.
        Serialization { message: String } => "cache serialisation failed: {message}",
    }
}

/// Key/value store with per-entry time-to-live.
///
/// An absent, expired or unreadable entry is a miss.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueCache: Send + Sync {
    /// Read a live entry.
    async fn get(&self, key: &CacheKey) -> Result<Option<Value>, CacheError>;

    /// Store `value` for `ttl`, replacing any previous entry.
    async fn set(&self, key: &CacheKey, value: &Value, ttl: Duration) -> Result<(), CacheError>;

    /// Remove an entry, reporting whether one existed.
    async fn delete(&self, key: &CacheKey) -> Result<bool, CacheError>;

    /// Remove every entry whose key starts with `prefix`.
    async fn clear(&self, prefix: &str) -> Result<usize, CacheError>;

    /// Remove every expired entry.
    async fn clean_expired(&self) -> Result<usize, CacheError>;
}

/// Read and decode a cached value. Failures are logged and treated as a
/// miss so a broken cache never fails the request.
pub async fn read_cached<T: DeserializeOwned>(
    cache: &dyn KeyValueCache,
    key: &CacheKey,
) -> Option<T> {
    match cache.get(key).await {
        Ok(Some(value)) => match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(error) => {
                tracing::warn!(key = %key, %error, "discarding undecodable cache entry");
                None
            }
        },
        Ok(None) => None,
        Err(error) => {
            tracing::warn!(key = %key, %error, "cache read failed");
            None
        }
    }
}

/// Encode and store a value, logging failures.
pub async fn write_cached<T: Serialize>(
    cache: &dyn KeyValueCache,
    key: &CacheKey,
    value: &T,
    ttl: Duration,
) {
    let encoded = match serde_json::to_value(value) {
        Ok(encoded) => encoded,
        Err(error) => {
            tracing::warn!(key = %key, %error, "cache value could not be encoded");
            return;
        }
    };
    if let Err(error) = cache.set(key, &encoded, ttl).await {
        tracing::warn!(key = %key, %error, "cache write failed");
    }
}

/// Current invalidation marker for `prefix`; `None` when it cannot be read.
async fn generation(cache: &dyn KeyValueCache, prefix: &str) -> Option<Option<Value>> {
    match cache.get(&CacheKey::generation(prefix)).await {
        Ok(marker) => Some(marker),
        Err(error) => {
            tracing::warn!(prefix, %error, "cache generation read failed");
            None
        }
    }
}

/// Serve `key` from the cache, or compute it and cache the result.
///
/// The result is only kept if no [`invalidate`] of `prefix` ran while it was
/// being computed. A value computed from data that changed underneath it is
/// still returned to this caller but never outlives the request.
pub async fn cached_or_compute<T, E, F, Fut>(
    cache: &dyn KeyValueCache,
    prefix: &str,
    key: &CacheKey,
    ttl: Duration,
    compute: F,
) -> Result<T, E>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let seen = generation(cache, prefix).await;
    if let Some(cached) = read_cached(cache, key).await {
        return Ok(cached);
    }
    let value = compute().await?;
    let Some(seen) = seen else {
        return Ok(value);
    };
    if generation(cache, prefix).await.as_ref() != Some(&seen) {
        tracing::debug!(key = %key, "skipping cache write after invalidation");
        return Ok(value);
    }
    write_cached(cache, key, &value, ttl).await;
    if generation(cache, prefix).await.as_ref() != Some(&seen) {
        if let Err(error) = cache.delete(key).await {
            tracing::warn!(key = %key, %error, "stale cache entry could not be dropped");
        }
    }
    Ok(value)
}

/// Drop every entry under the given prefixes, logging failures.
///
/// Each prefix's generation marker moves first so computations already in
/// flight do not store what they read before the change.
pub async fn invalidate(cache: &dyn KeyValueCache, prefixes: &[&str]) {
    for prefix in prefixes {
        let marker = Value::String(uuid::Uuid::new_v4().to_string());
        if let Err(error) = cache
            .set(&CacheKey::generation(prefix), &marker, GENERATION_TTL)
            .await
        {
            tracing::warn!(prefix, %error, "cache generation bump failed");
        }
        match cache.clear(prefix).await {
            Ok(removed) => tracing::debug!(prefix, removed, "cache prefix invalidated"),
            Err(error) => tracing::warn!(prefix, %error, "cache invalidation failed"),
        }
    }
}
