//! In-process `KeyValueCache` backed by a concurrent map.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use mockable::Clock;
use serde_json::Value;

use crate::domain::ports::{CacheError, CacheKey, KeyValueCache};

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: DateTime<Utc>,
}

pub struct MemoryCache {
    entries: DashMap<String, Entry>,
    clock: Arc<dyn Clock>,
}

impl MemoryCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }
}

pub(super) fn expiry(now: DateTime<Utc>, ttl: Duration) -> Result<DateTime<Utc>, CacheError> {
    TimeDelta::from_std(ttl)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
        .ok_or_else(|| CacheError::backend(format!("ttl out of range: {ttl:?}")))
}

#[async_trait]
impl KeyValueCache for MemoryCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<Value>, CacheError> {
        let now = self.clock.utc();
        let live = self
            .entries
            .get(key.as_str())
            .map(|entry| (entry.expires_at > now).then(|| entry.value.clone()));
        match live {
            Some(Some(value)) => Ok(Some(value)),
            Some(None) => {
                self.entries
                    .remove_if(key.as_str(), |_, entry| entry.expires_at <= now);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &CacheKey, value: &Value, ttl: Duration) -> Result<(), CacheError> {
        let expires_at = expiry(self.clock.utc(), ttl)?;
        self.entries.insert(
            key.as_str().to_owned(),
            Entry {
                value: value.clone(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &CacheKey) -> Result<bool, CacheError> {
        Ok(self.entries.remove(key.as_str()).is_some())
    }

    async fn clear(&self, prefix: &str) -> Result<usize, CacheError> {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.starts_with(prefix));
        Ok(before.saturating_sub(self.entries.len()))
    }

    async fn clean_expired(&self) -> Result<usize, CacheError> {
        let now = self.clock.utc();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        Ok(before.saturating_sub(self.entries.len()))
    }
}
