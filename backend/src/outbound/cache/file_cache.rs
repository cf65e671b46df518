//! Directory-backed `KeyValueCache`.
//!
//! Each entry lives in `<sha256(key)>.json` and records its own key and
//! expiry so prefix clears and sweeps can work from the files alone.
//! Writes land in a temporary sibling first and are renamed into place.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::{debug, warn};

use super::memory_cache::expiry;
use crate::domain::ports::{CacheError, CacheKey, KeyValueCache};

const EXTENSION: &str = "json";

#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    key: String,
    value: Value,
    expires_at: DateTime<Utc>,
}

pub struct FileCache {
    dir: PathBuf,
    clock: Arc<dyn Clock>,
}

fn io_error(path: &Path, error: &std::io::Error) -> CacheError {
    CacheError::backend(format!("{}: {error}", path.display()))
}

impl FileCache {
    /// Open a cache rooted at `dir`, creating the directory if needed.
    pub async fn open(dir: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Result<Self, CacheError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .await
            .map_err(|error| io_error(&dir, &error))?;
        Ok(Self { dir, clock })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let digest = hex::encode(Sha256::digest(key.as_bytes()));
        self.dir.join(format!("{digest}.{EXTENSION}"))
    }

    /// Read one entry file. Missing files are `None`; unreadable ones are
    /// removed and also reported as `None`.
    async fn read_entry(&self, path: &Path) -> Result<Option<StoredEntry>, CacheError> {
        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(io_error(path, &error)),
        };
        match serde_json::from_slice(&bytes) {
            Ok(entry) => Ok(Some(entry)),
            Err(error) => {
                warn!(path = %path.display(), %error, "removing corrupt cache file");
                self.remove(path).await?;
                Ok(None)
            }
        }
    }

    async fn remove(&self, path: &Path) -> Result<bool, CacheError> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(false),
            Err(error) => Err(io_error(path, &error)),
        }
    }

    /// Every entry file in the directory, skipping temporaries.
    async fn entry_paths(&self) -> Result<Vec<PathBuf>, CacheError> {
        let mut reader = fs::read_dir(&self.dir)
            .await
            .map_err(|error| io_error(&self.dir, &error))?;
        let mut paths = Vec::new();
        while let Some(item) = reader
            .next_entry()
            .await
            .map_err(|error| io_error(&self.dir, &error))?
        {
            let path = item.path();
            if path.extension().is_some_and(|ext| ext == EXTENSION) {
                paths.push(path);
            }
        }
        Ok(paths)
    }

    /// Remove entries matching `predicate`, returning how many went.
    async fn sweep<F>(&self, predicate: F) -> Result<usize, CacheError>
    where
        F: Fn(&StoredEntry) -> bool + Send + Sync,
    {
        let mut removed = 0;
        for path in self.entry_paths().await? {
            let Some(entry) = self.read_entry(&path).await? else {
                continue;
            };
            if predicate(&entry) && self.remove(&path).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[async_trait]
impl KeyValueCache for FileCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<Value>, CacheError> {
        let path = self.path_for(key.as_str());
        let Some(entry) = self.read_entry(&path).await? else {
            return Ok(None);
        };
        if entry.key != key.as_str() {
            warn!(key = %key, "cache file digest collision; treating as miss");
            return Ok(None);
        }
        if entry.expires_at <= self.clock.utc() {
            self.remove(&path).await?;
            return Ok(None);
        }
        Ok(Some(entry.value))
    }

    async fn set(&self, key: &CacheKey, value: &Value, ttl: Duration) -> Result<(), CacheError> {
        let entry = StoredEntry {
            key: key.as_str().to_owned(),
            value: value.clone(),
            expires_at: expiry(self.clock.utc(), ttl)?,
        };
        let bytes = serde_json::to_vec(&entry)
            .map_err(|error| CacheError::serialization(error.to_string()))?;
        let path = self.path_for(key.as_str());
        let tmp = path.with_extension(format!("{EXTENSION}.{}.tmp", uuid::Uuid::new_v4()));
        fs::write(&tmp, &bytes)
            .await
            .map_err(|error| io_error(&tmp, &error))?;
        if let Err(error) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(io_error(&path, &error));
        }
        debug!(key = %key, "cache entry written");
        Ok(())
    }

    async fn delete(&self, key: &CacheKey) -> Result<bool, CacheError> {
        self.remove(&self.path_for(key.as_str())).await
    }

    async fn clear(&self, prefix: &str) -> Result<usize, CacheError> {
        self.sweep(|entry| entry.key.starts_with(prefix)).await
    }

    async fn clean_expired(&self) -> Result<usize, CacheError> {
        let now = self.clock.utc();
        self.sweep(|entry| entry.expires_at <= now).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MutableClock, sample_now};
    use rstest::{fixture, rstest};
    use serde_json::json;
    use tempfile::TempDir;

    struct Harness {
        _dir: TempDir,
        root: PathBuf,
        clock: Arc<MutableClock>,
        cache: FileCache,
    }

    #[fixture]
    async fn harness() -> Harness {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().join("cache");
        let clock = Arc::new(MutableClock::new(sample_now()));
        let cache = FileCache::open(&root, clock.clone()).await.expect("open");
        Harness {
            _dir: dir,
            root,
            clock,
            cache,
        }
    }

    fn key(raw: &str) -> CacheKey {
        CacheKey::new(raw).expect("valid key")
    }

    #[rstest]
    #[tokio::test]
    async fn entries_survive_reopen_until_expiry(#[future] harness: Harness) {
        let h = harness.await;
        h.cache
            .set(&key("leaderboard:full"), &json!([1, 2]), Duration::from_secs(60))
            .await
            .expect("set");
        let reopened = FileCache::open(&h.root, h.clock.clone()).await.expect("reopen");
        assert_eq!(
            reopened.get(&key("leaderboard:full")).await.expect("get"),
            Some(json!([1, 2]))
        );
        h.clock.advance_seconds(61);
        assert_eq!(reopened.get(&key("leaderboard:full")).await.expect("get"), None);
    }

    #[rstest]
    #[tokio::test]
    async fn files_are_named_by_digest(#[future] harness: Harness) {
        let h = harness.await;
        h.cache
            .set(&key("stats:dashboard"), &json!({}), Duration::from_secs(5))
            .await
            .expect("set");
        let expected = hex::encode(Sha256::digest(b"stats:dashboard"));
        assert!(h.root.join(format!("{expected}.json")).exists());
    }

    #[rstest]
    #[tokio::test]
    async fn clear_and_sweep_count_removed_files(#[future] harness: Harness) {
        let h = harness.await;
        h.cache
            .set(&key("leaderboard:full"), &json!(1), Duration::from_secs(10))
            .await
            .expect("set");
        h.cache
            .set(&key("stats:dashboard"), &json!(2), Duration::from_secs(10))
            .await
            .expect("set");
        h.cache
            .set(&key("stats:other"), &json!(3), Duration::from_secs(1000))
            .await
            .expect("set");
        assert_eq!(h.cache.clear("leaderboard:").await.expect("clear"), 1);
        h.clock.advance_seconds(11);
        assert_eq!(h.cache.clean_expired().await.expect("sweep"), 1);
        assert_eq!(h.cache.get(&key("stats:other")).await.expect("get"), Some(json!(3)));
    }

    #[rstest]
    #[tokio::test]
    async fn corrupt_files_read_as_miss(#[future] harness: Harness) {
        let h = harness.await;
        let path = h.cache.path_for("stats:dashboard");
        fs::write(&path, b"not json").await.expect("write");
        assert_eq!(h.cache.get(&key("stats:dashboard")).await.expect("get"), None);
        assert!(!path.exists());
    }
}
