//! Browser-session style cache: namespaced keys in a string key/value store,
//! each value wrapped with its write time and absolute expiry.

use blastari_core::CoreError;
use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

pub const KEY_PREFIX: &str = "blastari_";

pub fn default_ttl() -> Duration {
    Duration::hours(24)
}

/// Entries written longer ago than this are dropped by the start-up cleanup.
pub fn stale_after() -> Duration {
    Duration::minutes(30)
}

/// A string key/value store with cookies, shaped like browser session
/// storage.
pub trait SessionStorage {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&mut self, key: &str, value: String) -> Result<(), CoreError>;
    fn remove_item(&mut self, key: &str) -> Result<(), CoreError>;
    fn keys(&self) -> Vec<String>;
    fn clear_cookies(&mut self) -> Result<(), CoreError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    items: BTreeMap<String, String>,
    cookies: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_cookie(&mut self, name: &str, value: &str) {
        self.cookies.insert(name.to_string(), value.to_string());
    }

    pub fn cookie_count(&self) -> usize {
        self.cookies.len()
    }
}

impl SessionStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: String) -> Result<(), CoreError> {
        self.items.insert(key.to_string(), value);
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), CoreError> {
        self.items.remove(key);
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.items.keys().cloned().collect()
    }

    fn clear_cookies(&mut self) -> Result<(), CoreError> {
        self.cookies.clear();
        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StorageFile {
    items: BTreeMap<String, String>,
    cookies: BTreeMap<String, String>,
}

/// Storage persisted as one JSON file, rewritten on every change.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    data: StorageFile,
}

impl FileStorage {
    /// Opens `path`, starting empty when the file is missing or unreadable.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let data = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Discarding unreadable session file {}: {}", path.display(), e);
                StorageFile::default()
            }),
            Err(_) => StorageFile::default(),
        };
        Self { path, data }
    }

    pub fn set_cookie(&mut self, name: &str, value: &str) -> Result<(), CoreError> {
        self.data.cookies.insert(name.to_string(), value.to_string());
        self.flush()
    }

    pub fn cookie_count(&self) -> usize {
        self.data.cookies.len()
    }

    fn flush(&self) -> Result<(), CoreError> {
        let raw = serde_json::to_string_pretty(&self.data)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl SessionStorage for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.data.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: String) -> Result<(), CoreError> {
        self.data.items.insert(key.to_string(), value);
        self.flush()
    }

    fn remove_item(&mut self, key: &str) -> Result<(), CoreError> {
        if self.data.items.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.data.items.keys().cloned().collect()
    }

    fn clear_cookies(&mut self) -> Result<(), CoreError> {
        self.data.cookies.clear();
        self.flush()
    }
}

/// Stored form of a cached value. Times are Unix milliseconds.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CacheEntry {
    value: serde_json::Value,
    timestamp: i64,
    expires_at: i64,
}

fn millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

/// Set once the emergency cleanup has run in this process.
static PROCESS_CLEANUP: AtomicBool = AtomicBool::new(false);

/// Typed cache over a [`SessionStorage`]. The first access through any cache
/// in the process runs the emergency cleanup; later caches skip it.
#[derive(Debug)]
pub struct SessionCache<S: SessionStorage> {
    storage: S,
    ttl: Duration,
    cleanup: &'static AtomicBool,
}

impl<S: SessionStorage> SessionCache<S> {
    pub fn new(storage: S) -> Self {
        Self::with_ttl(storage, default_ttl())
    }

    pub fn with_ttl(storage: S, ttl: Duration) -> Self {
        Self::with_cleanup_flag(storage, ttl, &PROCESS_CLEANUP)
    }

    /// Uses `flag` instead of the process-wide one to decide whether the
    /// cleanup has already run. Caches sharing a flag sweep once between them.
    pub fn with_cleanup_flag(storage: S, ttl: Duration, flag: &'static AtomicBool) -> Self {
        Self {
            storage,
            ttl,
            cleanup: flag,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn namespaced(key: &str) -> String {
        format!("{KEY_PREFIX}{key}")
    }

    fn ensure_cleaned(&mut self) {
        if !self.cleanup.swap(true, Ordering::SeqCst) {
            if let Err(e) = self.emergency_cleanup() {
                warn!("Session cleanup failed: {}", e);
            }
        }
    }

    pub fn set<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), CoreError> {
        let ttl = self.ttl;
        self.set_with_ttl(key, value, ttl)
    }

    pub fn set_with_ttl<T: Serialize>(
        &mut self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), CoreError> {
        self.ensure_cleaned();
        let now = Utc::now();
        let entry = CacheEntry {
            value: serde_json::to_value(value)?,
            timestamp: millis(now),
            expires_at: millis(now + ttl),
        };
        self.storage
            .set_item(&Self::namespaced(key), serde_json::to_string(&entry)?)
    }

    /// The cached value, or `None` when absent, expired or unreadable. Expired
    /// and unreadable entries are removed.
    pub fn get<T: DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        self.ensure_cleaned();
        let full_key = Self::namespaced(key);
        let raw = self.storage.get_item(&full_key)?;

        let value = match serde_json::from_str::<CacheEntry>(&raw) {
            Ok(entry) if entry.expires_at > millis(Utc::now()) => {
                serde_json::from_value(entry.value).ok()
            }
            Ok(_) => {
                debug!("Session entry {} expired", full_key);
                None
            }
            Err(_) => None,
        };
        if value.is_none() {
            if let Err(e) = self.storage.remove_item(&full_key) {
                warn!("Could not remove session entry {}: {}", full_key, e);
            }
        }
        value
    }

    pub fn remove(&mut self, key: &str) -> Result<(), CoreError> {
        self.ensure_cleaned();
        self.storage.remove_item(&Self::namespaced(key))
    }

    /// Removes every namespaced entry; other keys are left alone.
    pub fn clear(&mut self) -> Result<(), CoreError> {
        self.ensure_cleaned();
        for key in self.storage.keys() {
            if key.starts_with(KEY_PREFIX) {
                self.storage.remove_item(&key)?;
            }
        }
        Ok(())
    }

    /// Drops namespaced entries written more than [`stale_after`] ago or that
    /// cannot be read, then clears cookies. Returns the number removed.
    pub fn emergency_cleanup(&mut self) -> Result<usize, CoreError> {
        let cutoff = millis(Utc::now() - stale_after());
        let mut removed = 0;

        for key in self.storage.keys() {
            if !key.starts_with(KEY_PREFIX) {
                continue;
            }
            let stale = match self.storage.get_item(&key) {
                Some(raw) => match serde_json::from_str::<CacheEntry>(&raw) {
                    Ok(entry) => entry.timestamp < cutoff,
                    Err(_) => true,
                },
                None => false,
            };
            if stale {
                self.storage.remove_item(&key)?;
                removed += 1;
            }
        }
        self.storage.clear_cookies()?;

        if removed > 0 {
            info!("Session cleanup removed {} entries", removed);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        tags: Vec<String>,
        score: f64,
    }

    fn sample() -> Sample {
        Sample {
            name: "example.com".to_string(),
            tags: vec!["saas".to_string(), "b2b".to_string()],
            score: 0.75,
        }
    }

    fn raw_entry(written: DateTime<Utc>, ttl: Duration) -> String {
        json!({
            "value": "old",
            "timestamp": written.timestamp_millis(),
            "expiresAt": (written + ttl).timestamp_millis(),
        })
        .to_string()
    }

    #[test]
    fn test_round_trip() {
        let mut cache = SessionCache::new(MemoryStorage::new());
        cache.set("analysis", &sample()).unwrap();

        assert_eq!(cache.get::<Sample>("analysis"), Some(sample()));
        assert!(cache
            .storage()
            .get_item("blastari_analysis")
            .unwrap()
            .contains("expiresAt"));
    }

    #[test]
    fn test_expired_entry_is_removed_on_read() {
        let mut cache = SessionCache::new(MemoryStorage::new());
        cache
            .set_with_ttl("analysis", &sample(), Duration::seconds(-1))
            .unwrap();

        assert_eq!(cache.get::<Sample>("analysis"), None);
        assert!(cache.storage().get_item("blastari_analysis").is_none());
    }

    #[test]
    fn test_first_access_runs_cleanup_once() {
        let now = Utc::now();
        let mut storage = MemoryStorage::new();
        storage
            .set_item("blastari_stale", raw_entry(now - Duration::hours(1), default_ttl()))
            .unwrap();
        storage
            .set_item("blastari_recent", raw_entry(now - Duration::minutes(5), default_ttl()))
            .unwrap();
        storage.set_item("blastari_garbage", "{not json".to_string()).unwrap();
        storage
            .set_item("other_app", raw_entry(now - Duration::hours(2), default_ttl()))
            .unwrap();
        storage.set_cookie("sid", "abc");

        static FLAG: AtomicBool = AtomicBool::new(false);
        let mut cache = SessionCache::with_cleanup_flag(storage, default_ttl(), &FLAG);
        assert_eq!(cache.get::<String>("recent"), Some("old".to_string()));

        let keys = cache.storage().keys();
        assert_eq!(keys, vec!["blastari_recent".to_string(), "other_app".to_string()]);
        assert_eq!(cache.storage().cookie_count(), 0);

        // Later writes are not swept again.
        cache.storage.set_cookie("sid", "def");
        cache.set("fresh", &1).unwrap();
        assert_eq!(cache.storage().cookie_count(), 1);
    }

    #[test]
    fn test_second_cache_in_process_skips_cleanup() {
        static FLAG: AtomicBool = AtomicBool::new(false);
        let stale = raw_entry(Utc::now() - Duration::hours(1), default_ttl());

        let mut first_storage = MemoryStorage::new();
        first_storage.set_cookie("sid", "abc");
        let mut first = SessionCache::with_cleanup_flag(first_storage, default_ttl(), &FLAG);
        assert_eq!(first.get::<u32>("anything"), None);
        assert_eq!(first.storage().cookie_count(), 0);

        let mut second_storage = MemoryStorage::new();
        second_storage.set_cookie("sid", "def");
        second_storage.set_item("blastari_old", stale).unwrap();
        let mut second = SessionCache::with_cleanup_flag(second_storage, default_ttl(), &FLAG);
        assert_eq!(second.get::<u32>("anything"), None);

        assert_eq!(second.storage().cookie_count(), 1);
        assert!(second.storage().get_item("blastari_old").is_some());
    }

    #[test]
    fn test_clear_only_touches_namespaced_keys() {
        let mut storage = MemoryStorage::new();
        storage.set_item("theme", "dark".to_string()).unwrap();
        let mut cache = SessionCache::new(storage);
        cache.set("a", &1).unwrap();
        cache.set("b", &2).unwrap();

        cache.clear().unwrap();
        assert_eq!(cache.storage().keys(), vec!["theme".to_string()]);
    }

    #[test]
    fn test_wrong_type_reads_as_miss() {
        let mut cache = SessionCache::new(MemoryStorage::new());
        cache.set("count", &"not a number").unwrap();
        assert_eq!(cache.get::<u32>("count"), None);
        assert!(cache.storage().get_item("blastari_count").is_none());
    }

    #[test]
    fn test_file_storage_persists() {
        let path = std::env::temp_dir().join(format!("blastari_session_{}.json", uuid::Uuid::new_v4()));
        {
            let mut cache = SessionCache::new(FileStorage::open(&path));
            cache.set("analysis", &sample()).unwrap();
        }

        let mut cache = SessionCache::new(FileStorage::open(&path));
        assert_eq!(cache.get::<Sample>("analysis"), Some(sample()));
        let _ = fs::remove_file(&path);
    }
}
