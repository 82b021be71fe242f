//! In-memory cache - used when Redis is not configured and in tests.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use yatube_core::ports::{Cache, CacheError};

struct CacheEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|exp| now < exp)
    }
}

/// In-memory cache over a HashMap behind an async RwLock.
///
/// Expired entries are dropped lazily on read and on every write.
/// Data is lost on process restart and not shared between instances.
pub struct InMemoryCache {
    store: RwLock<HashMap<String, CacheEntry>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
        }
    }

    /// Number of live entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let store = self.store.read().await;
        store.values().filter(|e| e.is_live(now)).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        {
            let store = self.store.read().await;
            match store.get(key) {
                Some(entry) if entry.is_live(now) => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        let mut store = self.store.write().await;
        if store.get(key).is_some_and(|e| !e.is_live(now)) {
            store.remove(key);
        }
        None
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        let now = Instant::now();
        let mut store = self.store.write().await;
        store.retain(|_, entry| entry.is_live(now));
        store.insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at: ttl.map(|d| now + d),
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = InMemoryCache::new();
        cache.set("index:anon:/", "<html>", None).await.unwrap();
        assert_eq!(cache.get("index:anon:/").await, Some("<html>".to_string()));
        assert_eq!(cache.get("index:anon:/?page=2").await, None);
    }

    #[tokio::test]
    async fn test_entry_expires() {
        let cache = InMemoryCache::new();
        cache
            .set("key", "value", Some(Duration::from_millis(50)))
            .await
            .unwrap();
        assert_eq!(cache.get("key").await, Some("value".to_string()));

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(cache.get("key").await, None);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_overwrite_resets_value() {
        let cache = InMemoryCache::new();
        cache.set("key", "old", None).await.unwrap();
        cache.set("key", "new", None).await.unwrap();
        assert_eq!(cache.get("key").await, Some("new".to_string()));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_write_drops_expired_entries() {
        let cache = InMemoryCache::new();
        cache
            .set("stale", "1", Some(Duration::from_millis(20)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;

        cache.set("fresh", "2", None).await.unwrap();
        assert_eq!(cache.store.read().await.len(), 1);
        assert_eq!(cache.get("fresh").await, Some("2".to_string()));
    }
}
