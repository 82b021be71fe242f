//! Redis cache with a key namespace and millisecond expiry.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use yatube_core::ports::{Cache, CacheError};

/// Redis connection configuration.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis URL (e.g., redis://localhost:6379)
    pub url: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Prefix put in front of every key.
    pub key_prefix: String,
    /// Whether to fall back to the in-memory cache if Redis is unavailable
    pub fallback_to_memory: bool,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            connect_timeout: Duration::from_secs(5),
            key_prefix: "yatube:".to_string(),
            fallback_to_memory: true,
        }
    }
}

impl RedisConfig {
    /// Load configuration from environment variables. `None` when `REDIS_URL` is unset.
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("REDIS_URL").ok()?;
        let defaults = Self::default();
        Some(Self {
            url,
            connect_timeout: std::env::var("REDIS_CONNECT_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.connect_timeout),
            key_prefix: std::env::var("REDIS_KEY_PREFIX").unwrap_or(defaults.key_prefix),
            fallback_to_memory: std::env::var("REDIS_FALLBACK_TO_MEMORY")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.fallback_to_memory),
        })
    }
}

/// Redis-backed cache.
///
/// Uses a connection manager for automatic reconnection.
pub struct RedisCache {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisCache {
    pub async fn new(config: &RedisConfig) -> Result<Self, CacheError> {
        let client =
            Client::open(config.url.as_str()).map_err(|e| CacheError::Connection(e.to_string()))?;

        let conn = tokio::time::timeout(config.connect_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| CacheError::Connection("Connection timed out".to_string()))?
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        tracing::info!(url = %config.url, prefix = %config.key_prefix, "Connected to Redis cache");

        Ok(Self {
            conn,
            prefix: config.key_prefix.clone(),
        })
    }

    fn key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Option<String> {
        let mut conn = self.conn.clone();
        match conn.get::<_, Option<String>>(self.key(key)).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Redis GET failed");
                None
            }
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let key = self.key(key);

        match ttl {
            // PSETEX rejects a zero expiry
            Some(duration) => conn
                .pset_ex::<_, _, ()>(key, value, (duration.as_millis() as u64).max(1))
                .await
                .map_err(|e| CacheError::Operation(e.to_string())),
            None => conn
                .set::<_, _, ()>(key, value)
                .await
                .map_err(|e| CacheError::Operation(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn get_test_cache() -> Option<RedisCache> {
        let config = RedisConfig {
            url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6389".to_string()),
            connect_timeout: Duration::from_secs(1),
            key_prefix: "yatube-test:".to_string(),
            fallback_to_memory: false,
        };

        RedisCache::new(&config).await.ok()
    }

    #[tokio::test]
    async fn test_redis_cache_set_get() {
        let Some(cache) = get_test_cache().await else {
            tracing::warn!("Redis not available, skipping test");
            return;
        };

        cache.set("page", "<html>", None).await.unwrap();
        assert_eq!(cache.get("page").await, Some("<html>".to_string()));
        assert_eq!(cache.get("missing_page").await, None);
    }

    #[tokio::test]
    async fn test_redis_cache_ttl() {
        let Some(cache) = get_test_cache().await else {
            return;
        };

        cache
            .set("ttl_page", "value", Some(Duration::from_millis(300)))
            .await
            .unwrap();
        assert_eq!(cache.get("ttl_page").await, Some("value".to_string()));

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(cache.get("ttl_page").await, None);
    }
}
