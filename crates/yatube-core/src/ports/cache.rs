use async_trait::async_trait;
use std::time::Duration;

/// Cache trait - a key-value store with per-entry expiry (Redis, in-memory).
///
/// Reads never fail: a backend error is reported as a miss.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Get a live value from the cache.
    async fn get(&self, key: &str) -> Option<String>;

    /// Store a value. With a TTL the entry disappears once it elapses.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError>;
}

/// Cache operation errors.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}
