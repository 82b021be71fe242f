//! Application configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use yatube_core::pagination::POSTS_PER_PAGE;
use yatube_infra::JwtConfig;

#[cfg(feature = "postgres")]
use yatube_infra::DatabaseConfig;
#[cfg(feature = "redis")]
use yatube_infra::RedisConfig;

/// Default lifetime of a cached index page.
pub const INDEX_CACHE_SECONDS: u64 = 20;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub index_cache_ttl: Duration,
    pub posts_per_page: u64,
    pub jwt: JwtConfig,
    #[cfg(feature = "postgres")]
    pub database: Option<DatabaseConfig>,
    #[cfg(feature = "redis")]
    pub redis: Option<RedisConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            index_cache_ttl: Duration::from_secs(INDEX_CACHE_SECONDS),
            posts_per_page: POSTS_PER_PAGE,
            jwt: JwtConfig::default(),
            #[cfg(feature = "postgres")]
            database: None,
            #[cfg(feature = "redis")]
            redis: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_var::<u16>("PORT").unwrap_or(defaults.port),
            index_cache_ttl: parse_var::<u64>("INDEX_CACHE_SECONDS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.index_cache_ttl),
            posts_per_page: parse_var::<u64>("POSTS_PER_PAGE")
                .filter(|n| *n > 0)
                .unwrap_or(defaults.posts_per_page),
            jwt: JwtConfig::from_env(),
            #[cfg(feature = "postgres")]
            database: DatabaseConfig::from_env(),
            #[cfg(feature = "redis")]
            redis: RedisConfig::from_env(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.parse().ok())
}
