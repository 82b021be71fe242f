//! Application state - shared across all handlers.

use std::sync::Arc;
use std::time::Duration;

use yatube_core::Paginator;
use yatube_core::ports::{
    Cache, CommentRepository, FollowRepository, GroupRepository, PasswordService,
    PostRepository, TokenService, UserRepository,
};
use yatube_infra::{Argon2PasswordService, InMemoryCache, InMemoryStore, JwtTokenService};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub follows: Arc<dyn FollowRepository>,
    pub cache: Arc<dyn Cache>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub paginator: Paginator,
    pub index_cache_ttl: Duration,
}

/// The five repositories, from whichever backend is configured.
struct Repositories {
    users: Arc<dyn UserRepository>,
    groups: Arc<dyn GroupRepository>,
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    follows: Arc<dyn FollowRepository>,
}

impl Repositories {
    fn in_memory(store: &InMemoryStore) -> Self {
        Self {
            users: Arc::new(store.users()),
            groups: Arc::new(store.groups()),
            posts: Arc::new(store.posts()),
            comments: Arc::new(store.comments()),
            follows: Arc::new(store.follows()),
        }
    }

    #[cfg(feature = "postgres")]
    fn postgres(conn: yatube_infra::database::DbConn) -> Self {
        use yatube_infra::database::{
            PostgresCommentRepository, PostgresFollowRepository, PostgresGroupRepository,
            PostgresPostRepository, PostgresUserRepository,
        };

        Self {
            users: Arc::new(PostgresUserRepository::new(conn.clone())),
            groups: Arc::new(PostgresGroupRepository::new(conn.clone())),
            posts: Arc::new(PostgresPostRepository::new(conn.clone())),
            comments: Arc::new(PostgresCommentRepository::new(conn.clone())),
            follows: Arc::new(PostgresFollowRepository::new(conn)),
        }
    }
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let repos = Self::init_repositories(config).await;
        let cache = Self::init_cache(config).await;

        tracing::info!(
            posts_per_page = config.posts_per_page,
            index_cache_secs = config.index_cache_ttl.as_secs(),
            "Application state initialized"
        );

        Self::assemble(repos, cache, config)
    }

    /// State over an in-memory store and cache, with no external services.
    pub fn in_memory(store: &InMemoryStore, config: &AppConfig) -> Self {
        Self::assemble(
            Repositories::in_memory(store),
            Arc::new(InMemoryCache::new()),
            config,
        )
    }

    fn assemble(repos: Repositories, cache: Arc<dyn Cache>, config: &AppConfig) -> Self {
        Self {
            users: repos.users,
            groups: repos.groups,
            posts: repos.posts,
            comments: repos.comments,
            follows: repos.follows,
            cache,
            tokens: Arc::new(JwtTokenService::new(config.jwt.clone())),
            passwords: Arc::new(Argon2PasswordService::new()),
            paginator: Paginator::new(config.posts_per_page),
            index_cache_ttl: config.index_cache_ttl,
        }
    }

    #[cfg(feature = "postgres")]
    async fn init_repositories(config: &AppConfig) -> Repositories {
        use migration::{Migrator, MigratorTrait};

        let Some(db_config) = config.database.as_ref() else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return Repositories::in_memory(&InMemoryStore::new());
        };

        let conn = match yatube_infra::database::connect(db_config).await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::error!(error = %e, "Failed to connect to database. Using in-memory fallback.");
                return Repositories::in_memory(&InMemoryStore::new());
            }
        };

        if let Err(e) = Migrator::up(&conn, None).await {
            tracing::error!(error = %e, "Failed to apply migrations. Using in-memory fallback.");
            return Repositories::in_memory(&InMemoryStore::new());
        }

        Repositories::postgres(conn)
    }

    #[cfg(not(feature = "postgres"))]
    async fn init_repositories(_config: &AppConfig) -> Repositories {
        tracing::info!("Running without postgres feature - using in-memory store");
        Repositories::in_memory(&InMemoryStore::new())
    }

    #[cfg(feature = "redis")]
    async fn init_cache(config: &AppConfig) -> Arc<dyn Cache> {
        use yatube_infra::RedisCache;

        let Some(redis_config) = config.redis.as_ref() else {
            tracing::info!("REDIS_URL not set. Using in-memory page cache.");
            return Arc::new(InMemoryCache::new());
        };

        match RedisCache::new(redis_config).await {
            Ok(cache) => Arc::new(cache),
            Err(e) if redis_config.fallback_to_memory => {
                tracing::error!(error = %e, "Failed to connect to Redis. Using in-memory page cache.");
                Arc::new(InMemoryCache::new())
            }
            Err(e) => {
                // Without the fallback every cache call misses and the page is rendered fresh.
                tracing::error!(error = %e, "Failed to connect to Redis. Page caching disabled.");
                Arc::new(NoCache)
            }
        }
    }

    #[cfg(not(feature = "redis"))]
    async fn init_cache(_config: &AppConfig) -> Arc<dyn Cache> {
        Arc::new(InMemoryCache::new())
    }
}

/// Cache that never stores anything.
#[cfg(feature = "redis")]
struct NoCache;

#[cfg(feature = "redis")]
#[async_trait::async_trait]
impl Cache for NoCache {
    async fn get(&self, _key: &str) -> Option<String> {
        None
    }

    async fn set(
        &self,
        _key: &str,
        _value: &str,
        _ttl: Option<Duration>,
    ) -> Result<(), yatube_core::ports::CacheError> {
        Ok(())
    }
}
