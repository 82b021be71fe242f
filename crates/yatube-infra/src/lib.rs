//! # Yatube Infrastructure
//!
//! Concrete implementations of the ports defined in `yatube-core`.
//! This crate contains the database, cache and authentication integrations.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, in-memory only
//! - `postgres` - PostgreSQL storage via SeaORM
//! - `redis` - Redis-backed page cache

pub mod auth;
pub mod cache;
pub mod database;
pub mod memory;

// Re-exports - In-Memory
pub use cache::InMemoryCache;
pub use memory::InMemoryStore;

pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};

#[cfg(feature = "postgres")]
pub use database::DatabaseConfig;

// Re-exports - Redis
#[cfg(feature = "redis")]
pub use cache::{RedisCache, RedisConfig};
