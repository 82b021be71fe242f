//! In-memory storage - used when no database is configured and in tests.

mod store;

pub use store::{
    InMemoryCommentRepository, InMemoryFollowRepository, InMemoryGroupRepository,
    InMemoryPostRepository, InMemoryStore, InMemoryUserRepository,
};
