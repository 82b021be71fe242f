use async_trait::async_trait;

use crate::domain::{Comment, CommentDetails, Follow, Group, Post, PostDetails, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity: insert when unsaved, update otherwise.
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID, applying the cascade rules of the schema.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, i64> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Group repository.
#[async_trait]
pub trait GroupRepository: BaseRepository<Group, i64> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError>;

    /// All groups ordered by title, for the post form.
    async fn list_all(&self) -> Result<Vec<Group>, RepoError>;
}

/// Which posts a listing shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    All,
    Group(i64),
    Author(i64),
    /// Posts by every author the given user follows.
    FollowedBy(i64),
}

/// Post repository. Listings are ordered newest first.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, i64> {
    async fn find_details(&self, id: i64) -> Result<Option<PostDetails>, RepoError>;

    async fn count(&self, filter: PostFilter) -> Result<u64, RepoError>;

    async fn list(
        &self,
        filter: PostFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<PostDetails>, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, i64> {
    /// Comments under a post, oldest first.
    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentDetails>, RepoError>;
}

/// Follow repository. Rows are unique per (user, author).
#[async_trait]
pub trait FollowRepository: Send + Sync {
    async fn find(&self, user_id: i64, author_id: i64) -> Result<Option<Follow>, RepoError>;

    /// Return the existing row or insert one. The flag tells whether it was created.
    async fn get_or_create(&self, user_id: i64, author_id: i64)
    -> Result<(Follow, bool), RepoError>;

    /// Delete the matching rows and return how many were removed.
    async fn delete_matching(&self, user_id: i64, author_id: i64) -> Result<u64, RepoError>;

    /// How many users follow the author.
    async fn count_followers(&self, author_id: i64) -> Result<u64, RepoError>;
}
