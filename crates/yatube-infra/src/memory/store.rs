//! A single in-process store behind every repository port.
//!
//! Mirrors the relational schema: unique usernames, slugs and follow pairs,
//! foreign keys checked on write, cascades and SET NULL applied on delete.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use yatube_core::domain::{
    Comment, CommentDetails, Follow, Group, Post, PostDetails, TITLE_MAX_LEN, UNSAVED_ID, User,
};
use yatube_core::error::RepoError;
use yatube_core::ports::{
    BaseRepository, CommentRepository, FollowRepository, GroupRepository, PostFilter,
    PostRepository, UserRepository,
};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    groups: BTreeMap<i64, Group>,
    posts: BTreeMap<i64, Post>,
    comments: BTreeMap<i64, Comment>,
    follows: BTreeMap<i64, Follow>,
    sequences: Sequences,
}

#[derive(Default)]
struct Sequences {
    users: i64,
    groups: i64,
    posts: i64,
    comments: i64,
    follows: i64,
}

fn next(seq: &mut i64) -> i64 {
    *seq += 1;
    *seq
}

impl Tables {
    fn post_matches(&self, post: &Post, filter: PostFilter) -> bool {
        match filter {
            PostFilter::All => true,
            PostFilter::Group(group_id) => post.group_id == Some(group_id),
            PostFilter::Author(author_id) => post.author_id == author_id,
            PostFilter::FollowedBy(user_id) => self
                .follows
                .values()
                .any(|f| f.user_id == user_id && f.author_id == post.author_id),
        }
    }

    /// Matching posts, newest first.
    fn filtered_posts(&self, filter: PostFilter) -> Vec<&Post> {
        let mut posts: Vec<&Post> = self
            .posts
            .values()
            .filter(|p| self.post_matches(p, filter))
            .collect();
        posts.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)));
        posts
    }

    fn post_details(&self, post: &Post) -> Option<PostDetails> {
        let author = self.users.get(&post.author_id)?.clone();
        let group = post.group_id.and_then(|id| self.groups.get(&id)).cloned();
        Some(PostDetails {
            post: post.clone(),
            author,
            group,
        })
    }

    fn delete_post(&mut self, id: i64) -> bool {
        if self.posts.remove(&id).is_none() {
            return false;
        }
        self.comments.retain(|_, c| c.post_id != id);
        true
    }

    fn delete_user(&mut self, id: i64) -> bool {
        if self.users.remove(&id).is_none() {
            return false;
        }
        let authored: Vec<i64> = self
            .posts
            .values()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in authored {
            self.delete_post(post_id);
        }
        self.comments.retain(|_, c| c.author_id != id);
        self.follows
            .retain(|_, f| f.user_id != id && f.author_id != id);
        true
    }

    fn delete_group(&mut self, id: i64) -> bool {
        if self.groups.remove(&id).is_none() {
            return false;
        }
        for post in self.posts.values_mut() {
            if post.group_id == Some(id) {
                post.group_id = None;
            }
        }
        true
    }
}

fn require(condition: bool, message: &str) -> Result<(), RepoError> {
    if condition {
        Ok(())
    } else {
        Err(RepoError::Constraint(message.to_string()))
    }
}

/// Shared handle to the in-memory tables. Cloning shares the data.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users(&self) -> InMemoryUserRepository {
        InMemoryUserRepository(self.clone())
    }

    pub fn groups(&self) -> InMemoryGroupRepository {
        InMemoryGroupRepository(self.clone())
    }

    pub fn posts(&self) -> InMemoryPostRepository {
        InMemoryPostRepository(self.clone())
    }

    pub fn comments(&self) -> InMemoryCommentRepository {
        InMemoryCommentRepository(self.clone())
    }

    pub fn follows(&self) -> InMemoryFollowRepository {
        InMemoryFollowRepository(self.clone())
    }
}

pub struct InMemoryUserRepository(InMemoryStore);
pub struct InMemoryGroupRepository(InMemoryStore);
pub struct InMemoryPostRepository(InMemoryStore);
pub struct InMemoryCommentRepository(InMemoryStore);
pub struct InMemoryFollowRepository(InMemoryStore);

#[async_trait]
impl BaseRepository<User, i64> for InMemoryUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        Ok(self.0.tables.read().await.users.get(&id).cloned())
    }

    async fn save(&self, mut user: User) -> Result<User, RepoError> {
        let mut tables = self.0.tables.write().await;
        require(
            !tables
                .users
                .values()
                .any(|u| u.username == user.username && u.id != user.id),
            "username already exists",
        )?;
        if user.id == UNSAVED_ID {
            user.id = next(&mut tables.sequences.users);
        } else if !tables.users.contains_key(&user.id) {
            return Err(RepoError::NotFound);
        }
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        if self.0.tables.write().await.delete_user(id) {
            Ok(())
        } else {
            Err(RepoError::NotFound)
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.0.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

#[async_trait]
impl BaseRepository<Group, i64> for InMemoryGroupRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Group>, RepoError> {
        Ok(self.0.tables.read().await.groups.get(&id).cloned())
    }

    async fn save(&self, mut group: Group) -> Result<Group, RepoError> {
        let mut tables = self.0.tables.write().await;
        require(!group.slug.is_empty(), "slug must not be empty")?;
        require(
            group.title.chars().count() <= TITLE_MAX_LEN,
            "title is too long",
        )?;
        require(
            !tables
                .groups
                .values()
                .any(|g| g.slug == group.slug && g.id != group.id),
            "slug already exists",
        )?;
        if group.id == UNSAVED_ID {
            group.id = next(&mut tables.sequences.groups);
        } else if !tables.groups.contains_key(&group.id) {
            return Err(RepoError::NotFound);
        }
        tables.groups.insert(group.id, group.clone());
        Ok(group)
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        if self.0.tables.write().await.delete_group(id) {
            Ok(())
        } else {
            Err(RepoError::NotFound)
        }
    }
}

#[async_trait]
impl GroupRepository for InMemoryGroupRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
        let tables = self.0.tables.read().await;
        Ok(tables.groups.values().find(|g| g.slug == slug).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Group>, RepoError> {
        let tables = self.0.tables.read().await;
        let mut groups: Vec<Group> = tables.groups.values().cloned().collect();
        groups.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(groups)
    }
}

#[async_trait]
impl BaseRepository<Post, i64> for InMemoryPostRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError> {
        Ok(self.0.tables.read().await.posts.get(&id).cloned())
    }

    async fn save(&self, mut post: Post) -> Result<Post, RepoError> {
        let mut tables = self.0.tables.write().await;
        require(
            tables.users.contains_key(&post.author_id),
            "post author does not exist",
        )?;
        require(
            post.group_id.is_none_or(|id| tables.groups.contains_key(&id)),
            "post group does not exist",
        )?;
        if post.id == UNSAVED_ID {
            post.id = next(&mut tables.sequences.posts);
        } else {
            match tables.posts.get(&post.id) {
                // pub_date is immutable once stored
                Some(stored) => post.pub_date = stored.pub_date,
                None => return Err(RepoError::NotFound),
            }
        }
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        if self.0.tables.write().await.delete_post(id) {
            Ok(())
        } else {
            Err(RepoError::NotFound)
        }
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_details(&self, id: i64) -> Result<Option<PostDetails>, RepoError> {
        let tables = self.0.tables.read().await;
        Ok(tables.posts.get(&id).and_then(|p| tables.post_details(p)))
    }

    async fn count(&self, filter: PostFilter) -> Result<u64, RepoError> {
        let tables = self.0.tables.read().await;
        Ok(tables.filtered_posts(filter).len() as u64)
    }

    async fn list(
        &self,
        filter: PostFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<PostDetails>, RepoError> {
        let tables = self.0.tables.read().await;
        Ok(tables
            .filtered_posts(filter)
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .filter_map(|p| tables.post_details(p))
            .collect())
    }
}

#[async_trait]
impl BaseRepository<Comment, i64> for InMemoryCommentRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>, RepoError> {
        Ok(self.0.tables.read().await.comments.get(&id).cloned())
    }

    async fn save(&self, mut comment: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.0.tables.write().await;
        require(
            tables.posts.contains_key(&comment.post_id),
            "comment post does not exist",
        )?;
        require(
            tables.users.contains_key(&comment.author_id),
            "comment author does not exist",
        )?;
        if comment.id == UNSAVED_ID {
            comment.id = next(&mut tables.sequences.comments);
        } else if !tables.comments.contains_key(&comment.id) {
            return Err(RepoError::NotFound);
        }
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        match self.0.tables.write().await.comments.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentDetails>, RepoError> {
        let tables = self.0.tables.read().await;
        let mut comments: Vec<CommentDetails> = tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .filter_map(|c| {
                let author = tables.users.get(&c.author_id)?.clone();
                Some(CommentDetails {
                    comment: c.clone(),
                    author,
                })
            })
            .collect();
        comments.sort_by(|a, b| {
            a.comment
                .created
                .cmp(&b.comment.created)
                .then(a.comment.id.cmp(&b.comment.id))
        });
        Ok(comments)
    }
}

#[async_trait]
impl FollowRepository for InMemoryFollowRepository {
    async fn find(&self, user_id: i64, author_id: i64) -> Result<Option<Follow>, RepoError> {
        let tables = self.0.tables.read().await;
        Ok(tables
            .follows
            .values()
            .find(|f| f.user_id == user_id && f.author_id == author_id)
            .copied())
    }

    async fn get_or_create(
        &self,
        user_id: i64,
        author_id: i64,
    ) -> Result<(Follow, bool), RepoError> {
        let mut tables = self.0.tables.write().await;
        if let Some(existing) = tables
            .follows
            .values()
            .find(|f| f.user_id == user_id && f.author_id == author_id)
        {
            return Ok((*existing, false));
        }
        require(
            tables.users.contains_key(&user_id) && tables.users.contains_key(&author_id),
            "follow user does not exist",
        )?;
        let mut follow = Follow::new(user_id, author_id);
        follow.id = next(&mut tables.sequences.follows);
        tables.follows.insert(follow.id, follow);
        Ok((follow, true))
    }

    async fn delete_matching(&self, user_id: i64, author_id: i64) -> Result<u64, RepoError> {
        let mut tables = self.0.tables.write().await;
        let before = tables.follows.len();
        tables
            .follows
            .retain(|_, f| !(f.user_id == user_id && f.author_id == author_id));
        Ok((before - tables.follows.len()) as u64)
    }

    async fn count_followers(&self, author_id: i64) -> Result<u64, RepoError> {
        let tables = self.0.tables.read().await;
        Ok(tables
            .follows
            .values()
            .filter(|f| f.author_id == author_id)
            .count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed(store: &InMemoryStore) -> (User, Group) {
        let user = store
            .users()
            .save(User::new("Test_User", "hash"))
            .await
            .unwrap();
        let group = store
            .groups()
            .save(Group::new("группа0", "test_slug0", "проверка описания0"))
            .await
            .unwrap();
        (user, group)
    }

    #[tokio::test]
    async fn test_ids_are_assigned_on_insert() {
        let store = InMemoryStore::new();
        let (user, group) = seed(&store).await;
        assert_eq!(user.id, 1);
        assert_eq!(group.id, 1);

        let post = store
            .posts()
            .save(Post::new(user.id, "first", None, None))
            .await
            .unwrap();
        assert_eq!(post.id, 1);
    }

    #[tokio::test]
    async fn test_group_title_length_is_bounded() {
        let store = InMemoryStore::new();
        let longest = "я".repeat(TITLE_MAX_LEN);
        assert!(
            store
                .groups()
                .save(Group::new(longest, "longest", ""))
                .await
                .is_ok()
        );

        let too_long = store
            .groups()
            .save(Group::new("я".repeat(TITLE_MAX_LEN + 1), "too_long", ""))
            .await;
        assert!(matches!(too_long, Err(RepoError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_unique_username_and_slug() {
        let store = InMemoryStore::new();
        seed(&store).await;

        let dup_user = store.users().save(User::new("Test_User", "x")).await;
        assert!(matches!(dup_user, Err(RepoError::Constraint(_))));

        let dup_group = store
            .groups()
            .save(Group::new("other", "test_slug0", ""))
            .await;
        assert!(matches!(dup_group, Err(RepoError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_listing_is_newest_first_and_filtered() {
        let store = InMemoryStore::new();
        let (user, group) = seed(&store).await;
        let posts = store.posts();
        for i in 0..3 {
            posts
                .save(Post::new(user.id, format!("grouped {i}"), Some(group.id), None))
                .await
                .unwrap();
        }
        let loose = posts
            .save(Post::new(user.id, "loose", None, None))
            .await
            .unwrap();

        let all = posts.list(PostFilter::All, 0, 10).await.unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].post.id, loose.id);

        assert_eq!(posts.count(PostFilter::Group(group.id)).await.unwrap(), 3);
        let grouped = posts.list(PostFilter::Group(group.id), 1, 10).await.unwrap();
        assert_eq!(grouped.len(), 2);
        assert!(grouped.iter().all(|p| p.group.as_ref() == Some(&group)));
    }

    #[tokio::test]
    async fn test_followed_by_filter() {
        let store = InMemoryStore::new();
        let (author, _) = seed(&store).await;
        let reader = store.users().save(User::new("reader", "h")).await.unwrap();
        let stranger = store.users().save(User::new("stranger", "h")).await.unwrap();
        store
            .posts()
            .save(Post::new(author.id, "news", None, None))
            .await
            .unwrap();

        store.follows().get_or_create(reader.id, author.id).await.unwrap();

        let posts = store.posts();
        assert_eq!(posts.count(PostFilter::FollowedBy(reader.id)).await.unwrap(), 1);
        assert_eq!(posts.count(PostFilter::FollowedBy(stranger.id)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_follow_pair_is_unique() {
        let store = InMemoryStore::new();
        let (author, _) = seed(&store).await;
        let reader = store.users().save(User::new("reader", "h")).await.unwrap();
        let follows = store.follows();

        let (first, created) = follows.get_or_create(reader.id, author.id).await.unwrap();
        let (second, created_again) = follows.get_or_create(reader.id, author.id).await.unwrap();

        assert!(created);
        assert!(!created_again);
        assert_eq!(first, second);
        assert_eq!(follows.count_followers(author.id).await.unwrap(), 1);
        assert_eq!(follows.delete_matching(reader.id, author.id).await.unwrap(), 1);
        assert_eq!(follows.delete_matching(reader.id, author.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_group_nulls_posts() {
        let store = InMemoryStore::new();
        let (user, group) = seed(&store).await;
        let post = store
            .posts()
            .save(Post::new(user.id, "in group", Some(group.id), None))
            .await
            .unwrap();

        store.groups().delete(group.id).await.unwrap();

        let reloaded = store.posts().find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(reloaded.group_id, None);
    }

    #[tokio::test]
    async fn test_delete_author_cascades() {
        let store = InMemoryStore::new();
        let (author, _) = seed(&store).await;
        let reader = store.users().save(User::new("reader", "h")).await.unwrap();
        let post = store
            .posts()
            .save(Post::new(author.id, "doomed", None, None))
            .await
            .unwrap();
        store
            .comments()
            .save(Comment::new(post.id, reader.id, "nice"))
            .await
            .unwrap();
        store.follows().get_or_create(reader.id, author.id).await.unwrap();

        store.users().delete(author.id).await.unwrap();

        assert!(store.posts().find_by_id(post.id).await.unwrap().is_none());
        assert!(store.comments().list_for_post(post.id).await.unwrap().is_empty());
        assert!(store.follows().find(reader.id, author.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_keeps_pub_date() {
        let store = InMemoryStore::new();
        let (user, _) = seed(&store).await;
        let saved = store
            .posts()
            .save(Post::new(user.id, "v1", None, None))
            .await
            .unwrap();

        let mut edited = saved.clone();
        edited.text = "v2".to_string();
        edited.pub_date = chrono::Utc::now() + chrono::TimeDelta::days(1);
        let stored = store.posts().save(edited).await.unwrap();

        assert_eq!(stored.text, "v2");
        assert_eq!(stored.pub_date, saved.pub_date);
    }

    #[tokio::test]
    async fn test_post_requires_existing_author() {
        let store = InMemoryStore::new();
        let result = store.posts().save(Post::new(99, "orphan", None, None)).await;
        assert!(matches!(result, Err(RepoError::Constraint(_))));
    }
}
