//! Follow/unfollow toggle.
//!
//! Both directions are idempotent: following twice leaves one row, unfollowing
//! someone you do not follow removes nothing. Following yourself is a no-op.

use crate::error::RepoError;
use crate::ports::FollowRepository;

/// What `profile_follow` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    Created,
    AlreadyFollowing,
    SelfFollow,
}

/// Make `user_id` follow `author_id` unless they are the same user.
pub async fn profile_follow(
    follows: &dyn FollowRepository,
    user_id: i64,
    author_id: i64,
) -> Result<FollowOutcome, RepoError> {
    if user_id == author_id {
        return Ok(FollowOutcome::SelfFollow);
    }
    let (_, created) = follows.get_or_create(user_id, author_id).await?;
    Ok(if created {
        FollowOutcome::Created
    } else {
        FollowOutcome::AlreadyFollowing
    })
}

/// Remove any follow from `user_id` to `author_id`. Returns the number of rows removed.
pub async fn profile_unfollow(
    follows: &dyn FollowRepository,
    user_id: i64,
    author_id: i64,
) -> Result<u64, RepoError> {
    if user_id == author_id {
        return Ok(0);
    }
    follows.delete_matching(user_id, author_id).await
}

/// Whether `viewer` follows `author`. Anonymous viewers and self-views never do.
pub async fn is_following(
    follows: &dyn FollowRepository,
    viewer: Option<i64>,
    author_id: i64,
) -> Result<bool, RepoError> {
    match viewer {
        Some(user_id) if user_id != author_id => {
            Ok(follows.find(user_id, author_id).await?.is_some())
        }
        _ => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::domain::Follow;

    #[derive(Default)]
    struct FakeFollows {
        rows: Mutex<Vec<Follow>>,
    }

    impl FakeFollows {
        fn len(&self) -> usize {
            self.rows.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl FollowRepository for FakeFollows {
        async fn find(&self, user_id: i64, author_id: i64) -> Result<Option<Follow>, RepoError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .find(|f| f.user_id == user_id && f.author_id == author_id)
                .copied())
        }

        async fn get_or_create(
            &self,
            user_id: i64,
            author_id: i64,
        ) -> Result<(Follow, bool), RepoError> {
            let mut rows = self.rows.lock().unwrap();
            if let Some(existing) = rows
                .iter()
                .find(|f| f.user_id == user_id && f.author_id == author_id)
            {
                return Ok((*existing, false));
            }
            let mut follow = Follow::new(user_id, author_id);
            follow.id = rows.len() as i64 + 1;
            rows.push(follow);
            Ok((follow, true))
        }

        async fn delete_matching(&self, user_id: i64, author_id: i64) -> Result<u64, RepoError> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|f| !(f.user_id == user_id && f.author_id == author_id));
            Ok((before - rows.len()) as u64)
        }

        async fn count_followers(&self, author_id: i64) -> Result<u64, RepoError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().filter(|f| f.author_id == author_id).count() as u64)
        }
    }

    #[tokio::test]
    async fn test_follow_twice_keeps_one_row() {
        let follows = FakeFollows::default();

        let first = profile_follow(&follows, 1, 2).await.unwrap();
        let second = profile_follow(&follows, 1, 2).await.unwrap();

        assert_eq!(first, FollowOutcome::Created);
        assert_eq!(second, FollowOutcome::AlreadyFollowing);
        assert_eq!(follows.len(), 1);
    }

    #[tokio::test]
    async fn test_self_follow_is_noop() {
        let follows = FakeFollows::default();

        let outcome = profile_follow(&follows, 3, 3).await.unwrap();

        assert_eq!(outcome, FollowOutcome::SelfFollow);
        assert_eq!(follows.len(), 0);
        assert_eq!(profile_unfollow(&follows, 3, 3).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unfollow_without_follow_removes_nothing() {
        let follows = FakeFollows::default();
        assert_eq!(profile_unfollow(&follows, 1, 2).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unfollow_removes_row() {
        let follows = FakeFollows::default();
        profile_follow(&follows, 1, 2).await.unwrap();
        profile_follow(&follows, 5, 2).await.unwrap();

        assert_eq!(profile_unfollow(&follows, 1, 2).await.unwrap(), 1);
        assert_eq!(follows.count_followers(2).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_is_following() {
        let follows = FakeFollows::default();
        profile_follow(&follows, 1, 2).await.unwrap();

        assert!(is_following(&follows, Some(1), 2).await.unwrap());
        assert!(!is_following(&follows, Some(2), 1).await.unwrap());
        assert!(!is_following(&follows, Some(2), 2).await.unwrap());
        assert!(!is_following(&follows, None, 2).await.unwrap());
    }
}
