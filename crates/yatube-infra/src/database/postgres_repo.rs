//! PostgreSQL repository implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::sea_query::Query;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use yatube_core::domain::{CommentDetails, Follow, Group, PostDetails, User};
use yatube_core::error::RepoError;
use yatube_core::ports::{
    CommentRepository, FollowRepository, GroupRepository, PostFilter, PostRepository,
    UserRepository,
};

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::follow::{self, Entity as FollowEntity};
use super::entity::group::{self, Entity as GroupEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL group repository.
pub type PostgresGroupRepository = PostgresBaseRepository<GroupEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// PostgreSQL follow repository.
pub type PostgresFollowRepository = PostgresBaseRepository<FollowEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(%username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl GroupRepository for PostgresGroupRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
        let result = GroupEntity::find()
            .filter(group::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn list_all(&self) -> Result<Vec<Group>, RepoError> {
        let result = GroupEntity::find()
            .order_by_asc(group::Column::Title)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

/// WHERE clause of a post listing.
fn post_condition(filter: PostFilter) -> Condition {
    match filter {
        PostFilter::All => Condition::all(),
        PostFilter::Group(group_id) => Condition::all().add(post::Column::GroupId.eq(group_id)),
        PostFilter::Author(author_id) => {
            Condition::all().add(post::Column::AuthorId.eq(author_id))
        }
        PostFilter::FollowedBy(user_id) => Condition::all().add(
            post::Column::AuthorId.in_subquery(
                Query::select()
                    .column(follow::Column::AuthorId)
                    .from(FollowEntity)
                    .and_where(follow::Column::UserId.eq(user_id))
                    .to_owned(),
            ),
        ),
    }
}

impl PostgresPostRepository {
    /// Attach groups to posts already joined with their authors.
    async fn with_groups(
        &self,
        rows: Vec<(post::Model, Option<user::Model>)>,
    ) -> Result<Vec<PostDetails>, RepoError> {
        let group_ids: Vec<i64> = rows.iter().filter_map(|(p, _)| p.group_id).collect();
        let groups: HashMap<i64, Group> = if group_ids.is_empty() {
            HashMap::new()
        } else {
            GroupEntity::find()
                .filter(group::Column::Id.is_in(group_ids))
                .all(&self.db)
                .await
                .map_err(map_db_err)?
                .into_iter()
                .map(|g| (g.id, Group::from(g)))
                .collect()
        };

        Ok(rows
            .into_iter()
            .filter_map(|(post, author)| {
                let group = post.group_id.and_then(|id| groups.get(&id).cloned());
                Some(PostDetails {
                    author: author?.into(),
                    group,
                    post: post.into(),
                })
            })
            .collect())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_details(&self, id: i64) -> Result<Option<PostDetails>, RepoError> {
        let rows = PostEntity::find_by_id(id)
            .find_also_related(UserEntity)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(self.with_groups(rows).await?.into_iter().next())
    }

    async fn count(&self, filter: PostFilter) -> Result<u64, RepoError> {
        PostEntity::find()
            .filter(post_condition(filter))
            .count(&self.db)
            .await
            .map_err(map_db_err)
    }

    async fn list(
        &self,
        filter: PostFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<PostDetails>, RepoError> {
        let rows = PostEntity::find()
            .filter(post_condition(filter))
            .order_by_desc(post::Column::PubDate)
            .order_by_desc(post::Column::Id)
            .offset(offset)
            .limit(limit)
            .find_also_related(UserEntity)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        self.with_groups(rows).await
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentDetails>, RepoError> {
        let rows = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::Created)
            .order_by_asc(comment::Column::Id)
            .find_also_related(UserEntity)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows
            .into_iter()
            .filter_map(|(comment, author)| {
                Some(CommentDetails {
                    author: author?.into(),
                    comment: comment.into(),
                })
            })
            .collect())
    }
}

impl PostgresFollowRepository {
    fn pair(user_id: i64, author_id: i64) -> Condition {
        Condition::all()
            .add(follow::Column::UserId.eq(user_id))
            .add(follow::Column::AuthorId.eq(author_id))
    }
}

#[async_trait]
impl FollowRepository for PostgresFollowRepository {
    async fn find(&self, user_id: i64, author_id: i64) -> Result<Option<Follow>, RepoError> {
        let result = FollowEntity::find()
            .filter(Self::pair(user_id, author_id))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn get_or_create(
        &self,
        user_id: i64,
        author_id: i64,
    ) -> Result<(Follow, bool), RepoError> {
        if let Some(existing) = self.find(user_id, author_id).await? {
            return Ok((existing, false));
        }

        let inserted = follow::ActiveModel {
            user_id: Set(user_id),
            author_id: Set(author_id),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(map_db_err);

        match inserted {
            Ok(model) => Ok((model.into(), true)),
            // lost a race against a concurrent follow; the unique index kept one row
            Err(RepoError::Constraint(_)) => self
                .find(user_id, author_id)
                .await?
                .map(|f| (f, false))
                .ok_or(RepoError::NotFound),
            Err(e) => Err(e),
        }
    }

    async fn delete_matching(&self, user_id: i64, author_id: i64) -> Result<u64, RepoError> {
        let result = FollowEntity::delete_many()
            .filter(Self::pair(user_id, author_id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.rows_affected)
    }

    async fn count_followers(&self, author_id: i64) -> Result<u64, RepoError> {
        FollowEntity::find()
            .filter(follow::Column::AuthorId.eq(author_id))
            .count(&self.db)
            .await
            .map_err(map_db_err)
    }
}
