#[cfg(test)]
mod tests {
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    use crate::database::entity::{follow, group, post, user};
    use crate::database::postgres_repo::{
        PostgresFollowRepository, PostgresGroupRepository, PostgresPostRepository,
        PostgresUserRepository,
    };
    use yatube_core::domain::Post;
    use yatube_core::ports::{
        BaseRepository, FollowRepository, GroupRepository, PostFilter, PostRepository,
        UserRepository,
    };

    fn author() -> user::Model {
        user::Model {
            id: 1,
            username: "Test_User".to_owned(),
            password_hash: "hash".to_owned(),
            date_joined: Utc::now().into(),
        }
    }

    fn post_row(id: i64, group_id: Option<i64>) -> post::Model {
        post::Model {
            id,
            text: format!("Тестовый текст{id}"),
            pub_date: Utc::now().into(),
            author_id: 1,
            group_id,
            image: None,
        }
    }

    #[tokio::test]
    async fn test_find_post_by_id() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![post_row(5, None)]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        let result: Option<Post> = repo.find_by_id(5).await.unwrap();

        let post = result.unwrap();
        assert_eq!(post.id, 5);
        assert_eq!(post.text, "Тестовый текст5");
    }

    #[tokio::test]
    async fn test_find_user_by_username() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![author()]])
            .into_connection();

        let repo = PostgresUserRepository::new(db);

        let user = repo.find_by_username("Test_User").await.unwrap().unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(user.password_hash, "hash");
    }

    #[tokio::test]
    async fn test_find_group_by_unknown_slug() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<group::Model>::new()])
            .into_connection();

        let repo = PostgresGroupRepository::new(db);

        assert!(repo.find_by_slug("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_posts_joins_author_and_group() {
        let group = group::Model {
            id: 3,
            title: "группа0".to_owned(),
            slug: "test_slug0".to_owned(),
            description: "проверка описания0".to_owned(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![
                (post_row(2, Some(3)), author()),
                (post_row(1, None), author()),
            ]])
            .append_query_results(vec![vec![group]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        let posts = repo.list(PostFilter::All, 0, 10).await.unwrap();

        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].post.id, 2);
        assert_eq!(posts[0].author.username, "Test_User");
        assert_eq!(posts[0].group.as_ref().map(|g| g.slug.as_str()), Some("test_slug0"));
        assert!(posts[1].group.is_none());
    }

    #[tokio::test]
    async fn test_get_or_create_existing_follow() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![follow::Model {
                id: 9,
                user_id: 2,
                author_id: 1,
            }]])
            .into_connection();

        let repo = PostgresFollowRepository::new(db);

        let (follow, created) = repo.get_or_create(2, 1).await.unwrap();
        assert!(!created);
        assert_eq!(follow.id, 9);
    }

    #[tokio::test]
    async fn test_delete_matching_reports_rows() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let repo = PostgresFollowRepository::new(db);

        assert_eq!(repo.delete_matching(2, 1).await.unwrap(), 0);
    }
}
