#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use uuid::Uuid;

    use crate::database::entity::{post, user};
    use crate::database::{DatabaseConnections, postgres_repositories};
    use crate::database::postgres_repo::{PostgresPostRepository, PostgresUserRepository};
    use quill_core::domain::{Category, PageRequest, Post, PostStatus, Role, User};
    use quill_core::error::RepoError;
    use quill_core::ports::{BaseRepository, PostQuery, PostRepository, UserRepository};

    fn post_model(id: Uuid, author_id: Uuid, category: &str, status: &str) -> post::Model {
        let now = chrono::Utc::now();
        post::Model {
            id,
            author_id,
            title: "Test Post".to_owned(),
            content: "Content".to_owned(),
            excerpt: "Content...".to_owned(),
            tags: vec!["rust".to_owned()],
            category: category.to_owned(),
            status: status.to_owned(),
            featured_image: String::new(),
            likes: vec![author_id],
            view_count: 7,
            read_time: 1,
            slug: "test-post".to_owned(),
            published_at: Some(now.into()),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn user_model(id: Uuid, role: &str) -> user::Model {
        let now = chrono::Utc::now();
        user::Model {
            id,
            username: "alice".to_owned(),
            email: "alice@example.com".to_owned(),
            password_hash: "$argon2id$hash".to_owned(),
            first_name: "Alice".to_owned(),
            last_name: "Liddell".to_owned(),
            bio: String::new(),
            avatar: String::new(),
            role: role.to_owned(),
            is_verified: false,
            followers: vec![],
            following: vec![Uuid::new_v4()],
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn test_find_post_by_id() {
        let post_id = Uuid::new_v4();
        let author_id = Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![post_model(
                post_id,
                author_id,
                "Technology",
                "published",
            )]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        let post: Post = repo.find_by_id(post_id).await.unwrap().unwrap();
        assert_eq!(post.id, post_id);
        assert_eq!(post.category, Category::Technology);
        assert_eq!(post.status, PostStatus::Published);
        assert_eq!(post.likes, vec![author_id]);
        assert_eq!(post.view_count, 7);
    }

    #[tokio::test]
    async fn test_unknown_enum_strings_fall_back_to_defaults() {
        let post_id = Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![post_model(
                post_id,
                Uuid::new_v4(),
                "Gardening",
                "pending",
            )]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        let post: Post = repo.find_by_id(post_id).await.unwrap().unwrap();
        assert_eq!(post.category, Category::Other);
        assert_eq!(post.status, PostStatus::Draft);
    }

    #[tokio::test]
    async fn test_find_user_by_email_maps_role() {
        let user_id = Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![user_model(user_id, "moderator")]])
            .into_connection();

        let repo = PostgresUserRepository::new(db);

        let user = repo
            .find_by_email("alice@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.id, user_id);
        assert_eq!(user.role, Role::Moderator);
        assert_eq!(user.following.len(), 1);
    }

    #[tokio::test]
    async fn test_insert_user_returns_stored_row() {
        let user_id = Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![user_model(user_id, "user")]])
            .into_connection();

        let repo = PostgresUserRepository::new(db);

        let mut user = User::new("alice", "alice@example.com", "$argon2id$hash".into(), "Alice", "Liddell");
        user.id = user_id;
        let stored: User = repo.insert(user).await.unwrap();
        assert_eq!(stored.id, user_id);
        assert_eq!(stored.role, Role::User);
    }

    #[tokio::test]
    async fn test_delete_missing_post_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        let result = BaseRepository::<Post, Uuid>::delete(&repo, Uuid::new_v4()).await;
        assert!(matches!(result, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn test_empty_author_list_skips_query() {
        // No results are queued, so any query would fail.
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let repo = PostgresPostRepository::new(db);

        let query = PostQuery {
            authors: Some(vec![]),
            ..PostQuery::published()
        };
        let page = PostRepository::list(&repo, &query, PageRequest::default())
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn test_slug_taken_reads_count() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![BTreeMap::from([(
                "num_items",
                Value::BigInt(Some(1)),
            )])]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        assert!(repo.slug_taken("hello-world", None).await.unwrap());
    }

    #[tokio::test]
    async fn test_count_by_category_sorts_largest_first() {
        let row = |category: &str, count: i64| {
            BTreeMap::from([
                ("category", Value::String(Some(Box::new(category.to_owned())))),
                ("count", Value::BigInt(Some(count))),
            ])
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![row("Food", 2), row("Technology", 5)]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        let counts = repo.count_by_category().await.unwrap();
        assert_eq!(
            counts,
            vec![(Category::Technology, 5), (Category::Food, 2)]
        );
    }

    #[tokio::test]
    async fn test_repositories_share_one_connection() {
        let user_id = Uuid::new_v4();
        let post_id = Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![user_model(user_id, "admin")]])
            .append_query_results(vec![vec![post_model(
                post_id,
                user_id,
                "Travel",
                "draft",
            )]])
            .into_connection();

        let repos = postgres_repositories(&DatabaseConnections::from_connection(db));

        let user = repos.users.find_by_id(user_id).await.unwrap().unwrap();
        assert_eq!(user.role, Role::Admin);
        let post = repos.posts.find_by_id(post_id).await.unwrap().unwrap();
        assert_eq!(post.author_id, user_id);
        assert_eq!(post.category, Category::Travel);
    }
}
