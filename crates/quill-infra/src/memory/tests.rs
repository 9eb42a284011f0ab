use std::sync::Arc;

use uuid::Uuid;

use quill_core::domain::{PageRequest, PostStatus, Role, User};
use quill_core::ports::{
    AuthError, BaseRepository, PasswordService, PostQuery, TokenClaims, TokenService,
};
use quill_core::service::{
    Actor, AdminService, AuthService, CommentService, NewComment, NewPost, PostChanges,
    PostService, ProfileChanges, Registration, Repositories, UserService,
};
use quill_core::DomainError;

use super::in_memory_repositories;

struct PlainPasswords;

impl PasswordService for PlainPasswords {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        Ok(format!("plain:{password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        Ok(hash == format!("plain:{password}"))
    }
}

struct OpaqueTokens;

impl TokenService for OpaqueTokens {
    fn generate_token(&self, user_id: Uuid, _email: &str, _role: Role) -> Result<String, AuthError> {
        Ok(user_id.to_string())
    }

    fn validate_token(&self, _token: &str) -> Result<TokenClaims, AuthError> {
        Err(AuthError::InvalidToken("not supported".to_string()))
    }

    fn expiration_seconds(&self) -> i64 {
        3600
    }
}

struct Harness {
    repos: Repositories,
    auth: AuthService,
    posts: PostService,
    users: UserService,
    comments: CommentService,
    admin: AdminService,
}

impl Harness {
    fn new() -> Self {
        let repos = in_memory_repositories();
        Self {
            auth: AuthService::new(repos.clone(), Arc::new(PlainPasswords), Arc::new(OpaqueTokens)),
            posts: PostService::new(repos.clone()),
            users: UserService::new(repos.clone()),
            comments: CommentService::new(repos.clone()),
            admin: AdminService::new(repos.clone()),
            repos,
        }
    }

    async fn register(&self, name: &str) -> User {
        self.auth
            .register(Registration {
                username: name.to_string(),
                email: format!("{name}@example.com"),
                password: "secret123".to_string(),
                first_name: "Test".to_string(),
                last_name: name.to_string(),
            })
            .await
            .unwrap()
            .user
    }

    async fn publish(&self, author: &User, title: &str) -> Uuid {
        self.posts
            .create(
                actor(author),
                NewPost {
                    title: title.to_string(),
                    content: "Some words about things".to_string(),
                    status: Some(PostStatus::Published),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .post
            .id
    }

    async fn comment(&self, author: &User, post_id: Uuid, parent_id: Option<Uuid>) -> Uuid {
        self.comments
            .create(
                actor(author),
                NewComment {
                    post_id,
                    parent_id,
                    content: "Nice one".to_string(),
                },
            )
            .await
            .unwrap()
            .comment
            .id
    }
}

fn actor(user: &User) -> Actor {
    Actor::new(user.id, user.role)
}

#[tokio::test]
async fn test_register_rejects_taken_email_and_username() {
    let h = Harness::new();
    h.register("alice").await;

    let err = h
        .auth
        .register(Registration {
            username: "alice".to_string(),
            email: "ALICE@example.com".to_string(),
            password: "secret123".to_string(),
            first_name: "A".to_string(),
            last_name: "B".to_string(),
        })
        .await
        .unwrap_err();

    match err {
        DomainError::Validation(fields) => {
            let names: Vec<&str> = fields.iter().map(|f| f.field.as_str()).collect();
            assert_eq!(names, vec!["email", "username"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_register_checks_trimmed_lengths() {
    let h = Harness::new();

    let err = h
        .auth
        .register(Registration {
            username: "  ab  ".to_string(),
            email: "ab@example.com".to_string(),
            password: "secret123".to_string(),
            first_name: "   ".to_string(),
            last_name: "B".to_string(),
        })
        .await
        .unwrap_err();

    match err {
        DomainError::Validation(fields) => {
            let names: Vec<&str> = fields.iter().map(|f| f.field.as_str()).collect();
            assert_eq!(names, vec!["username", "firstName"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(h.repos.users.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_profile_update_checks_trimmed_lengths() {
    let h = Harness::new();
    let alice = h.register("alice").await;

    let err = h
        .users
        .update_profile(
            actor(&alice),
            ProfileChanges {
                first_name: Some("   ".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    let updated = h
        .users
        .update_profile(
            actor(&alice),
            ProfileChanges {
                first_name: Some(" Alice ".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.first_name, "Alice");
}

#[tokio::test]
async fn test_login_checks_password() {
    let h = Harness::new();
    let alice = h.register("alice").await;

    let session = h.auth.login("Alice@Example.com", "secret123").await.unwrap();
    assert_eq!(session.user.id, alice.id);
    assert_eq!(session.expires_in, 3600);

    let err = h.auth.login("alice@example.com", "wrong").await.unwrap_err();
    assert!(matches!(err, DomainError::Unauthorized));
    let err = h.auth.login("nobody@example.com", "secret123").await.unwrap_err();
    assert!(matches!(err, DomainError::Unauthorized));
}

#[tokio::test]
async fn test_slug_collisions_get_numeric_suffix() {
    let h = Harness::new();
    let alice = h.register("alice").await;

    let first = h.publish(&alice, "Hello World!").await;
    let second = h.publish(&alice, "Hello, World").await;

    let first = h.repos.posts.find_by_id(first).await.unwrap().unwrap();
    let second = h.repos.posts.find_by_id(second).await.unwrap().unwrap();
    assert_eq!(first.slug, "hello-world");
    assert_eq!(second.slug, "hello-world-2");
}

#[tokio::test]
async fn test_title_change_regenerates_slug() {
    let h = Harness::new();
    let alice = h.register("alice").await;
    let id = h.publish(&alice, "Hello World").await;

    let unchanged = h
        .posts
        .update(
            actor(&alice),
            id,
            PostChanges {
                content: Some("new body".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(unchanged.post.slug, "hello-world");

    let renamed = h
        .posts
        .update(
            actor(&alice),
            id,
            PostChanges {
                title: Some("Goodbye World".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.post.slug, "goodbye-world");
}

#[tokio::test]
async fn test_update_by_non_owner_is_forbidden() {
    let h = Harness::new();
    let alice = h.register("alice").await;
    let bob = h.register("bob").await;
    let id = h.publish(&alice, "Mine").await;

    let err = h
        .posts
        .update(
            actor(&bob),
            id,
            PostChanges {
                title: Some("Stolen".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));

    let admin = Actor::new(bob.id, Role::Admin);
    h.posts.delete(admin, id).await.unwrap();
    assert!(h.repos.posts.find_by_id(id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_published_at_is_set_once() {
    let h = Harness::new();
    let alice = h.register("alice").await;
    let id = h.publish(&alice, "Timeless").await;
    let first = h.repos.posts.find_by_id(id).await.unwrap().unwrap();
    let published_at = first.published_at.unwrap();

    for status in [PostStatus::Archived, PostStatus::Published] {
        h.posts
            .update(
                actor(&alice),
                id,
                PostChanges {
                    status: Some(status),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    let post = h.repos.posts.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(post.published_at, Some(published_at));
}

#[tokio::test]
async fn test_like_transitions() {
    let h = Harness::new();
    let alice = h.register("alice").await;
    let bob = h.register("bob").await;
    let id = h.publish(&alice, "Likeable").await;

    let err = h.posts.unlike(actor(&bob), id).await.unwrap_err();
    assert!(matches!(err, DomainError::BadRequest(_)));

    assert_eq!(h.posts.like(actor(&bob), id).await.unwrap(), 1);
    let err = h.posts.like(actor(&bob), id).await.unwrap_err();
    assert!(matches!(err, DomainError::BadRequest(msg) if msg == "Post already liked"));

    assert_eq!(h.posts.unlike(actor(&bob), id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_blank_excerpt_uses_content_preview() {
    let h = Harness::new();
    let alice = h.register("alice").await;

    let created = h
        .posts
        .create(
            actor(&alice),
            NewPost {
                title: "Excerpted".to_string(),
                content: "Body of the post".to_string(),
                excerpt: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(created.post.excerpt, "Body of the post...");

    let updated = h
        .posts
        .update(
            actor(&alice),
            created.post.id,
            PostChanges {
                content: Some("Rewritten body".to_string()),
                excerpt: Some("   ".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.post.excerpt, "Rewritten body...");
}

#[tokio::test]
async fn test_read_by_slug_counts_views_and_hides_drafts() {
    let h = Harness::new();
    let alice = h.register("alice").await;
    h.publish(&alice, "Visible").await;
    h.posts
        .create(
            actor(&alice),
            NewPost {
                title: "Hidden".to_string(),
                content: "draft".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let entry = h.posts.read_by_slug("visible").await.unwrap();
    assert_eq!(entry.post.view_count, 1);
    let entry = h.posts.read_by_slug("visible").await.unwrap();
    assert_eq!(entry.post.view_count, 2);

    let err = h.posts.read_by_slug("hidden").await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn test_listing_paginates() {
    let h = Harness::new();
    let alice = h.register("alice").await;
    for i in 0..25 {
        h.publish(&alice, &format!("Post {i}")).await;
    }

    let page = h
        .posts
        .list_published(PostQuery::default(), PageRequest::new(Some(2), Some(10)))
        .await
        .unwrap();
    assert_eq!(page.items.len(), 10);

    let pagination = page.pagination();
    assert_eq!(pagination.total, 25);
    assert_eq!(pagination.pages, 3);
    assert_eq!(pagination.page, 2);
}

#[tokio::test]
async fn test_follow_rules_and_feed() {
    let h = Harness::new();
    let alice = h.register("alice").await;
    let bob = h.register("bob").await;
    let carol = h.register("carol").await;

    let err = h.users.follow(actor(&alice), alice.id).await.unwrap_err();
    assert!(matches!(err, DomainError::BadRequest(_)));
    let err = h.users.unfollow(actor(&alice), bob.id).await.unwrap_err();
    assert!(matches!(err, DomainError::BadRequest(_)));

    h.users.follow(actor(&alice), bob.id).await.unwrap();
    let err = h.users.follow(actor(&alice), bob.id).await.unwrap_err();
    assert!(matches!(err, DomainError::BadRequest(_)));

    let followers = h.users.followers(bob.id).await.unwrap();
    assert_eq!(followers.len(), 1);
    assert_eq!(followers[0].id, alice.id);

    let from_bob = h.publish(&bob, "From Bob").await;
    h.publish(&carol, "From Carol").await;

    let feed = h.posts.feed(alice.id, PageRequest::default()).await.unwrap();
    let ids: Vec<Uuid> = feed.items.iter().map(|e| e.post.id).collect();
    assert_eq!(ids, vec![from_bob]);

    let empty = h.posts.feed(carol.id, PageRequest::default()).await.unwrap();
    assert_eq!(empty.total, 0);
}

#[tokio::test]
async fn test_replies_are_one_level_deep() {
    let h = Harness::new();
    let alice = h.register("alice").await;
    let bob = h.register("bob").await;
    let post = h.publish(&alice, "Discuss").await;
    let other = h.publish(&alice, "Elsewhere").await;

    let top = h.comment(&bob, post, None).await;
    let reply = h.comment(&alice, post, Some(top)).await;

    let nested = h
        .comments
        .create(
            actor(&bob),
            NewComment {
                post_id: post,
                parent_id: Some(reply),
                content: "deeper".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(nested, DomainError::Validation(_)));

    let cross_post = h
        .comments
        .create(
            actor(&bob),
            NewComment {
                post_id: other,
                parent_id: Some(top),
                content: "wrong post".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(cross_post, DomainError::Validation(_)));

    let listed = h
        .comments
        .list_for_post(post, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(listed.total, 1);
    assert_eq!(listed.items[0].reply_count, 1);
    assert_eq!(listed.items[0].replies[0].comment.id, reply);
}

#[tokio::test]
async fn test_comment_edit_and_delete_thread() {
    let h = Harness::new();
    let alice = h.register("alice").await;
    let bob = h.register("bob").await;
    let post = h.publish(&alice, "Thread").await;
    let top = h.comment(&bob, post, None).await;
    h.comment(&alice, post, Some(top)).await;

    let err = h
        .comments
        .update(actor(&alice), top, "hijack")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));

    let edited = h.comments.update(actor(&bob), top, " fixed typo ").await.unwrap();
    assert!(edited.comment.is_edited);
    assert!(edited.comment.edited_at.is_some());
    assert_eq!(edited.comment.content, "fixed typo");

    h.comments.delete(actor(&bob), top).await.unwrap();
    assert_eq!(h.repos.comments.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_delete_post_removes_its_comments() {
    let h = Harness::new();
    let alice = h.register("alice").await;
    let bob = h.register("bob").await;
    let doomed = h.publish(&alice, "Doomed").await;
    let kept = h.publish(&alice, "Kept").await;

    let top = h.comment(&bob, doomed, None).await;
    h.comment(&alice, doomed, Some(top)).await;
    h.comment(&bob, doomed, None).await;
    let survivor = h.comment(&bob, kept, None).await;

    h.posts.delete(actor(&alice), doomed).await.unwrap();

    assert!(h.repos.posts.find_by_id(doomed).await.unwrap().is_none());
    assert_eq!(h.repos.comments.count().await.unwrap(), 1);
    assert!(h.repos.comments.find_by_id(survivor).await.unwrap().is_some());
}

#[tokio::test]
async fn test_comment_like_transitions() {
    let h = Harness::new();
    let alice = h.register("alice").await;
    let bob = h.register("bob").await;
    let post = h.publish(&alice, "Chatty").await;
    let id = h.comment(&alice, post, None).await;

    let err = h.comments.unlike(actor(&bob), id).await.unwrap_err();
    assert!(matches!(err, DomainError::BadRequest(msg) if msg == "Comment not liked"));

    assert_eq!(h.comments.like(actor(&bob), id).await.unwrap(), 1);
    let err = h.comments.like(actor(&bob), id).await.unwrap_err();
    assert!(matches!(err, DomainError::BadRequest(msg) if msg == "Comment already liked"));
    assert_eq!(h.comments.like(actor(&alice), id).await.unwrap(), 2);

    assert_eq!(h.comments.unlike(actor(&bob), id).await.unwrap(), 1);
    let err = h.comments.like(actor(&bob), Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn test_delete_user_cascades() {
    let h = Harness::new();
    let alice = h.register("alice").await;
    let bob = h.register("bob").await;
    let staff = Actor::new(Uuid::new_v4(), Role::Moderator);

    h.users.follow(actor(&bob), alice.id).await.unwrap();
    h.users.follow(actor(&alice), bob.id).await.unwrap();

    let alice_post = h.publish(&alice, "Alice writes").await;
    let bob_post = h.publish(&bob, "Bob writes").await;
    h.comment(&bob, alice_post, None).await;
    let on_bob = h.comment(&alice, bob_post, None).await;
    h.comment(&bob, bob_post, Some(on_bob)).await;
    h.comment(&bob, bob_post, None).await;

    h.admin.delete_user(staff, alice.id).await.unwrap();

    assert!(h.repos.users.find_by_id(alice.id).await.unwrap().is_none());
    assert!(h.repos.posts.find_by_id(alice_post).await.unwrap().is_none());
    // Only Bob's top-level comment on his own post survives.
    assert_eq!(h.repos.comments.count().await.unwrap(), 1);

    let bob = h.repos.users.find_by_id(bob.id).await.unwrap().unwrap();
    assert!(bob.followers.is_empty());
    assert!(bob.following.is_empty());
}

#[tokio::test]
async fn test_admin_requires_staff_role() {
    let h = Harness::new();
    let alice = h.register("alice").await;
    h.publish(&alice, "Counted").await;

    let err = h.admin.dashboard(actor(&alice)).await.unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));

    let stats = h
        .admin
        .dashboard(Actor::new(alice.id, Role::Admin))
        .await
        .unwrap();
    assert_eq!(stats.total_users, 1);
    assert_eq!(stats.published_posts, 1);
    assert_eq!(stats.draft_posts, 0);
    assert_eq!(stats.monthly_users.iter().map(|m| m.count).sum::<u64>(), 1);
}
