//! Domain services. Each operation runs the same pipeline: authorization
//! check, reads/writes through the repository ports, and population of the
//! related documents the API returns.

mod admin;
mod auth;
mod comments;
mod posts;
mod users;

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Comment, Post, Role, User};
use crate::error::{DomainError, DomainResult};
use crate::ports::{CommentRepository, PostRepository, UserRepository};

pub use admin::{AdminService, CategoryCount, DashboardStats, MonthlyCount, UserAdminChanges};
pub use auth::{AuthService, AuthSession, Registration};
pub use comments::{CommentService, NewComment};
pub use posts::{NewPost, PostChanges, PostService};
pub use users::{ProfileChanges, UserProfile, UserService};

/// The authenticated caller of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Owners may always act on their own documents; admins on anyone's.
    pub fn can_modify(&self, owner_id: Uuid) -> bool {
        self.id == owner_id || self.is_admin()
    }

    pub fn require_staff(&self) -> DomainResult<()> {
        if self.role.is_staff() {
            Ok(())
        } else {
            Err(DomainError::Forbidden(
                "Admin or moderator role required".to_string(),
            ))
        }
    }
}

/// Handles to every repository port, shared by the services.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
}

impl Repositories {
    pub fn new(
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
    ) -> Self {
        Self {
            users,
            posts,
            comments,
        }
    }

    /// Load the authors of a batch of documents keyed by id.
    pub(crate) async fn users_by_id(
        &self,
        ids: impl IntoIterator<Item = Uuid>,
    ) -> DomainResult<HashMap<Uuid, User>> {
        let mut ids: Vec<Uuid> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let users = self.users.find_many(&ids).await?;
        Ok(users.into_iter().map(|u| (u.id, u)).collect())
    }

    pub(crate) async fn require_user(&self, id: Uuid) -> DomainResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or(DomainError::not_found("User", id))
    }

    pub(crate) async fn require_post(&self, id: Uuid) -> DomainResult<Post> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or(DomainError::not_found("Post", id))
    }

    pub(crate) async fn require_comment(&self, id: Uuid) -> DomainResult<Comment> {
        self.comments
            .find_by_id(id)
            .await?
            .ok_or(DomainError::not_found("Comment", id))
    }

    /// Delete a post and every comment on it.
    pub(crate) async fn delete_post_cascade(&self, post_id: Uuid) -> DomainResult<()> {
        let removed = self.comments.delete_by_posts(&[post_id]).await?;
        self.posts.delete(post_id).await?;
        tracing::info!(%post_id, comments_removed = removed, "Post deleted");
        Ok(())
    }

    /// Delete a user together with everything that references them.
    pub(crate) async fn delete_user_cascade(&self, user_id: Uuid) -> DomainResult<()> {
        let post_ids = self.posts.find_ids_by_author(user_id).await?;
        let comments_on_posts = self.comments.delete_by_posts(&post_ids).await?;
        let posts_removed = self.posts.delete_by_author(user_id).await?;
        let own_comments = self.comments.delete_by_author(user_id).await?;
        let scrubbed = self.users.remove_from_follow_graph(user_id).await?;
        self.users.delete(user_id).await?;

        tracing::info!(
            %user_id,
            posts_removed,
            comments_removed = comments_on_posts + own_comments,
            follow_lists_scrubbed = scrubbed,
            "User deleted"
        );
        Ok(())
    }
}

/// A post with its author populated.
#[derive(Debug, Clone)]
pub struct PostEntry {
    pub post: Post,
    pub author: Option<User>,
    pub comment_count: u64,
}

/// A comment with its author populated and, for top-level comments, replies.
#[derive(Debug, Clone)]
pub struct CommentEntry {
    pub comment: Comment,
    pub author: Option<User>,
    pub replies: Vec<CommentEntry>,
    pub reply_count: u64,
    /// The commented post, populated only for moderation listings.
    pub post: Option<Post>,
}

impl CommentEntry {
    pub(crate) fn new(comment: Comment, author: Option<User>) -> Self {
        Self {
            comment,
            author,
            replies: Vec::new(),
            reply_count: 0,
            post: None,
        }
    }
}

/// Populate authors and comment counts for a batch of posts.
pub(crate) async fn populate_posts(
    repos: &Repositories,
    posts: Vec<Post>,
) -> DomainResult<Vec<PostEntry>> {
    let ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
    let authors = repos.users_by_id(posts.iter().map(|p| p.author_id)).await?;
    let counts = if ids.is_empty() {
        HashMap::new()
    } else {
        repos.comments.count_by_posts(&ids).await?
    };

    Ok(posts
        .into_iter()
        .map(|post| PostEntry {
            author: authors.get(&post.author_id).cloned(),
            comment_count: counts.get(&post.id).copied().unwrap_or(0),
            post,
        })
        .collect())
}
