use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Category, Comment, Page, PageRequest, Post, PostStatus, Role, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Persist a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Which user fields a free-text search looks at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UserSearchScope {
    /// username, first name, last name, bio
    #[default]
    Profile,
    /// username, email, first name, last name
    Account,
}

/// Filters for listing users. Results are ordered newest first.
#[derive(Debug, Clone, Default)]
pub struct UserQuery {
    pub search: Option<String>,
    pub role: Option<Role>,
    pub scope: UserSearchScope,
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their (normalized) email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    /// Fetch every user in `ids`; unknown ids are skipped.
    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError>;

    async fn list(&self, query: &UserQuery, page: PageRequest) -> Result<Page<User>, RepoError>;

    async fn count(&self) -> Result<u64, RepoError>;

    /// Creation timestamps of users registered at or after `since`.
    async fn created_since(&self, since: DateTime<Utc>) -> Result<Vec<DateTime<Utc>>, RepoError>;

    /// Strip `user_id` from every other user's followers and following lists.
    async fn remove_from_follow_graph(&self, user_id: Uuid) -> Result<u64, RepoError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PostSort {
    #[default]
    PublishedAt,
    CreatedAt,
    Title,
    ViewCount,
}

/// Filters for listing posts.
#[derive(Debug, Clone, Default)]
pub struct PostQuery {
    pub status: Option<PostStatus>,
    pub category: Option<Category>,
    pub author: Option<Uuid>,
    /// Restrict to any of these authors (feed). An empty list matches nothing.
    pub authors: Option<Vec<Uuid>>,
    /// Case-insensitive match on title, content, or any tag.
    pub search: Option<String>,
    pub sort: PostSort,
    pub order: SortOrder,
}

impl PostQuery {
    pub fn published() -> Self {
        Self {
            status: Some(PostStatus::Published),
            ..Default::default()
        }
    }
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError>;

    /// Whether a post other than `except` already uses `slug`.
    async fn slug_taken(&self, slug: &str, except: Option<Uuid>) -> Result<bool, RepoError>;

    async fn list(&self, query: &PostQuery, page: PageRequest) -> Result<Page<Post>, RepoError>;

    async fn count(&self, query: &PostQuery) -> Result<u64, RepoError>;

    /// Number of posts per category, largest first.
    async fn count_by_category(&self) -> Result<Vec<(Category, u64)>, RepoError>;

    async fn find_ids_by_author(&self, author_id: Uuid) -> Result<Vec<Uuid>, RepoError>;

    async fn delete_by_author(&self, author_id: Uuid) -> Result<u64, RepoError>;

    async fn increment_views(&self, id: Uuid) -> Result<(), RepoError>;
}

/// Which comments to match by thread position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ThreadFilter {
    #[default]
    Any,
    TopLevel,
    RepliesTo(Uuid),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CommentSort {
    #[default]
    NewestFirst,
    OldestFirst,
}

#[derive(Debug, Clone, Default)]
pub struct CommentQuery {
    pub post: Option<Uuid>,
    pub thread: ThreadFilter,
    pub sort: CommentSort,
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    async fn list(&self, query: &CommentQuery, page: PageRequest)
    -> Result<Page<Comment>, RepoError>;

    /// Every reply to any of `parent_ids`, oldest first.
    async fn find_replies(&self, parent_ids: &[Uuid]) -> Result<Vec<Comment>, RepoError>;

    async fn count(&self) -> Result<u64, RepoError>;

    /// Number of comments per post, for the given posts.
    async fn count_by_posts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, u64>, RepoError>;

    /// Delete a comment together with its direct replies.
    async fn delete_thread(&self, id: Uuid) -> Result<u64, RepoError>;

    async fn delete_by_posts(&self, post_ids: &[Uuid]) -> Result<u64, RepoError>;

    /// Delete every comment written by `author_id` and the direct replies to them.
    async fn delete_by_author(&self, author_id: Uuid) -> Result<u64, RepoError>;
}
