use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Months, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Category, Page, PageRequest, PostStatus, Role, User};
use crate::error::{DomainError, DomainResult};
use crate::ports::{CommentQuery, CommentSort, PostQuery, PostSort, UserQuery, UserSearchScope};

use super::{Actor, CommentEntry, PostEntry, Repositories, populate_posts};

const DASHBOARD_RECENT: u64 = 5;
const REGISTRATION_WINDOW_MONTHS: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: Category,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthlyCount {
    pub year: i32,
    pub month: u32,
    pub count: u64,
}

#[derive(Debug, Clone)]
pub struct DashboardStats {
    pub total_users: u64,
    pub total_posts: u64,
    pub total_comments: u64,
    pub published_posts: u64,
    pub draft_posts: u64,
    pub recent_users: Vec<User>,
    pub recent_posts: Vec<PostEntry>,
    pub posts_by_category: Vec<CategoryCount>,
    pub monthly_users: Vec<MonthlyCount>,
}

#[derive(Debug, Clone, Default)]
pub struct UserAdminChanges {
    pub role: Option<Role>,
    pub is_verified: Option<bool>,
}

/// Moderation operations. Every call requires an admin or moderator actor.
#[derive(Clone)]
pub struct AdminService {
    repos: Repositories,
}

impl AdminService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn dashboard(&self, actor: Actor) -> DomainResult<DashboardStats> {
        actor.require_staff()?;
        let repos = &self.repos;

        let total_users = repos.users.count().await?;
        let total_posts = repos.posts.count(&PostQuery::default()).await?;
        let total_comments = repos.comments.count().await?;
        let published_posts = repos.posts.count(&PostQuery::published()).await?;
        let draft_posts = repos
            .posts
            .count(&PostQuery {
                status: Some(PostStatus::Draft),
                ..Default::default()
            })
            .await?;

        let recent = PageRequest::new(Some(1), Some(DASHBOARD_RECENT));
        let recent_users = repos.users.list(&UserQuery::default(), recent).await?.items;
        let newest_posts = PostQuery {
            sort: PostSort::CreatedAt,
            ..Default::default()
        };
        let newest = repos.posts.list(&newest_posts, recent).await?.items;
        let recent_posts = populate_posts(repos, newest).await?;

        let posts_by_category = repos
            .posts
            .count_by_category()
            .await?
            .into_iter()
            .map(|(category, count)| CategoryCount { category, count })
            .collect();

        let since = Utc::now()
            .checked_sub_months(Months::new(REGISTRATION_WINDOW_MONTHS))
            .unwrap_or_else(Utc::now);
        let mut months: BTreeMap<(i32, u32), u64> = BTreeMap::new();
        for created in repos.users.created_since(since).await? {
            *months.entry((created.year(), created.month())).or_default() += 1;
        }
        let monthly_users = months
            .into_iter()
            .map(|((year, month), count)| MonthlyCount { year, month, count })
            .collect();

        Ok(DashboardStats {
            total_users,
            total_posts,
            total_comments,
            published_posts,
            draft_posts,
            recent_users,
            recent_posts,
            posts_by_category,
            monthly_users,
        })
    }

    pub async fn list_users(
        &self,
        actor: Actor,
        search: Option<String>,
        role: Option<Role>,
        page: PageRequest,
    ) -> DomainResult<Page<User>> {
        actor.require_staff()?;
        let query = UserQuery {
            search,
            role,
            scope: UserSearchScope::Account,
        };
        Ok(self.repos.users.list(&query, page).await?)
    }

    pub async fn update_user(
        &self,
        actor: Actor,
        id: Uuid,
        changes: UserAdminChanges,
    ) -> DomainResult<User> {
        actor.require_staff()?;
        let mut user = self.repos.require_user(id).await?;
        if let Some(role) = changes.role {
            user.role = role;
        }
        if let Some(verified) = changes.is_verified {
            user.is_verified = verified;
        }
        user.touch();

        let user = self.repos.users.update(user).await?;
        tracing::info!(admin = %actor.id, user_id = %user.id, role = %user.role, "User updated by staff");
        Ok(user)
    }

    pub async fn delete_user(&self, actor: Actor, id: Uuid) -> DomainResult<()> {
        actor.require_staff()?;
        let user = self.repos.require_user(id).await?;
        self.repos.delete_user_cascade(user.id).await
    }

    pub async fn list_posts(
        &self,
        actor: Actor,
        status: Option<PostStatus>,
        category: Option<Category>,
        page: PageRequest,
    ) -> DomainResult<Page<PostEntry>> {
        actor.require_staff()?;
        let query = PostQuery {
            status,
            category,
            sort: PostSort::CreatedAt,
            ..Default::default()
        };
        let found = self.repos.posts.list(&query, page).await?;
        let entries = populate_posts(&self.repos, found.items).await?;
        Ok(Page::new(entries, found.total, found.request))
    }

    pub async fn set_post_status(
        &self,
        actor: Actor,
        id: Uuid,
        status: PostStatus,
    ) -> DomainResult<PostEntry> {
        actor.require_staff()?;
        let mut post = self.repos.require_post(id).await?;
        post.set_status(status);
        post.touch();
        let post = self.repos.posts.update(post).await?;

        populate_posts(&self.repos, vec![post])
            .await?
            .pop()
            .ok_or_else(|| DomainError::Internal("post population returned nothing".to_string()))
    }

    pub async fn delete_post(&self, actor: Actor, id: Uuid) -> DomainResult<()> {
        actor.require_staff()?;
        let post = self.repos.require_post(id).await?;
        self.repos.delete_post_cascade(post.id).await
    }

    /// Every comment, newest first, with author and post populated.
    pub async fn list_comments(
        &self,
        actor: Actor,
        page: PageRequest,
    ) -> DomainResult<Page<CommentEntry>> {
        actor.require_staff()?;
        let query = CommentQuery {
            sort: CommentSort::NewestFirst,
            ..Default::default()
        };
        let found = self.repos.comments.list(&query, page).await?;

        let authors = self
            .repos
            .users_by_id(found.items.iter().map(|c| c.author_id))
            .await?;
        let mut posts = HashMap::new();
        for post_id in found.items.iter().map(|c| c.post_id) {
            if posts.contains_key(&post_id) {
                continue;
            }
            if let Some(post) = self.repos.posts.find_by_id(post_id).await? {
                posts.insert(post_id, post);
            }
        }

        Ok(found.map(|comment| {
            let author = authors.get(&comment.author_id).cloned();
            let post = posts.get(&comment.post_id).cloned();
            let mut entry = CommentEntry::new(comment, author);
            entry.post = post;
            entry
        }))
    }

    pub async fn delete_comment(&self, actor: Actor, id: Uuid) -> DomainResult<()> {
        actor.require_staff()?;
        let comment = self.repos.require_comment(id).await?;
        let removed = self.repos.comments.delete_thread(comment.id).await?;
        tracing::info!(admin = %actor.id, comment_id = %comment.id, removed, "Comment removed by staff");
        Ok(())
    }
}
