use uuid::Uuid;

use crate::domain::{NAME_LENGTH, Page, PageRequest, User, trimmed_field};
use crate::error::{DomainError, DomainResult};
use crate::ports::{PostQuery, UserQuery};

use super::{Actor, PostEntry, Repositories, populate_posts};

/// Number of recent posts shown on a profile page.
pub const PROFILE_RECENT_POSTS: u64 = 5;

/// Partial profile update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
}

/// A public profile with the user's latest published posts.
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub user: User,
    pub recent_posts: Vec<PostEntry>,
}

#[derive(Clone)]
pub struct UserService {
    repos: Repositories,
}

impl UserService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn list(&self, search: Option<String>, page: PageRequest) -> DomainResult<Page<User>> {
        let query = UserQuery {
            search,
            ..Default::default()
        };
        Ok(self.repos.users.list(&query, page).await?)
    }

    pub async fn profile(&self, id: Uuid) -> DomainResult<UserProfile> {
        let user = self.repos.require_user(id).await?;
        let query = PostQuery {
            author: Some(id),
            ..PostQuery::published()
        };
        let recent = self
            .repos
            .posts
            .list(&query, PageRequest::new(Some(1), Some(PROFILE_RECENT_POSTS)))
            .await?;
        let recent_posts = populate_posts(&self.repos, recent.items).await?;

        Ok(UserProfile { user, recent_posts })
    }

    pub async fn update_profile(&self, actor: Actor, changes: ProfileChanges) -> DomainResult<User> {
        let first_name = changes
            .first_name
            .map(|v| trimmed_field("firstName", "First name", &v, NAME_LENGTH))
            .transpose();
        let last_name = changes
            .last_name
            .map(|v| trimmed_field("lastName", "Last name", &v, NAME_LENGTH))
            .transpose();
        let (first_name, last_name) = match (first_name, last_name) {
            (Ok(f), Ok(l)) => (f, l),
            (f, l) => {
                let errors = [f.err(), l.err()].into_iter().flatten().collect();
                return Err(DomainError::Validation(errors));
            }
        };

        let mut user = self.repos.require_user(actor.id).await?;
        if let Some(first_name) = first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = last_name {
            user.last_name = last_name;
        }
        if let Some(bio) = changes.bio {
            user.bio = bio;
        }
        if let Some(avatar) = changes.avatar {
            user.avatar = avatar;
        }
        user.touch();

        Ok(self.repos.users.update(user).await?)
    }

    /// Make the actor follow `target_id`, updating both sides of the edge.
    pub async fn follow(&self, actor: Actor, target_id: Uuid) -> DomainResult<()> {
        if actor.id == target_id {
            return Err(DomainError::BadRequest(
                "You cannot follow yourself".to_string(),
            ));
        }

        let mut target = self.repos.require_user(target_id).await?;
        let mut current = self.repos.require_user(actor.id).await?;

        if current.is_following(target_id) {
            return Err(DomainError::BadRequest(
                "You are already following this user".to_string(),
            ));
        }

        current.following.push(target_id);
        current.touch();
        if !target.followers.contains(&actor.id) {
            target.followers.push(actor.id);
        }
        target.touch();

        self.repos.users.update(current).await?;
        self.repos.users.update(target).await?;
        tracing::debug!(follower = %actor.id, followee = %target_id, "Follow added");
        Ok(())
    }

    pub async fn unfollow(&self, actor: Actor, target_id: Uuid) -> DomainResult<()> {
        let mut target = self.repos.require_user(target_id).await?;
        let mut current = self.repos.require_user(actor.id).await?;

        if !current.is_following(target_id) {
            return Err(DomainError::BadRequest(
                "You are not following this user".to_string(),
            ));
        }

        current.following.retain(|id| *id != target_id);
        current.touch();
        target.followers.retain(|id| *id != actor.id);
        target.touch();

        self.repos.users.update(current).await?;
        self.repos.users.update(target).await?;
        tracing::debug!(follower = %actor.id, followee = %target_id, "Follow removed");
        Ok(())
    }

    pub async fn followers(&self, id: Uuid) -> DomainResult<Vec<User>> {
        let user = self.repos.require_user(id).await?;
        self.resolve(&user.followers).await
    }

    pub async fn following(&self, id: Uuid) -> DomainResult<Vec<User>> {
        let user = self.repos.require_user(id).await?;
        self.resolve(&user.following).await
    }

    /// Load users in the order of `ids`.
    async fn resolve(&self, ids: &[Uuid]) -> DomainResult<Vec<User>> {
        let mut by_id = self.repos.users_by_id(ids.iter().copied()).await?;
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }
}
