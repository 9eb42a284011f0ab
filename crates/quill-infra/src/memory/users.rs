use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{Page, PageRequest, User};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, UserQuery, UserRepository, UserSearchScope};

use super::contains_ci;

/// In-memory user repository. Email and username are unique.
#[derive(Default)]
pub struct InMemoryUserRepository {
    store: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn conflicts(store: &HashMap<Uuid, User>, user: &User) -> bool {
        store.values().any(|other| {
            other.id != user.id && (other.email == user.email || other.username == user.username)
        })
    }

    fn matches(user: &User, query: &UserQuery, needle: Option<&str>) -> bool {
        if query.role.is_some_and(|role| role != user.role) {
            return false;
        }
        let Some(needle) = needle else {
            return true;
        };
        let fourth = match query.scope {
            UserSearchScope::Profile => user.bio.as_str(),
            UserSearchScope::Account => user.email.as_str(),
        };
        [
            user.username.as_str(),
            user.first_name.as_str(),
            user.last_name.as_str(),
            fourth,
        ]
        .iter()
        .any(|f| contains_ci(f, needle))
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut store = self.store.write().await;
        if store.contains_key(&user.id) || Self::conflicts(&store, &user) {
            return Err(RepoError::Constraint("User already exists".to_string()));
        }
        store.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut store = self.store.write().await;
        if !store.contains_key(&user.id) {
            return Err(RepoError::NotFound);
        }
        if Self::conflicts(&store, &user) {
            return Err(RepoError::Constraint("User already exists".to_string()));
        }
        store.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.store
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let store = self.store.read().await;
        Ok(store.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let store = self.store.read().await;
        Ok(store.values().find(|u| u.username == username).cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError> {
        let store = self.store.read().await;
        Ok(ids.iter().filter_map(|id| store.get(id).cloned()).collect())
    }

    async fn list(&self, query: &UserQuery, page: PageRequest) -> Result<Page<User>, RepoError> {
        let needle = query.search.as_deref().map(str::to_lowercase);
        let store = self.store.read().await;

        let mut matched: Vec<&User> = store
            .values()
            .filter(|u| Self::matches(u, query, needle.as_deref()))
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));

        let total = matched.len() as u64;
        let items = page.slice(matched.into_iter().cloned());
        Ok(Page::new(items, total, page))
    }

    async fn count(&self) -> Result<u64, RepoError> {
        Ok(self.store.read().await.len() as u64)
    }

    async fn created_since(&self, since: DateTime<Utc>) -> Result<Vec<DateTime<Utc>>, RepoError> {
        let store = self.store.read().await;
        Ok(store
            .values()
            .map(|u| u.created_at)
            .filter(|created| *created >= since)
            .collect())
    }

    async fn remove_from_follow_graph(&self, user_id: Uuid) -> Result<u64, RepoError> {
        let mut store = self.store.write().await;
        let mut touched = 0;
        for user in store.values_mut() {
            let before = user.followers.len() + user.following.len();
            user.followers.retain(|id| *id != user_id);
            user.following.retain(|id| *id != user_id);
            if user.followers.len() + user.following.len() != before {
                touched += 1;
            }
        }
        Ok(touched)
    }
}
