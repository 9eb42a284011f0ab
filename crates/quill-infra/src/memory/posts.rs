use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{Category, Page, PageRequest, Post};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, PostQuery, PostRepository, PostSort, SortOrder};

use super::contains_ci;

/// In-memory post repository. Slugs are unique.
#[derive(Default)]
pub struct InMemoryPostRepository {
    store: RwLock<HashMap<Uuid, Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn matches(post: &Post, query: &PostQuery, needle: Option<&str>) -> bool {
        if query.status.is_some_and(|s| s != post.status) {
            return false;
        }
        if query.category.is_some_and(|c| c != post.category) {
            return false;
        }
        if query.author.is_some_and(|a| a != post.author_id) {
            return false;
        }
        if let Some(authors) = &query.authors {
            if !authors.contains(&post.author_id) {
                return false;
            }
        }
        match needle {
            Some(needle) => {
                contains_ci(&post.title, needle)
                    || contains_ci(&post.content, needle)
                    || post.tags.iter().any(|t| contains_ci(t, needle))
            }
            None => true,
        }
    }

    fn compare(a: &Post, b: &Post, sort: PostSort) -> Ordering {
        match sort {
            PostSort::PublishedAt => a.published_at.cmp(&b.published_at),
            PostSort::CreatedAt => a.created_at.cmp(&b.created_at),
            PostSort::Title => a.title.cmp(&b.title),
            PostSort::ViewCount => a.view_count.cmp(&b.view_count),
        }
        .then(a.created_at.cmp(&b.created_at))
    }

    fn filtered(store: &HashMap<Uuid, Post>, query: &PostQuery) -> Vec<Post> {
        let needle = query.search.as_deref().map(str::to_lowercase);
        let mut matched: Vec<Post> = store
            .values()
            .filter(|p| Self::matches(p, query, needle.as_deref()))
            .cloned()
            .collect();
        matched.sort_by(|a, b| {
            let ord = Self::compare(a, b, query.sort);
            match query.order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });
        matched
    }

    fn slug_conflict(store: &HashMap<Uuid, Post>, post: &Post) -> bool {
        store
            .values()
            .any(|other| other.id != post.id && other.slug == post.slug)
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;
        if store.contains_key(&post.id) || Self::slug_conflict(&store, &post) {
            return Err(RepoError::Constraint(format!("Slug '{}' already exists", post.slug)));
        }
        store.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;
        if !store.contains_key(&post.id) {
            return Err(RepoError::NotFound);
        }
        if Self::slug_conflict(&store, &post) {
            return Err(RepoError::Constraint(format!("Slug '{}' already exists", post.slug)));
        }
        store.insert(post.id, post.clone());
        Ok(post)
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
impl PostRepository for InMemoryPostRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let store = self.store.read().await;
        Ok(store.values().find(|p| p.slug == slug).cloned())
    }

    async fn slug_taken(&self, slug: &str, except: Option<Uuid>) -> Result<bool, RepoError> {
        let store = self.store.read().await;
        Ok(store
            .values()
            .any(|p| p.slug == slug && Some(p.id) != except))
    }

    async fn list(&self, query: &PostQuery, page: PageRequest) -> Result<Page<Post>, RepoError> {
        let store = self.store.read().await;
        let matched = Self::filtered(&store, query);
        let total = matched.len() as u64;
        Ok(Page::new(page.slice(matched), total, page))
    }

    async fn count(&self, query: &PostQuery) -> Result<u64, RepoError> {
        let store = self.store.read().await;
        Ok(Self::filtered(&store, query).len() as u64)
    }

    async fn count_by_category(&self) -> Result<Vec<(Category, u64)>, RepoError> {
        let store = self.store.read().await;
        let mut counts: HashMap<Category, u64> = HashMap::new();
        for post in store.values() {
            *counts.entry(post.category).or_default() += 1;
        }
        let mut counts: Vec<(Category, u64)> = counts.into_iter().collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.as_str().cmp(b.0.as_str())));
        Ok(counts)
    }

    async fn find_ids_by_author(&self, author_id: Uuid) -> Result<Vec<Uuid>, RepoError> {
        let store = self.store.read().await;
        Ok(store
            .values()
            .filter(|p| p.author_id == author_id)
            .map(|p| p.id)
            .collect())
    }

    async fn delete_by_author(&self, author_id: Uuid) -> Result<u64, RepoError> {
        let mut store = self.store.write().await;
        let before = store.len();
        store.retain(|_, p| p.author_id != author_id);
        Ok((before - store.len()) as u64)
    }

    async fn increment_views(&self, id: Uuid) -> Result<(), RepoError> {
        let mut store = self.store.write().await;
        let post = store.get_mut(&id).ok_or(RepoError::NotFound)?;
        post.view_count += 1;
        Ok(())
    }
}
