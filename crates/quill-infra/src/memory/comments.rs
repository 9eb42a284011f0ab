use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{Comment, Page, PageRequest};
use quill_core::error::RepoError;
use quill_core::ports::{
    BaseRepository, CommentQuery, CommentRepository, CommentSort, ThreadFilter,
};

/// In-memory comment repository.
#[derive(Default)]
pub struct InMemoryCommentRepository {
    store: RwLock<HashMap<Uuid, Comment>>,
}

impl InMemoryCommentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn matches(comment: &Comment, query: &CommentQuery) -> bool {
        if query.post.is_some_and(|p| p != comment.post_id) {
            return false;
        }
        match query.thread {
            ThreadFilter::Any => true,
            ThreadFilter::TopLevel => comment.parent_id.is_none(),
            ThreadFilter::RepliesTo(parent) => comment.parent_id == Some(parent),
        }
    }

    fn sorted(mut comments: Vec<Comment>, sort: CommentSort) -> Vec<Comment> {
        comments.sort_by(|a, b| {
            let ord = a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id));
            match sort {
                CommentSort::OldestFirst => ord,
                CommentSort::NewestFirst => ord.reverse(),
            }
        });
        comments
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for InMemoryCommentRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn insert(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut store = self.store.write().await;
        if store.contains_key(&comment.id) {
            return Err(RepoError::Constraint("Comment already exists".to_string()));
        }
        store.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn update(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut store = self.store.write().await;
        if !store.contains_key(&comment.id) {
            return Err(RepoError::NotFound);
        }
        store.insert(comment.id, comment.clone());
        Ok(comment)
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
impl CommentRepository for InMemoryCommentRepository {
    async fn list(
        &self,
        query: &CommentQuery,
        page: PageRequest,
    ) -> Result<Page<Comment>, RepoError> {
        let store = self.store.read().await;
        let matched: Vec<Comment> = store
            .values()
            .filter(|c| Self::matches(c, query))
            .cloned()
            .collect();
        let total = matched.len() as u64;
        let items = page.slice(Self::sorted(matched, query.sort));
        Ok(Page::new(items, total, page))
    }

    async fn find_replies(&self, parent_ids: &[Uuid]) -> Result<Vec<Comment>, RepoError> {
        let parents: HashSet<&Uuid> = parent_ids.iter().collect();
        let store = self.store.read().await;
        let replies = store
            .values()
            .filter(|c| c.parent_id.as_ref().is_some_and(|p| parents.contains(p)))
            .cloned()
            .collect();
        Ok(Self::sorted(replies, CommentSort::OldestFirst))
    }

    async fn count(&self) -> Result<u64, RepoError> {
        Ok(self.store.read().await.len() as u64)
    }

    async fn count_by_posts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, u64>, RepoError> {
        let store = self.store.read().await;
        let mut counts = HashMap::new();
        for comment in store.values().filter(|c| post_ids.contains(&c.post_id)) {
            *counts.entry(comment.post_id).or_default() += 1;
        }
        Ok(counts)
    }

    async fn delete_thread(&self, id: Uuid) -> Result<u64, RepoError> {
        let mut store = self.store.write().await;
        let before = store.len();
        store.retain(|cid, c| *cid != id && c.parent_id != Some(id));
        Ok((before - store.len()) as u64)
    }

    async fn delete_by_posts(&self, post_ids: &[Uuid]) -> Result<u64, RepoError> {
        if post_ids.is_empty() {
            return Ok(0);
        }
        let mut store = self.store.write().await;
        let before = store.len();
        store.retain(|_, c| !post_ids.contains(&c.post_id));
        Ok((before - store.len()) as u64)
    }

    async fn delete_by_author(&self, author_id: Uuid) -> Result<u64, RepoError> {
        let mut store = self.store.write().await;
        let authored: HashSet<Uuid> = store
            .values()
            .filter(|c| c.author_id == author_id)
            .map(|c| c.id)
            .collect();
        let before = store.len();
        store.retain(|id, c| {
            !authored.contains(id) && !c.parent_id.is_some_and(|p| authored.contains(&p))
        });
        Ok((before - store.len()) as u64)
    }
}
