use std::collections::HashMap;

use uuid::Uuid;

use crate::domain::{Comment, Page, PageRequest};
use crate::error::{DomainError, DomainResult};
use crate::ports::{CommentQuery, CommentSort, ThreadFilter};

use super::{Actor, CommentEntry, Repositories};

/// Already-validated input for a new comment or reply.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub content: String,
}

#[derive(Clone)]
pub struct CommentService {
    repos: Repositories,
}

impl CommentService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Top-level comments of a post, newest first, each with its replies.
    pub async fn list_for_post(
        &self,
        post_id: Uuid,
        page: PageRequest,
    ) -> DomainResult<Page<CommentEntry>> {
        let query = CommentQuery {
            post: Some(post_id),
            thread: ThreadFilter::TopLevel,
            sort: CommentSort::NewestFirst,
        };
        let found = self.repos.comments.list(&query, page).await?;

        let parent_ids: Vec<Uuid> = found.items.iter().map(|c| c.id).collect();
        let replies = if parent_ids.is_empty() {
            Vec::new()
        } else {
            self.repos.comments.find_replies(&parent_ids).await?
        };

        let authors = self
            .repos
            .users_by_id(
                found
                    .items
                    .iter()
                    .chain(replies.iter())
                    .map(|c| c.author_id),
            )
            .await?;

        let mut replies_by_parent: HashMap<Uuid, Vec<CommentEntry>> = HashMap::new();
        for reply in replies {
            if let Some(parent) = reply.parent_id {
                let author = authors.get(&reply.author_id).cloned();
                replies_by_parent
                    .entry(parent)
                    .or_default()
                    .push(CommentEntry::new(reply, author));
            }
        }

        Ok(found.map(|comment| {
            let replies = replies_by_parent.remove(&comment.id).unwrap_or_default();
            let author = authors.get(&comment.author_id).cloned();
            let mut entry = CommentEntry::new(comment, author);
            entry.reply_count = replies.len() as u64;
            entry.replies = replies;
            entry
        }))
    }

    /// Direct replies to a comment, oldest first.
    pub async fn replies(&self, id: Uuid, page: PageRequest) -> DomainResult<Page<CommentEntry>> {
        let parent = self.repos.require_comment(id).await?;
        let query = CommentQuery {
            post: Some(parent.post_id),
            thread: ThreadFilter::RepliesTo(parent.id),
            sort: CommentSort::OldestFirst,
        };
        let found = self.repos.comments.list(&query, page).await?;
        self.populate(found).await
    }

    pub async fn create(&self, actor: Actor, input: NewComment) -> DomainResult<CommentEntry> {
        let post = self.repos.require_post(input.post_id).await?;

        if let Some(parent_id) = input.parent_id {
            let parent = self
                .repos
                .comments
                .find_by_id(parent_id)
                .await?
                .ok_or_else(|| DomainError::not_found("Parent comment", parent_id))?;
            if parent.post_id != post.id {
                return Err(DomainError::invalid(
                    "parentCommentId",
                    "Parent comment belongs to a different post",
                ));
            }
            if parent.is_reply() {
                return Err(DomainError::invalid(
                    "parentCommentId",
                    "Replies cannot be nested more than one level",
                ));
            }
        }

        let comment = Comment::new(post.id, actor.id, input.parent_id, &input.content);
        let comment = self.repos.comments.insert(comment).await?;
        tracing::debug!(comment_id = %comment.id, post_id = %post.id, "Comment created");
        self.entry(comment).await
    }

    /// Edit a comment. Only its author may edit it.
    pub async fn update(&self, actor: Actor, id: Uuid, content: &str) -> DomainResult<CommentEntry> {
        let mut comment = self.repos.require_comment(id).await?;
        if comment.author_id != actor.id {
            return Err(DomainError::Forbidden(
                "Not authorized to update this comment".to_string(),
            ));
        }

        comment.edit(content);
        let comment = self.repos.comments.update(comment).await?;
        self.entry(comment).await
    }

    /// Delete a comment and its direct replies.
    pub async fn delete(&self, actor: Actor, id: Uuid) -> DomainResult<()> {
        let comment = self.repos.require_comment(id).await?;
        if !actor.can_modify(comment.author_id) {
            return Err(DomainError::Forbidden(
                "Not authorized to delete this comment".to_string(),
            ));
        }
        let removed = self.repos.comments.delete_thread(comment.id).await?;
        tracing::info!(comment_id = %comment.id, removed, "Comment deleted");
        Ok(())
    }

    pub async fn like(&self, actor: Actor, id: Uuid) -> DomainResult<usize> {
        let mut comment = self.repos.require_comment(id).await?;
        if comment.is_liked_by(actor.id) {
            return Err(DomainError::BadRequest("Comment already liked".to_string()));
        }
        comment.likes.push(actor.id);
        let comment = self.repos.comments.update(comment).await?;
        Ok(comment.like_count())
    }

    pub async fn unlike(&self, actor: Actor, id: Uuid) -> DomainResult<usize> {
        let mut comment = self.repos.require_comment(id).await?;
        if !comment.is_liked_by(actor.id) {
            return Err(DomainError::BadRequest("Comment not liked".to_string()));
        }
        comment.likes.retain(|u| *u != actor.id);
        let comment = self.repos.comments.update(comment).await?;
        Ok(comment.like_count())
    }

    async fn entry(&self, comment: Comment) -> DomainResult<CommentEntry> {
        let author = self.repos.users.find_by_id(comment.author_id).await?;
        Ok(CommentEntry::new(comment, author))
    }

    pub(crate) async fn populate(
        &self,
        page: Page<Comment>,
    ) -> DomainResult<Page<CommentEntry>> {
        let authors = self
            .repos
            .users_by_id(page.items.iter().map(|c| c.author_id))
            .await?;
        Ok(page.map(|comment| {
            let author = authors.get(&comment.author_id).cloned();
            CommentEntry::new(comment, author)
        }))
    }
}
