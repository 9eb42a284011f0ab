use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Comment entity. A comment with a `parent_id` is a reply; replies are one
/// level deep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub likes: Vec<Uuid>,
    pub is_edited: bool,
    pub edited_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(post_id: Uuid, author_id: Uuid, parent_id: Option<Uuid>, content: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            post_id,
            author_id,
            parent_id,
            content: content.trim().to_string(),
            likes: Vec::new(),
            is_edited: false,
            edited_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }

    pub fn like_count(&self) -> usize {
        self.likes.len()
    }

    pub fn is_liked_by(&self, user_id: Uuid) -> bool {
        self.likes.contains(&user_id)
    }

    /// Replace the content of an existing comment, marking it edited.
    pub fn edit(&mut self, content: &str) {
        let now = Utc::now();
        self.content = content.trim().to_string();
        self.is_edited = true;
        self.edited_at = Some(now);
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_marks_comment_edited() {
        let mut comment = Comment::new(Uuid::new_v4(), Uuid::new_v4(), None, "  first  ");
        assert_eq!(comment.content, "first");
        assert!(!comment.is_edited);
        assert!(comment.edited_at.is_none());

        comment.edit("second");
        assert_eq!(comment.content, "second");
        assert!(comment.is_edited);
        assert!(comment.edited_at.is_some());
    }
}
