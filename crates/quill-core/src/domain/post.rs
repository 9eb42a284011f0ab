use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Average reading speed used for the read-time estimate.
pub const WORDS_PER_MINUTE: usize = 200;

/// Length of the excerpt generated from content when none is supplied.
pub const EXCERPT_PREVIEW_CHARS: usize = 150;

/// Publication state of a post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl PostStatus {
    pub const ALL: [PostStatus; 3] = [
        PostStatus::Draft,
        PostStatus::Published,
        PostStatus::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
            PostStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PostStatus::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| format!("unknown status '{s}'"))
    }
}

/// Fixed set of post categories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Technology,
    Lifestyle,
    Travel,
    Food,
    Health,
    Business,
    Education,
    Entertainment,
    Sports,
    #[default]
    Other,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Technology,
        Category::Lifestyle,
        Category::Travel,
        Category::Food,
        Category::Health,
        Category::Business,
        Category::Education,
        Category::Entertainment,
        Category::Sports,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Technology => "Technology",
            Category::Lifestyle => "Lifestyle",
            Category::Travel => "Travel",
            Category::Food => "Food",
            Category::Health => "Health",
            Category::Business => "Business",
            Category::Education => "Education",
            Category::Entertainment => "Entertainment",
            Category::Sports => "Sports",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown category '{s}'"))
    }
}

/// Post entity - represents a blog post or article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub tags: Vec<String>,
    pub category: Category,
    pub status: PostStatus,
    pub featured_image: String,
    pub likes: Vec<Uuid>,
    pub view_count: i64,
    pub read_time: i32,
    pub slug: String,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post. Slug is derived from the title; callers that need a
    /// collision-free slug replace it before saving.
    pub fn new(author_id: Uuid, title: &str, content: String) -> Self {
        let now = Utc::now();
        let title = title.trim().to_string();
        Self {
            id: Uuid::new_v4(),
            author_id,
            slug: slugify(&title),
            read_time: read_time(&content),
            excerpt: default_excerpt(&content),
            title,
            content,
            tags: Vec::new(),
            category: Category::Other,
            status: PostStatus::Draft,
            featured_image: String::new(),
            likes: Vec::new(),
            view_count: 0,
            published_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn like_count(&self) -> usize {
        self.likes.len()
    }

    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    pub fn is_liked_by(&self, user_id: Uuid) -> bool {
        self.likes.contains(&user_id)
    }

    /// Replace the content and refresh the read-time estimate.
    pub fn set_content(&mut self, content: String) {
        self.read_time = read_time(&content);
        self.content = content;
    }

    /// A blank excerpt falls back to the generated preview of the content.
    pub fn set_excerpt(&mut self, excerpt: String) {
        self.excerpt = if excerpt.trim().is_empty() {
            default_excerpt(&self.content)
        } else {
            excerpt
        };
    }

    /// Move to `status`. The publish timestamp is recorded once, on the first
    /// transition into `Published`.
    pub fn set_status(&mut self, status: PostStatus) {
        if status == PostStatus::Published && self.published_at.is_none() {
            self.published_at = Some(Utc::now());
        }
        self.status = status;
    }

    pub fn set_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = normalize_tags(tags);
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Lowercase, collapse every run of non-alphanumerics to `-`, trim dashes.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for ch in title.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        "post".to_string()
    } else {
        slug
    }
}

/// `base`, then `base-2`, `base-3`, ... for the n-th collision.
pub fn slug_candidate(base: &str, attempt: u32) -> String {
    if attempt <= 1 {
        base.to_string()
    } else {
        format!("{base}-{attempt}")
    }
}

/// Minutes needed to read `content`, rounded up.
pub fn read_time(content: &str) -> i32 {
    let words = content.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE) as i32
}

pub fn default_excerpt(content: &str) -> String {
    let preview: String = content.chars().take(EXCERPT_PREVIEW_CHARS).collect();
    format!("{preview}...")
}

pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .map(|t| t.as_ref().trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_from_title() {
        assert_eq!(slugify("Hello World!"), "hello-world");
        assert_eq!(slugify("  --Rust & WebAssembly: 2024 edition--  "), "rust-webassembly-2024-edition");
        assert_eq!(slugify("Café au lait"), "caf-au-lait");
        assert_eq!(slugify("!!!"), "post");
    }

    #[test]
    fn slug_candidates_suffix_after_first_attempt() {
        assert_eq!(slug_candidate("hello-world", 1), "hello-world");
        assert_eq!(slug_candidate("hello-world", 2), "hello-world-2");
        assert_eq!(slug_candidate("hello-world", 7), "hello-world-7");
    }

    #[test]
    fn read_time_rounds_up() {
        assert_eq!(read_time(""), 0);
        assert_eq!(read_time("one"), 1);
        assert_eq!(read_time(&"word ".repeat(200)), 1);
        assert_eq!(read_time(&"word ".repeat(201)), 2);
        assert_eq!(read_time(&"word\n\t".repeat(450)), 3);
    }

    #[test]
    fn excerpt_takes_first_chars() {
        let content = "a".repeat(400);
        let excerpt = default_excerpt(&content);
        assert_eq!(excerpt.len(), EXCERPT_PREVIEW_CHARS + 3);
        assert!(excerpt.ends_with("..."));
        assert_eq!(default_excerpt("short"), "short...");
    }

    #[test]
    fn blank_excerpt_falls_back_to_preview() {
        let mut post = Post::new(Uuid::new_v4(), "Title", "Body text".into());
        post.set_excerpt("Hand written".into());
        assert_eq!(post.excerpt, "Hand written");
        post.set_excerpt("  ".into());
        assert_eq!(post.excerpt, "Body text...");
    }

    #[test]
    fn published_at_is_set_once() {
        let mut post = Post::new(Uuid::new_v4(), "Title", "Some content here".into());
        assert!(post.published_at.is_none());

        post.set_status(PostStatus::Published);
        let first = post.published_at.expect("published_at set");

        post.set_status(PostStatus::Archived);
        post.set_status(PostStatus::Published);
        assert_eq!(post.published_at, Some(first));
        assert!(post.is_published());
    }

    #[test]
    fn tags_are_trimmed_and_lowercased() {
        let mut post = Post::new(Uuid::new_v4(), "Title", "Some content here".into());
        post.set_tags([" Rust ", "", "WEB"]);
        assert_eq!(post.tags, vec!["rust", "web"]);
    }

    #[test]
    fn category_parses_display_names() {
        assert_eq!("Travel".parse::<Category>().unwrap(), Category::Travel);
        assert!("travel".parse::<Category>().is_err());
        assert_eq!(Category::ALL.len(), 10);
    }
}
