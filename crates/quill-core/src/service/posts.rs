use uuid::Uuid;

use crate::domain::{Category, Page, PageRequest, Post, PostStatus, slug_candidate, slugify};
use crate::error::{DomainError, DomainResult};
use crate::ports::{PostQuery, SortOrder};

use super::{Actor, PostEntry, Repositories, populate_posts};

/// Already-validated input for a new post.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub category: Category,
    pub tags: Vec<String>,
    pub featured_image: Option<String>,
    pub status: Option<PostStatus>,
}

/// Partial update of a post; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub category: Option<Category>,
    pub tags: Option<Vec<String>>,
    pub featured_image: Option<String>,
    pub status: Option<PostStatus>,
}

#[derive(Clone)]
pub struct PostService {
    repos: Repositories,
}

impl PostService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub fn categories(&self) -> &'static [Category] {
        &Category::ALL
    }

    /// Public listing: only published posts are visible whatever the filter says.
    pub async fn list_published(
        &self,
        mut query: PostQuery,
        page: PageRequest,
    ) -> DomainResult<Page<PostEntry>> {
        query.status = Some(PostStatus::Published);
        self.list(&query, page).await
    }

    /// Published posts by the authors `user_id` follows, newest first.
    pub async fn feed(&self, user_id: Uuid, page: PageRequest) -> DomainResult<Page<PostEntry>> {
        let user = self.repos.require_user(user_id).await?;
        let query = PostQuery {
            authors: Some(user.following),
            order: SortOrder::Desc,
            ..PostQuery::published()
        };
        self.list(&query, page).await
    }

    /// Published posts of one author, newest first.
    pub async fn list_by_author(
        &self,
        author_id: Uuid,
        page: PageRequest,
    ) -> DomainResult<Page<PostEntry>> {
        let query = PostQuery {
            author: Some(author_id),
            ..PostQuery::published()
        };
        self.list(&query, page).await
    }

    pub(crate) async fn list(
        &self,
        query: &PostQuery,
        page: PageRequest,
    ) -> DomainResult<Page<PostEntry>> {
        let found = self.repos.posts.list(query, page).await?;
        let entries = populate_posts(&self.repos, found.items).await?;
        Ok(Page::new(entries, found.total, found.request))
    }

    /// Fetch a published post for reading and count the view.
    pub async fn read_by_slug(&self, slug: &str) -> DomainResult<PostEntry> {
        let mut post = self
            .repos
            .posts
            .find_by_slug(slug)
            .await?
            .filter(Post::is_published)
            .ok_or_else(|| DomainError::not_found("Post", slug))?;

        self.repos.posts.increment_views(post.id).await?;
        post.view_count += 1;

        self.entry(post).await
    }

    pub async fn create(&self, actor: Actor, input: NewPost) -> DomainResult<PostEntry> {
        let mut post = Post::new(actor.id, &input.title, input.content);
        post.slug = self.unique_slug(&post.title, None).await?;
        if let Some(excerpt) = input.excerpt {
            post.set_excerpt(excerpt);
        }
        post.category = input.category;
        post.set_tags(input.tags);
        post.featured_image = input.featured_image.unwrap_or_default();
        post.set_status(input.status.unwrap_or_default());

        let post = self.repos.posts.insert(post).await?;
        tracing::info!(post_id = %post.id, slug = %post.slug, "Post created");
        self.entry(post).await
    }

    pub async fn update(
        &self,
        actor: Actor,
        id: Uuid,
        changes: PostChanges,
    ) -> DomainResult<PostEntry> {
        let mut post = self.repos.require_post(id).await?;
        if !actor.can_modify(post.author_id) {
            return Err(DomainError::Forbidden(
                "Not authorized to update this post".to_string(),
            ));
        }

        if let Some(title) = changes.title {
            let title = title.trim().to_string();
            if title != post.title {
                post.slug = self.unique_slug(&title, Some(post.id)).await?;
                post.title = title;
            }
        }
        if let Some(content) = changes.content {
            post.set_content(content);
        }
        if let Some(excerpt) = changes.excerpt {
            post.set_excerpt(excerpt);
        }
        if let Some(category) = changes.category {
            post.category = category;
        }
        if let Some(tags) = changes.tags {
            post.set_tags(tags);
        }
        if let Some(image) = changes.featured_image {
            post.featured_image = image;
        }
        if let Some(status) = changes.status {
            post.set_status(status);
        }
        post.touch();

        let post = self.repos.posts.update(post).await?;
        self.entry(post).await
    }

    pub async fn delete(&self, actor: Actor, id: Uuid) -> DomainResult<()> {
        let post = self.repos.require_post(id).await?;
        if !actor.can_modify(post.author_id) {
            return Err(DomainError::Forbidden(
                "Not authorized to delete this post".to_string(),
            ));
        }
        self.repos.delete_post_cascade(post.id).await
    }

    /// Add the actor's like. Returns the new like count.
    pub async fn like(&self, actor: Actor, id: Uuid) -> DomainResult<usize> {
        let mut post = self.repos.require_post(id).await?;
        if post.is_liked_by(actor.id) {
            return Err(DomainError::BadRequest("Post already liked".to_string()));
        }
        post.likes.push(actor.id);
        let post = self.repos.posts.update(post).await?;
        Ok(post.like_count())
    }

    /// Remove the actor's like. Returns the new like count.
    pub async fn unlike(&self, actor: Actor, id: Uuid) -> DomainResult<usize> {
        let mut post = self.repos.require_post(id).await?;
        if !post.is_liked_by(actor.id) {
            return Err(DomainError::BadRequest("Post not liked".to_string()));
        }
        post.likes.retain(|u| *u != actor.id);
        let post = self.repos.posts.update(post).await?;
        Ok(post.like_count())
    }

    async fn entry(&self, post: Post) -> DomainResult<PostEntry> {
        populate_posts(&self.repos, vec![post])
            .await?
            .pop()
            .ok_or_else(|| DomainError::Internal("post population returned nothing".to_string()))
    }

    /// First free slug for `title`, ignoring the post being renamed.
    async fn unique_slug(&self, title: &str, except: Option<Uuid>) -> DomainResult<String> {
        let base = slugify(title);
        let mut attempt = 1;
        loop {
            let candidate = slug_candidate(&base, attempt);
            if !self.repos.posts.slug_taken(&candidate, except).await? {
                return Ok(candidate);
            }
            attempt += 1;
        }
    }
}
