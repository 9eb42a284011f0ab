//! Post handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;
use validator::Validate;

use quill_core::domain::{Category, PageRequest};
use quill_core::ports::{PostQuery, PostSort, SortOrder};
use quill_core::service::{NewPost, PostChanges};
use quill_shared::ApiResponse;
use quill_shared::dto::{
    CreatePostRequest, LikeResponse, PageQuery, PostListQuery, UpdatePostRequest,
};

use super::views::{self, parse_optional};
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn parse_sort(value: Option<&str>) -> AppResult<PostSort> {
    Ok(match value.map(str::trim).filter(|v| !v.is_empty()) {
        None | Some("publishedAt") => PostSort::PublishedAt,
        Some("createdAt") => PostSort::CreatedAt,
        Some("title") => PostSort::Title,
        Some("viewCount") => PostSort::ViewCount,
        Some(other) => {
            return Err(AppError::invalid_field(
                "sortBy",
                format!("Invalid sortBy '{other}'"),
            ));
        }
    })
}

fn parse_order(value: Option<&str>) -> AppResult<SortOrder> {
    match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("desc") => Ok(SortOrder::Desc),
        Some("asc") => Ok(SortOrder::Asc),
        Some(other) => Err(AppError::invalid_field(
            "sortOrder",
            format!("Invalid sortOrder '{other}'"),
        )),
    }
}

/// GET /api/posts
pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<PostListQuery>,
) -> AppResult<HttpResponse> {
    let q = query.into_inner();
    let filter = PostQuery {
        category: parse_optional("category", q.category.as_deref())?,
        author: q.author,
        search: q.search.filter(|s| !s.trim().is_empty()),
        sort: parse_sort(q.sort_by.as_deref())?,
        order: parse_order(q.sort_order.as_deref())?,
        ..Default::default()
    };

    let page = state
        .posts
        .list_published(filter, PageRequest::new(q.page, q.limit))
        .await?;
    Ok(HttpResponse::Ok().json(views::paginated(page, views::post_summary)))
}

/// GET /api/posts/categories
pub async fn categories(state: web::Data<AppState>) -> HttpResponse {
    let names: Vec<&'static str> = state
        .posts
        .categories()
        .iter()
        .map(Category::as_str)
        .collect();
    HttpResponse::Ok().json(ApiResponse::ok(names))
}

/// GET /api/posts/feed
pub async fn feed(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state
        .posts
        .feed(identity.user_id, PageRequest::new(query.page, query.limit))
        .await?;
    Ok(HttpResponse::Ok().json(views::paginated(page, views::post_summary)))
}

/// GET /api/posts/{slug}
pub async fn get_by_slug(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let entry = state.posts.read_by_slug(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(views::post(entry))))
}

/// POST /api/posts
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    let input = NewPost {
        category: parse_optional("category", req.category.as_deref())?.unwrap_or_default(),
        status: parse_optional("status", req.status.as_deref())?,
        title: req.title,
        content: req.content,
        excerpt: req.excerpt,
        tags: req.tags,
        featured_image: req.featured_image,
    };

    let entry = state.posts.create(identity.actor(), input).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        views::post(entry),
        "Post created successfully",
    )))
}

/// PUT /api/posts/{id}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    let changes = PostChanges {
        category: parse_optional("category", req.category.as_deref())?,
        status: parse_optional("status", req.status.as_deref())?,
        title: req.title,
        content: req.content,
        excerpt: req.excerpt,
        tags: req.tags,
        featured_image: req.featured_image,
    };

    let entry = state
        .posts
        .update(identity.actor(), path.into_inner(), changes)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        views::post(entry),
        "Post updated successfully",
    )))
}

/// DELETE /api/posts/{id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .posts
        .delete(identity.actor(), path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Post deleted successfully")))
}

/// POST /api/posts/{id}/like
pub async fn like(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let like_count = state.posts.like(identity.actor(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        LikeResponse {
            like_count,
            is_liked: true,
        },
        "Post liked",
    )))
}

/// DELETE /api/posts/{id}/like
pub async fn unlike(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let like_count = state
        .posts
        .unlike(identity.actor(), path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        LikeResponse {
            like_count,
            is_liked: false,
        },
        "Post unliked",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_parsing() {
        assert_eq!(parse_sort(None).unwrap(), PostSort::PublishedAt);
        assert_eq!(parse_sort(Some("viewCount")).unwrap(), PostSort::ViewCount);
        assert!(parse_sort(Some("likes")).is_err());

        assert_eq!(parse_order(Some("ASC")).unwrap(), SortOrder::Asc);
        assert_eq!(parse_order(None).unwrap(), SortOrder::Desc);
        assert!(parse_order(Some("sideways")).is_err());
    }
}
