//! Comment handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;
use validator::Validate;

use quill_core::domain::PageRequest;
use quill_core::service::NewComment;
use quill_shared::ApiResponse;
use quill_shared::dto::{CreateCommentRequest, LikeResponse, PageQuery, UpdateCommentRequest};

use super::views;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/comments/post/{post_id}
pub async fn list_for_post(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state
        .comments
        .list_for_post(path.into_inner(), PageRequest::new(query.page, query.limit))
        .await?;
    Ok(HttpResponse::Ok().json(views::paginated(page, views::comment)))
}

/// GET /api/comments/{id}/replies
pub async fn replies(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state
        .comments
        .replies(path.into_inner(), PageRequest::new(query.page, query.limit))
        .await?;
    Ok(HttpResponse::Ok().json(views::paginated(page, views::comment)))
}

/// POST /api/comments
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    let entry = state
        .comments
        .create(
            identity.actor(),
            NewComment {
                post_id: req.post_id,
                parent_id: req.parent_comment_id,
                content: req.content,
            },
        )
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        views::comment(entry),
        "Comment created successfully",
    )))
}

/// PUT /api/comments/{id}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdateCommentRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    let entry = state
        .comments
        .update(identity.actor(), path.into_inner(), &req.content)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        views::comment(entry),
        "Comment updated successfully",
    )))
}

/// DELETE /api/comments/{id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .comments
        .delete(identity.actor(), path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Comment deleted successfully")))
}

/// POST /api/comments/{id}/like
pub async fn like(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let like_count = state
        .comments
        .like(identity.actor(), path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(LikeResponse {
        like_count,
        is_liked: true,
    })))
}

/// DELETE /api/comments/{id}/like
pub async fn unlike(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let like_count = state
        .comments
        .unlike(identity.actor(), path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(LikeResponse {
        like_count,
        is_liked: false,
    })))
}
