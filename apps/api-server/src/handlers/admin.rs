//! Administration handlers. The services reject callers that are not
//! admins or moderators.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::domain::{PageRequest, PostStatus};
use quill_core::service::UserAdminChanges;
use quill_shared::ApiResponse;
use quill_shared::dto::{
    AdminPostQuery, AdminUpdatePostRequest, AdminUpdateUserRequest, PageQuery, UserListQuery,
};

use super::views::{self, parse_field, parse_optional};
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/admin/dashboard
pub async fn dashboard(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let stats = state.admin.dashboard(identity.actor()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(views::dashboard(stats))))
}

/// GET /api/admin/users
pub async fn list_users(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<UserListQuery>,
) -> AppResult<HttpResponse> {
    let q = query.into_inner();
    let role = parse_optional("role", q.role.as_deref())?;
    let search = q.search.filter(|s| !s.trim().is_empty());

    let page = state
        .admin
        .list_users(identity.actor(), search, role, PageRequest::new(q.page, q.limit))
        .await?;
    Ok(HttpResponse::Ok().json(views::paginated(page, views::user)))
}

/// PUT /api/admin/users/{id}
pub async fn update_user(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<AdminUpdateUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let changes = UserAdminChanges {
        role: parse_optional("role", req.role.as_deref())?,
        is_verified: req.is_verified,
    };

    let user = state
        .admin
        .update_user(identity.actor(), path.into_inner(), changes)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        views::user(user),
        "User updated successfully",
    )))
}

/// DELETE /api/admin/users/{id}
pub async fn delete_user(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .admin
        .delete_user(identity.actor(), path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("User deleted successfully")))
}

/// GET /api/admin/posts
pub async fn list_posts(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<AdminPostQuery>,
) -> AppResult<HttpResponse> {
    let q = query.into_inner();
    let status = parse_optional("status", q.status.as_deref())?;
    let category = parse_optional("category", q.category.as_deref())?;

    let page = state
        .admin
        .list_posts(identity.actor(), status, category, PageRequest::new(q.page, q.limit))
        .await?;
    Ok(HttpResponse::Ok().json(views::paginated(page, views::post_summary)))
}

/// PUT /api/admin/posts/{id}
pub async fn update_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<AdminUpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let status: PostStatus = parse_field("status", body.status.trim())?;
    let entry = state
        .admin
        .set_post_status(identity.actor(), path.into_inner(), status)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        views::post(entry),
        "Post status updated successfully",
    )))
}

/// DELETE /api/admin/posts/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .admin
        .delete_post(identity.actor(), path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Post deleted successfully")))
}

/// GET /api/admin/comments
pub async fn list_comments(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state
        .admin
        .list_comments(identity.actor(), PageRequest::new(query.page, query.limit))
        .await?;
    Ok(HttpResponse::Ok().json(views::paginated(page, views::comment)))
}

/// DELETE /api/admin/comments/{id}
pub async fn delete_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .admin
        .delete_comment(identity.actor(), path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Comment deleted successfully")))
}
