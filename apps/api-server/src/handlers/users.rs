//! User and follow-graph handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;
use validator::Validate;

use quill_core::domain::PageRequest;
use quill_core::service::ProfileChanges;
use quill_shared::ApiResponse;
use quill_shared::dto::{PageQuery, UpdateProfileRequest, UserListQuery};

use super::views;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/users
pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<UserListQuery>,
) -> AppResult<HttpResponse> {
    let q = query.into_inner();
    let search = q.search.filter(|s| !s.trim().is_empty());
    let page = state
        .users
        .list(search, PageRequest::new(q.page, q.limit))
        .await?;
    Ok(HttpResponse::Ok().json(views::paginated(page, views::public_user)))
}

/// GET /api/users/{id}
pub async fn profile(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let profile = state.users.profile(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(views::profile(profile))))
}

/// PUT /api/users/profile
pub async fn update_profile(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<UpdateProfileRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    let user = state
        .users
        .update_profile(
            identity.actor(),
            ProfileChanges {
                first_name: req.first_name,
                last_name: req.last_name,
                bio: req.bio,
                avatar: req.avatar,
            },
        )
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        views::user(user),
        "Profile updated successfully",
    )))
}

/// POST /api/users/{id}/follow
pub async fn follow(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .users
        .follow(identity.actor(), path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("User followed successfully")))
}

/// DELETE /api/users/{id}/follow
pub async fn unfollow(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .users
        .unfollow(identity.actor(), path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("User unfollowed successfully")))
}

/// GET /api/users/{id}/followers
pub async fn followers(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let users = state.users.followers(path.into_inner()).await?;
    let data: Vec<_> = users.into_iter().map(views::user_summary).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::ok(data)))
}

/// GET /api/users/{id}/following
pub async fn following(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let users = state.users.following(path.into_inner()).await?;
    let data: Vec<_> = users.into_iter().map(views::user_summary).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::ok(data)))
}

/// GET /api/users/{id}/posts
pub async fn posts(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state
        .posts
        .list_by_author(path.into_inner(), PageRequest::new(query.page, query.limit))
        .await?;
    Ok(HttpResponse::Ok().json(views::paginated(page, views::post_summary)))
}
