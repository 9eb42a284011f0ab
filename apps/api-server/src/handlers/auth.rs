//! Authentication handlers.

use actix_web::{HttpResponse, web};
use validator::Validate;

use quill_core::DomainError;
use quill_core::service::Registration;
use quill_shared::ApiResponse;
use quill_shared::dto::{LoginRequest, RegisterRequest};

use super::views;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    let session = state
        .auth
        .register(Registration {
            username: req.username,
            email: req.email,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
        })
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        views::auth(session),
        "User registered successfully",
    )))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    let session = state.auth.login(&req.email, &req.password).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        views::auth(session),
        "Login successful",
    )))
}

/// GET /api/auth/me
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = state
        .auth
        .current_user(identity.user_id)
        .await
        .map_err(|e| match e {
            DomainError::Unauthorized | DomainError::NotFound { .. } => {
                AppError::Unauthorized("Not authorized, user no longer exists".to_string())
            }
            other => other.into(),
        })?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(views::user(user))))
}
