//! HTTP handlers and route configuration.

mod admin;
mod auth;
mod comments;
mod health;
mod posts;
mod users;
mod views;


use actix_web::{
    HttpRequest, HttpResponse,
    error::{InternalError, JsonPayloadError, PathError, QueryPayloadError},
    web,
};
use quill_shared::ErrorResponse;

use crate::observability::RequestId;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .app_data(web::PathConfig::default().error_handler(path_error))
        .service(
            web::scope("/api")
                .route("/health", web::get().to(health::health_check))
                .service(
                    web::scope("/auth")
                        .route("/register", web::post().to(auth::register))
                        .route("/login", web::post().to(auth::login))
                        .route("/me", web::get().to(auth::me)),
                )
                .service(
                    web::scope("/posts")
                        .route("", web::get().to(posts::list))
                        .route("", web::post().to(posts::create))
                        // Fixed segments must be registered before `/{slug}`.
                        .route("/categories", web::get().to(posts::categories))
                        .route("/feed", web::get().to(posts::feed))
                        .service(
                            web::resource("/{id}/like")
                                .route(web::post().to(posts::like))
                                .route(web::delete().to(posts::unlike)),
                        )
                        .route("/{slug}", web::get().to(posts::get_by_slug))
                        .service(
                            web::resource("/{id}")
                                .route(web::put().to(posts::update))
                                .route(web::delete().to(posts::delete)),
                        ),
                )
                .service(
                    web::scope("/users")
                        .route("", web::get().to(users::list))
                        .route("/profile", web::put().to(users::update_profile))
                        .route("/{id}", web::get().to(users::profile))
                        .service(
                            web::resource("/{id}/follow")
                                .route(web::post().to(users::follow))
                                .route(web::delete().to(users::unfollow)),
                        )
                        .route("/{id}/followers", web::get().to(users::followers))
                        .route("/{id}/following", web::get().to(users::following))
                        .route("/{id}/posts", web::get().to(users::posts)),
                )
                .service(
                    web::scope("/comments")
                        .route("", web::post().to(comments::create))
                        .route("/post/{post_id}", web::get().to(comments::list_for_post))
                        .service(
                            web::resource("/{id}")
                                .route(web::put().to(comments::update))
                                .route(web::delete().to(comments::delete)),
                        )
                        .service(
                            web::resource("/{id}/like")
                                .route(web::post().to(comments::like))
                                .route(web::delete().to(comments::unlike)),
                        )
                        .route("/{id}/replies", web::get().to(comments::replies)),
                )
                .service(
                    web::scope("/admin")
                        .route("/dashboard", web::get().to(admin::dashboard))
                        .route("/users", web::get().to(admin::list_users))
                        .service(
                            web::resource("/users/{id}")
                                .route(web::put().to(admin::update_user))
                                .route(web::delete().to(admin::delete_user)),
                        )
                        .route("/posts", web::get().to(admin::list_posts))
                        .service(
                            web::resource("/posts/{id}")
                                .route(web::put().to(admin::update_post))
                                .route(web::delete().to(admin::delete_post)),
                        )
                        .route("/comments", web::get().to(admin::list_comments))
                        .route("/comments/{id}", web::delete().to(admin::delete_comment)),
                )
                .default_service(web::to(route_not_found)),
        );
}

fn bad_request<E>(err: E, req: &HttpRequest, message: String) -> actix_web::Error
where
    E: std::fmt::Debug + std::fmt::Display + 'static,
{
    tracing::debug!(error = %err, "Rejected malformed request");
    let mut body = ErrorResponse::new(message);
    if let Some(id) = RequestId::of(req) {
        body = body.with_request_id(id);
    }
    InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
}

fn json_error(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    let message = match &err {
        JsonPayloadError::ContentType => "Content-Type must be application/json".to_string(),
        JsonPayloadError::Deserialize(e) => format!("Invalid request body: {e}"),
        other => format!("Invalid request body: {other}"),
    };
    bad_request(err, req, message)
}

fn query_error(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    let message = format!("Invalid query string: {err}");
    bad_request(err, req, message)
}

fn path_error(err: PathError, req: &HttpRequest) -> actix_web::Error {
    let message = format!("Invalid path parameter: {err}");
    bad_request(err, req, message)
}

async fn route_not_found(req: HttpRequest) -> HttpResponse {
    let mut body = ErrorResponse::new(format!("Route {} not found", req.path()));
    if let Some(id) = RequestId::of(&req) {
        body = body.with_request_id(id);
    }
    HttpResponse::NotFound().json(body)
}
