//! HTTP error mapping.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use quill_core::{DomainError, FieldError};
use quill_shared::{ErrorResponse, FieldErrorBody};
use validator::ValidationErrors;

/// Application error type that maps to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Validation failed")]
    Validation(Vec<FieldErrorBody>),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    /// The message is logged, never returned to the client.
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldErrorBody::new(field, message)])
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Validation(fields) => ErrorResponse::validation(fields.clone()),
            AppError::Internal(detail) => {
                tracing::error!(error = %detail, "Request failed with internal error");
                ErrorResponse::internal_error()
            }
            other => ErrorResponse::new(other.to_string()),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, .. } => {
                AppError::NotFound(format!("{entity_type} not found"))
            }
            DomainError::Validation(fields) => {
                AppError::Validation(fields.into_iter().map(field_body).collect())
            }
            DomainError::BadRequest(msg) | DomainError::Duplicate(msg) => {
                AppError::BadRequest(msg)
            }
            DomainError::Unauthorized => AppError::Unauthorized("Invalid credentials".to_string()),
            DomainError::Forbidden(msg) => AppError::Forbidden(msg),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(FieldErrorBody::from_validation(&errors))
    }
}

fn field_body(err: FieldError) -> FieldErrorBody {
    FieldErrorBody::new(err.field, err.message)
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_json(err: AppError) -> serde_json::Value {
        let bytes = to_bytes(err.error_response().into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_domain_errors_map_to_status_codes() {
        let cases = [
            (DomainError::not_found("Post", "missing"), StatusCode::NOT_FOUND),
            (DomainError::invalid("title", "Required"), StatusCode::BAD_REQUEST),
            (DomainError::BadRequest("Post already liked".into()), StatusCode::BAD_REQUEST),
            (DomainError::Duplicate("Email already registered".into()), StatusCode::BAD_REQUEST),
            (DomainError::Unauthorized, StatusCode::UNAUTHORIZED),
            (DomainError::Forbidden("nope".into()), StatusCode::FORBIDDEN),
            (DomainError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (domain, status) in cases {
            assert_eq!(AppError::from(domain).status_code(), status);
        }
    }

    #[actix_web::test]
    async fn test_not_found_names_the_entity() {
        let body = body_json(DomainError::not_found("Comment", "abc").into()).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Comment not found");
    }

    #[actix_web::test]
    async fn test_internal_detail_is_hidden() {
        let body = body_json(AppError::Internal("connection reset".into())).await;
        assert_eq!(body["message"], "Internal server error");
    }

    #[actix_web::test]
    async fn test_validation_lists_fields() {
        let body = body_json(AppError::invalid_field("category", "Invalid category")).await;
        assert_eq!(body["message"], "Validation failed");
        assert_eq!(body["errors"][0]["field"], "category");
    }
}
