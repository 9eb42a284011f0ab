//! Authentication extractor.

use std::future::{Ready, ready};

use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, http::StatusCode, http::header, web};
use uuid::Uuid;

use quill_core::domain::Role;
use quill_core::ports::{AuthError, TokenClaims};
use quill_core::service::Actor;
use quill_shared::ErrorResponse;

use crate::observability::RequestId;
use crate::state::AppState;

/// The caller, as identified by a valid bearer token.
///
/// The role is the one embedded in the token at login time; a role change
/// takes effect on the next login.
///
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, user {}!", identity.user_id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

impl Identity {
    pub fn actor(&self) -> Actor {
        Actor::new(self.user_id, self.role)
    }
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.user_id,
            email: claims.email,
            role: claims.role,
        }
    }
}

#[derive(Debug)]
pub struct AuthenticationError {
    error: AuthError,
    request_id: Option<String>,
}

impl std::fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl actix_web::ResponseError for AuthenticationError {
    fn status_code(&self) -> StatusCode {
        match &self.error {
            AuthError::HashingError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut body = match &self.error {
            AuthError::MissingAuth => ErrorResponse::new("Not authorized, no token"),
            AuthError::TokenExpired => ErrorResponse::new("Not authorized, token expired"),
            AuthError::InvalidToken(_) => ErrorResponse::new("Not authorized, token failed"),
            AuthError::HashingError(_) => ErrorResponse::internal_error(),
        };
        if let Some(id) = &self.request_id {
            body = body.with_request_id(id.clone());
        }
        HttpResponse::build(self.status_code()).json(body)
    }
}

fn authenticate(req: &HttpRequest) -> Result<Identity, AuthError> {
    let Some(state) = req.app_data::<web::Data<AppState>>() else {
        tracing::error!("AppState not registered; cannot validate tokens");
        return Err(AuthError::InvalidToken("server configuration".to_string()));
    };

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuth)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken("non-ascii authorization header".to_string()))?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingAuth)?;

    state.tokens.validate_token(token).map(Identity::from)
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map_err(|error| {
            tracing::debug!(error = %error, "Authentication rejected");
            AuthenticationError {
                error,
                request_id: RequestId::of(req),
            }
        }))
    }
}
