use std::sync::Arc;

use crate::domain::{NAME_LENGTH, USERNAME_LENGTH, User, normalize_email, trimmed_field};
use crate::error::{DomainError, DomainResult, FieldError};
use crate::ports::{AuthError, PasswordService, TokenService};

use super::Repositories;

/// Already-validated registration input.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// A signed-in user and the token issued for them.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
    pub expires_in: i64,
}

/// Registration and login.
#[derive(Clone)]
pub struct AuthService {
    repos: Repositories,
    passwords: Arc<dyn PasswordService>,
    tokens: Arc<dyn TokenService>,
}

impl AuthService {
    pub fn new(
        repos: Repositories,
        passwords: Arc<dyn PasswordService>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            repos,
            passwords,
            tokens,
        }
    }

    pub async fn register(&self, input: Registration) -> DomainResult<AuthSession> {
        let email = normalize_email(&input.email);
        let username = trimmed_field("username", "Username", &input.username, USERNAME_LENGTH);
        let first_name = trimmed_field("firstName", "First name", &input.first_name, NAME_LENGTH);
        let last_name = trimmed_field("lastName", "Last name", &input.last_name, NAME_LENGTH);
        let (username, first_name, last_name) = match (username, first_name, last_name) {
            (Ok(u), Ok(f), Ok(l)) => (u, f, l),
            (u, f, l) => {
                let errors = [u.err(), f.err(), l.err()].into_iter().flatten().collect();
                return Err(DomainError::Validation(errors));
            }
        };
        let username = username.as_str();

        let mut conflicts = Vec::new();
        if self.repos.users.find_by_email(&email).await?.is_some() {
            conflicts.push(FieldError::new("email", "Email is already registered"));
        }
        if self.repos.users.find_by_username(username).await?.is_some() {
            conflicts.push(FieldError::new("username", "Username is already taken"));
        }
        if !conflicts.is_empty() {
            return Err(DomainError::Validation(conflicts));
        }

        let password_hash = self.passwords.hash(&input.password).map_err(internal)?;
        let user = User::new(
            username,
            &email,
            password_hash,
            &first_name,
            &last_name,
        );
        let user = self.repos.users.insert(user).await?;
        tracing::info!(user_id = %user.id, "User registered");

        self.session_for(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> DomainResult<AuthSession> {
        let user = self
            .repos
            .users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(DomainError::Unauthorized)?;

        if !self
            .passwords
            .verify(password, &user.password_hash)
            .map_err(internal)?
        {
            tracing::debug!(user_id = %user.id, "Rejected login with wrong password");
            return Err(DomainError::Unauthorized);
        }

        self.session_for(user)
    }

    /// The profile behind a valid token. A token whose user was deleted no
    /// longer authenticates.
    pub async fn current_user(&self, user_id: uuid::Uuid) -> DomainResult<User> {
        self.repos
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::Unauthorized)
    }

    fn session_for(&self, user: User) -> DomainResult<AuthSession> {
        let token = self
            .tokens
            .generate_token(user.id, &user.email, user.role)
            .map_err(internal)?;

        Ok(AuthSession {
            user,
            token,
            expires_in: self.tokens.expiration_seconds(),
        })
    }
}

fn internal(err: AuthError) -> DomainError {
    DomainError::Internal(err.to_string())
}
