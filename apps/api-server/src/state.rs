//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{PasswordService, TokenService};
use quill_core::service::{
    AdminService, AuthService, CommentService, PostService, Repositories, UserService,
};
use quill_infra::{Argon2PasswordService, JwtTokenService, in_memory_repositories};

#[cfg(feature = "postgres")]
use quill_infra::{DatabaseConnections, postgres_repositories};

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub posts: PostService,
    pub users: UserService,
    pub comments: CommentService,
    pub admin: AdminService,
    pub tokens: Arc<dyn TokenService>,
    #[cfg(feature = "postgres")]
    pub db: Option<Arc<DatabaseConnections>>,
}

impl AppState {
    /// Connect to Postgres when configured, falling back to the in-memory
    /// repositories otherwise.
    pub async fn new(config: &AppConfig) -> Self {
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));

        #[cfg(feature = "postgres")]
        match &config.database {
            Some(db_config) => match DatabaseConnections::init(db_config).await {
                Ok(connections) => {
                    let connections = Arc::new(connections);
                    let mut state = Self::build(postgres_repositories(&connections), tokens);
                    state.db = Some(connections);
                    tracing::info!("Application state initialized (postgres)");
                    return state;
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            }
        }

        tracing::info!("Application state initialized (in-memory)");
        Self::build(in_memory_repositories(), tokens)
    }

    pub fn build(repos: Repositories, tokens: Arc<dyn TokenService>) -> Self {
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());
        Self {
            auth: AuthService::new(repos.clone(), passwords, tokens.clone()),
            posts: PostService::new(repos.clone()),
            users: UserService::new(repos.clone()),
            comments: CommentService::new(repos.clone()),
            admin: AdminService::new(repos),
            tokens,
            #[cfg(feature = "postgres")]
            db: None,
        }
    }
}
