//! PostgreSQL persistence through SeaORM.

mod connections;
pub mod entity;
mod postgres_base;
mod postgres_repo;

use std::sync::Arc;

use quill_core::service::Repositories;

pub use connections::{DatabaseConfig, DatabaseConnections};
pub use postgres_base::PostgresBaseRepository;
pub use postgres_repo::{
    PostgresCommentRepository, PostgresPostRepository, PostgresUserRepository,
};

/// Postgres-backed repositories sharing one connection pool.
pub fn postgres_repositories(db: &DatabaseConnections) -> Repositories {
    Repositories::new(
        Arc::new(PostgresUserRepository::shared(Arc::clone(&db.main))),
        Arc::new(PostgresPostRepository::shared(Arc::clone(&db.main))),
        Arc::new(PostgresCommentRepository::shared(Arc::clone(&db.main))),
    )
}

#[cfg(test)]
mod tests;
