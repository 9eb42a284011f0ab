//! In-memory repositories - used when no database is configured, and by the
//! service tests.
//!
//! Note: Data is lost on process restart.

mod comments;
mod posts;
mod users;

use std::sync::Arc;

use quill_core::service::Repositories;

pub use comments::InMemoryCommentRepository;
pub use posts::InMemoryPostRepository;
pub use users::InMemoryUserRepository;

/// Case-insensitive substring match.
pub(crate) fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Build a full set of empty in-memory repositories.
pub fn in_memory_repositories() -> Repositories {
    Repositories::new(
        Arc::new(InMemoryUserRepository::new()),
        Arc::new(InMemoryPostRepository::new()),
        Arc::new(InMemoryCommentRepository::new()),
    )
}

#[cfg(test)]
mod tests;
