//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod rate_limit;
mod repository;

pub use auth::{AuthError, PasswordService, TokenClaims, TokenService};
pub use rate_limit::{RateLimitError, RateLimitResult, RateLimiter};
pub use repository::{
    BaseRepository, CommentQuery, CommentRepository, CommentSort, PostQuery, PostRepository,
    PostSort, SortOrder, ThreadFilter, UserQuery, UserRepository, UserSearchScope,
};
