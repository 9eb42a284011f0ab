//! Domain entities - the core business objects.

mod comment;
mod pagination;
mod post;
mod user;

pub use comment::Comment;
pub use pagination::{Page, PageRequest, Pagination};
pub use post::{
    Category, Post, PostStatus, default_excerpt, normalize_tags, read_time, slug_candidate,
    slugify,
};
pub use user::{NAME_LENGTH, Role, USERNAME_LENGTH, User, normalize_email, trimmed_field};
