//! SeaORM entities. Enum-valued columns are stored as their string form.

pub mod comment;
pub mod post;
pub mod user;
