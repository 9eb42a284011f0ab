//! Credential handling: Argon2 password hashes and JWT bearer tokens.

mod jwt;
mod password;

pub use jwt::{JwtConfig, JwtTokenService};
pub use password::Argon2PasswordService;
