use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::FieldError;

/// Allowed username length, counted after trimming.
pub const USERNAME_LENGTH: RangeInclusive<usize> = 3..=30;
/// Allowed first/last name length, counted after trimming.
pub const NAME_LENGTH: RangeInclusive<usize> = 1..=50;

/// Access level of an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
    Moderator,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::User, Role::Admin, Role::Moderator];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Moderator => "moderator",
        }
    }

    /// Admins and moderators may use the administration endpoints.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Moderator)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| format!("unknown role '{s}'"))
    }
}

/// User entity - represents an account and its public profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub avatar: String,
    pub role: Role,
    pub is_verified: bool,
    pub followers: Vec<Uuid>,
    pub following: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with generated ID and timestamps.
    ///
    /// Username and names are trimmed, email is lowercased.
    pub fn new(
        username: &str,
        email: &str,
        password_hash: String,
        first_name: &str,
        last_name: &str,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username: username.trim().to_string(),
            email: normalize_email(email),
            password_hash,
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            bio: String::new(),
            avatar: String::new(),
            role: Role::User,
            is_verified: false,
            followers: Vec::new(),
            following: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn follower_count(&self) -> usize {
        self.followers.len()
    }

    pub fn following_count(&self) -> usize {
        self.following.len()
    }

    pub fn is_following(&self, other: Uuid) -> bool {
        self.following.contains(&other)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Trims `value` and checks the stored form against `range`.
pub fn trimmed_field(
    field: &str,
    label: &str,
    value: &str,
    range: RangeInclusive<usize>,
) -> Result<String, FieldError> {
    let trimmed = value.trim();
    if !range.contains(&trimmed.chars().count()) {
        return Err(FieldError::new(
            field,
            format!(
                "{label} must be between {} and {} characters",
                range.start(),
                range.end()
            ),
        ));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trimmed_field_counts_the_stored_form() {
        let err = trimmed_field("username", "Username", "  ab  ", USERNAME_LENGTH).unwrap_err();
        assert_eq!(err.field, "username");
        assert_eq!(err.message, "Username must be between 3 and 30 characters");

        assert!(trimmed_field("firstName", "First name", "   ", NAME_LENGTH).is_err());
        assert_eq!(
            trimmed_field("firstName", "First name", " Ada ", NAME_LENGTH).unwrap(),
            "Ada"
        );
    }

    #[test]
    fn new_user_normalizes_identity_fields() {
        let user = User::new("  alice ", "Alice@Example.COM", "hash".into(), " Alice", "Smith ");

        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.full_name(), "Alice Smith");
        assert_eq!(user.role, Role::User);
        assert_eq!(user.follower_count(), 0);
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User::new("bob", "bob@example.com", "secret-hash".into(), "Bob", "B");
        let json = serde_json::to_string(&user).unwrap();

        assert!(!json.contains("secret-hash"));
        assert!(!json.contains("password_hash"));
    }

    #[test]
    fn role_round_trips_through_str() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("root".parse::<Role>().is_err());
        assert!(Role::Moderator.is_staff());
        assert!(!Role::User.is_staff());
    }
}
