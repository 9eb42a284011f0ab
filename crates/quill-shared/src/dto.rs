//! Data Transfer Objects - request/response types for the API.
//!
//! Enum-valued inputs (category, status, role, sort) travel as strings and are
//! parsed by the server so that bad values come back as field errors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Rejects values that are empty once surrounding whitespace is removed.
fn not_blank<T: AsRef<str>>(value: T) -> Result<(), ValidationError> {
    if value.as_ref().trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Length check on the value as it will be stored, i.e. trimmed.
fn trimmed_length(
    value: &str,
    min: usize,
    max: usize,
    message: &'static str,
) -> Result<(), ValidationError> {
    let len = value.trim().chars().count();
    if len < min || len > max {
        let mut err = ValidationError::new("length");
        err.message = Some(message.into());
        err.add_param("min".into(), &min);
        err.add_param("max".into(), &max);
        return Err(err);
    }
    Ok(())
}

fn valid_username<T: AsRef<str>>(value: T) -> Result<(), ValidationError> {
    trimmed_length(
        value.as_ref(),
        3,
        30,
        "Username must be between 3 and 30 characters",
    )
}

fn valid_first_name<T: AsRef<str>>(value: T) -> Result<(), ValidationError> {
    trimmed_length(
        value.as_ref(),
        1,
        50,
        "First name must be between 1 and 50 characters",
    )
}

fn valid_last_name<T: AsRef<str>>(value: T) -> Result<(), ValidationError> {
    trimmed_length(
        value.as_ref(),
        1,
        50,
        "Last name must be between 1 and 50 characters",
    )
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(custom(function = "valid_username"))]
    pub username: String,
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(custom(function = "valid_first_name"))]
    pub first_name: String,
    #[validate(custom(function = "valid_last_name"))]
    pub last_name: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[validate(
        length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"),
        custom(function = "not_blank")
    )]
    pub title: String,
    #[validate(length(min = 10, message = "Content must be at least 10 characters"))]
    pub content: String,
    #[validate(length(max = 300, message = "Excerpt cannot exceed 300 characters"))]
    pub excerpt: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub featured_image: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    #[validate(
        length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"),
        custom(function = "not_blank")
    )]
    pub title: Option<String>,
    #[validate(length(min = 10, message = "Content must be at least 10 characters"))]
    pub content: Option<String>,
    #[validate(length(max = 300, message = "Excerpt cannot exceed 300 characters"))]
    pub excerpt: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub featured_image: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[validate(
        length(min = 1, max = 1000, message = "Comment must be between 1 and 1000 characters"),
        custom(function = "not_blank")
    )]
    pub content: String,
    pub post_id: Uuid,
    pub parent_comment_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateCommentRequest {
    #[validate(
        length(min = 1, max = 1000, message = "Comment must be between 1 and 1000 characters"),
        custom(function = "not_blank")
    )]
    pub content: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(custom(function = "valid_first_name"))]
    pub first_name: Option<String>,
    #[validate(custom(function = "valid_last_name"))]
    pub last_name: Option<String>,
    #[validate(length(max = 500, message = "Bio cannot exceed 500 characters"))]
    pub bio: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdateUserRequest {
    pub role: Option<String>,
    pub is_verified: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminUpdatePostRequest {
    pub status: String,
}

// ---------------------------------------------------------------------------
// Query strings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub author: Option<Uuid>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminPostQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<String>,
    pub category: Option<String>,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

/// Full user document, minus the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub bio: String,
    pub avatar: String,
    pub role: String,
    pub is_verified: bool,
    pub followers: Vec<Uuid>,
    pub following: Vec<Uuid>,
    pub follower_count: usize,
    pub following_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User as seen by anyone else. Carries no contact details.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUserResponse {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub bio: String,
    pub avatar: String,
    pub role: String,
    pub is_verified: bool,
    pub followers: Vec<Uuid>,
    pub following: Vec<Uuid>,
    pub follower_count: usize,
    pub following_count: usize,
    pub created_at: DateTime<Utc>,
}

/// Author fields embedded in posts and comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSummary {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar: String,
}

/// Entry of a followers/following list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar: String,
    pub bio: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: TokenResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub user: PublicUserResponse,
    pub recent_posts: Vec<PostSummary>,
}

/// Post as shown in listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub id: Uuid,
    pub title: String,
    pub excerpt: String,
    pub slug: String,
    pub author: Option<AuthorSummary>,
    pub tags: Vec<String>,
    pub category: String,
    pub status: String,
    pub featured_image: String,
    pub like_count: usize,
    pub comment_count: u64,
    pub view_count: i64,
    pub read_time: i32,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Full post document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub slug: String,
    pub author: Option<AuthorSummary>,
    pub tags: Vec<String>,
    pub category: String,
    pub status: String,
    pub featured_image: String,
    pub likes: Vec<Uuid>,
    pub like_count: usize,
    pub comment_count: u64,
    pub view_count: i64,
    pub read_time: i32,
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Post reference attached to comments in moderation listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRef {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: Uuid,
    pub content: String,
    pub post_id: Uuid,
    pub parent_comment_id: Option<Uuid>,
    pub author: Option<AuthorSummary>,
    pub likes: Vec<Uuid>,
    pub like_count: usize,
    pub reply_count: u64,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub replies: Vec<CommentResponse>,
    pub is_edited: bool,
    pub edited_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub post: Option<PostRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub like_count: usize,
    pub is_liked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardTotals {
    pub total_users: u64,
    pub total_posts: u64,
    pub total_comments: u64,
    pub published_posts: u64,
    pub draft_posts: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCountResponse {
    pub category: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyCountResponse {
    pub year: i32,
    pub month: u32,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub stats: DashboardTotals,
    pub recent_users: Vec<UserResponse>,
    pub recent_posts: Vec<PostSummary>,
    pub posts_by_category: Vec<CategoryCountResponse>,
    pub monthly_users: Vec<MonthlyCountResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_collects_every_failure() {
        let req: RegisterRequest = serde_json::from_value(serde_json::json!({
            "username": "ab",
            "email": "not-an-email",
            "password": "123",
            "firstName": "",
            "lastName": "Doe"
        }))
        .unwrap();

        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert_eq!(fields.len(), 4);
        assert!(fields.contains_key("first_name"));
    }

    #[test]
    fn test_register_lengths_apply_to_trimmed_values() {
        let req: RegisterRequest = serde_json::from_value(serde_json::json!({
            "username": "  ab  ",
            "email": "ab@example.com",
            "password": "secret1",
            "firstName": "   ",
            "lastName": " Doe "
        }))
        .unwrap();

        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("first_name"));
        assert!(!fields.contains_key("last_name"));
    }

    #[test]
    fn test_profile_update_rejects_blank_names() {
        let req = UpdateProfileRequest {
            first_name: Some("  ".to_string()),
            last_name: Some("x".repeat(51)),
            ..Default::default()
        };
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("first_name"));
        assert!(fields.contains_key("last_name"));

        let req = UpdateProfileRequest {
            first_name: Some(" Ada ".to_string()),
            ..Default::default()
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_blank_comment_is_rejected() {
        let req = UpdateCommentRequest {
            content: "   ".to_string(),
        };
        assert!(req.validate().is_err());

        let req = UpdateCommentRequest {
            content: " fine ".to_string(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_partial_post_update_validates_present_fields_only() {
        let req = UpdatePostRequest {
            content: Some("short".to_string()),
            ..Default::default()
        };
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("content"));

        assert!(UpdatePostRequest::default().validate().is_ok());
    }
}
