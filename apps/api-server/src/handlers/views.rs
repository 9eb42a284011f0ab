//! Domain → response DTO mapping.

use std::str::FromStr;

use quill_core::domain::{Page, Post, User};
use quill_core::service::{AuthSession, CommentEntry, DashboardStats, PostEntry, UserProfile};
use quill_shared::dto::{
    AuthResponse, AuthorSummary, CategoryCountResponse, CommentResponse, DashboardResponse,
    DashboardTotals, MonthlyCountResponse, PostRef, PostResponse, PostSummary, ProfileResponse,
    PublicUserResponse, TokenResponse, UserResponse, UserSummary,
};
use quill_shared::{ApiResponse, PaginationMeta};

use crate::middleware::error::AppError;

/// Parse an enum-valued input, reporting failures against `field`.
pub fn parse_field<T: FromStr>(field: &str, value: &str) -> Result<T, AppError> {
    value
        .parse()
        .map_err(|_| AppError::invalid_field(field, format!("Invalid {field} '{value}'")))
}

/// Like [`parse_field`], treating absent or empty values as "no filter".
pub fn parse_optional<T: FromStr>(field: &str, value: Option<&str>) -> Result<Option<T>, AppError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => parse_field(field, v).map(Some),
        None => Ok(None),
    }
}

/// Wrap a page of results in the paginated envelope.
pub fn paginated<T, U>(page: Page<T>, f: impl FnMut(T) -> U) -> ApiResponse<Vec<U>> {
    let p = page.pagination();
    let meta = PaginationMeta {
        page: p.page,
        limit: p.limit,
        total: p.total,
        pages: p.pages,
    };
    ApiResponse::paginated(page.items.into_iter().map(f).collect(), meta)
}

pub fn user(u: User) -> UserResponse {
    UserResponse {
        full_name: u.full_name(),
        follower_count: u.follower_count(),
        following_count: u.following_count(),
        id: u.id,
        username: u.username,
        email: u.email,
        first_name: u.first_name,
        last_name: u.last_name,
        bio: u.bio,
        avatar: u.avatar,
        role: u.role.to_string(),
        is_verified: u.is_verified,
        followers: u.followers,
        following: u.following,
        created_at: u.created_at,
        updated_at: u.updated_at,
    }
}

pub fn public_user(u: User) -> PublicUserResponse {
    PublicUserResponse {
        full_name: u.full_name(),
        follower_count: u.follower_count(),
        following_count: u.following_count(),
        id: u.id,
        username: u.username,
        first_name: u.first_name,
        last_name: u.last_name,
        bio: u.bio,
        avatar: u.avatar,
        role: u.role.to_string(),
        is_verified: u.is_verified,
        followers: u.followers,
        following: u.following,
        created_at: u.created_at,
    }
}

pub fn author(u: User) -> AuthorSummary {
    AuthorSummary {
        id: u.id,
        username: u.username,
        first_name: u.first_name,
        last_name: u.last_name,
        avatar: u.avatar,
    }
}

pub fn user_summary(u: User) -> UserSummary {
    UserSummary {
        id: u.id,
        username: u.username,
        first_name: u.first_name,
        last_name: u.last_name,
        avatar: u.avatar,
        bio: u.bio,
    }
}

pub fn auth(session: AuthSession) -> AuthResponse {
    AuthResponse {
        user: user(session.user),
        token: TokenResponse {
            access_token: session.token,
            token_type: "Bearer".to_string(),
            expires_in: session.expires_in,
        },
    }
}

pub fn profile(p: UserProfile) -> ProfileResponse {
    ProfileResponse {
        user: public_user(p.user),
        recent_posts: p.recent_posts.into_iter().map(post_summary).collect(),
    }
}

pub fn post_summary(entry: PostEntry) -> PostSummary {
    let PostEntry {
        post,
        author: post_author,
        comment_count,
    } = entry;
    PostSummary {
        like_count: post.like_count(),
        id: post.id,
        title: post.title,
        excerpt: post.excerpt,
        slug: post.slug,
        author: post_author.map(author),
        tags: post.tags,
        category: post.category.to_string(),
        status: post.status.to_string(),
        featured_image: post.featured_image,
        comment_count,
        view_count: post.view_count,
        read_time: post.read_time,
        published_at: post.published_at,
        created_at: post.created_at,
    }
}

pub fn post(entry: PostEntry) -> PostResponse {
    let PostEntry {
        post,
        author: post_author,
        comment_count,
    } = entry;
    PostResponse {
        like_count: post.like_count(),
        is_published: post.is_published(),
        id: post.id,
        title: post.title,
        content: post.content,
        excerpt: post.excerpt,
        slug: post.slug,
        author: post_author.map(author),
        tags: post.tags,
        category: post.category.to_string(),
        status: post.status.to_string(),
        featured_image: post.featured_image,
        likes: post.likes,
        comment_count,
        view_count: post.view_count,
        read_time: post.read_time,
        published_at: post.published_at,
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

fn post_ref(p: Post) -> PostRef {
    PostRef {
        id: p.id,
        title: p.title,
        slug: p.slug,
    }
}

pub fn comment(entry: CommentEntry) -> CommentResponse {
    let CommentEntry {
        comment: c,
        author: comment_author,
        replies,
        reply_count,
        post,
    } = entry;
    CommentResponse {
        like_count: c.like_count(),
        id: c.id,
        content: c.content,
        post_id: c.post_id,
        parent_comment_id: c.parent_id,
        author: comment_author.map(author),
        likes: c.likes,
        reply_count,
        replies: replies.into_iter().map(comment).collect(),
        is_edited: c.is_edited,
        edited_at: c.edited_at,
        created_at: c.created_at,
        updated_at: c.updated_at,
        post: post.map(post_ref),
    }
}

pub fn dashboard(stats: DashboardStats) -> DashboardResponse {
    DashboardResponse {
        stats: DashboardTotals {
            total_users: stats.total_users,
            total_posts: stats.total_posts,
            total_comments: stats.total_comments,
            published_posts: stats.published_posts,
            draft_posts: stats.draft_posts,
        },
        recent_users: stats.recent_users.into_iter().map(user).collect(),
        recent_posts: stats.recent_posts.into_iter().map(post_summary).collect(),
        posts_by_category: stats
            .posts_by_category
            .into_iter()
            .map(|c| CategoryCountResponse {
                category: c.category.to_string(),
                count: c.count,
            })
            .collect(),
        monthly_users: stats
            .monthly_users
            .into_iter()
            .map(|m| MonthlyCountResponse {
                year: m.year,
                month: m.month,
                count: m.count,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::domain::{Category, PageRequest, PostStatus, Role};

    #[test]
    fn test_parse_field_reports_the_field() {
        let err = parse_field::<Category>("category", "Gardening").unwrap_err();
        match err {
            AppError::Validation(fields) => assert_eq!(fields[0].field, "category"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(parse_field::<Role>("role", "moderator").unwrap(), Role::Moderator);
    }

    #[test]
    fn test_parse_optional_ignores_blank() {
        assert_eq!(parse_optional::<PostStatus>("status", Some("  ")).unwrap(), None);
        assert_eq!(parse_optional::<PostStatus>("status", None).unwrap(), None);
        assert_eq!(
            parse_optional::<PostStatus>("status", Some("archived")).unwrap(),
            Some(PostStatus::Archived)
        );
    }

    #[test]
    fn test_user_response_hides_password_and_counts_follows() {
        let mut u = User::new("ada", "ada@example.com", "secret-hash".into(), "Ada", "Lovelace");
        u.followers = vec![uuid::Uuid::new_v4(), uuid::Uuid::new_v4()];

        let json = serde_json::to_value(user(u)).unwrap();
        assert_eq!(json["fullName"], "Ada Lovelace");
        assert_eq!(json["followerCount"], 2);
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn test_public_user_omits_email() {
        let u = User::new("ada", "ada@example.com", "secret-hash".into(), "Ada", "Lovelace");

        let json = serde_json::to_value(public_user(u)).unwrap();
        assert_eq!(json["username"], "ada");
        assert_eq!(json["fullName"], "Ada Lovelace");
        assert!(json.get("email").is_none());
        assert!(json.get("passwordHash").is_none());
    }

    #[test]
    fn test_paginated_envelope() {
        let page = Page::new(vec![1, 2], 12, PageRequest::new(Some(2), Some(5)));
        let json = serde_json::to_value(paginated(page, |n| n * 10)).unwrap();
        assert_eq!(json["data"], serde_json::json!([10, 20]));
        assert_eq!(json["pagination"]["pages"], 3);
        assert_eq!(json["pagination"]["page"], 2);
    }
}
