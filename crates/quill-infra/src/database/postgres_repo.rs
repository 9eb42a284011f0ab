//! PostgreSQL repository implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, Func, NullOrdering, SimpleExpr};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, Order, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use uuid::Uuid;

use quill_core::domain::{Category, Comment, Page, PageRequest, Post, User};
use quill_core::error::RepoError;
use quill_core::ports::{
    CommentQuery, CommentRepository, CommentSort, PostQuery, PostRepository, PostSort, SortOrder,
    ThreadFilter, UserQuery, UserRepository, UserSearchScope,
};

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// `%needle%` for a case-insensitive LIKE, with wildcards in the needle escaped.
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for ch in needle.to_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

fn lower_like<C: ColumnTrait>(column: C, pattern: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(pattern)
}

fn mask_email(email: &str) -> String {
    match email.find('@') {
        Some(at) => {
            let (local, domain) = email.split_at(at);
            let masked_local = match local.chars().next() {
                Some(first) if local.len() > 1 => format!("{first}***"),
                _ => "***".to_string(),
            };
            format!("{masked_local}{domain}")
        }
        None => "***".to_string(),
    }
}

fn user_condition(query: &UserQuery) -> Condition {
    let mut cond = Condition::all();
    if let Some(role) = query.role {
        cond = cond.add(user::Column::Role.eq(role.as_str()));
    }
    if let Some(search) = query.search.as_deref() {
        let pattern = like_pattern(search);
        let fourth = match query.scope {
            UserSearchScope::Profile => user::Column::Bio,
            UserSearchScope::Account => user::Column::Email,
        };
        cond = cond.add(
            Condition::any()
                .add(lower_like(user::Column::Username, &pattern))
                .add(lower_like(user::Column::FirstName, &pattern))
                .add(lower_like(user::Column::LastName, &pattern))
                .add(lower_like(fourth, &pattern)),
        );
    }
    cond
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let found = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.conn())
            .await
            .map_err(map_db_err)?;

        Ok(found.map(Into::into))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let found = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(self.conn())
            .await
            .map_err(map_db_err)?;

        Ok(found.map(Into::into))
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let found = UserEntity::find()
            .filter(user::Column::Id.is_in(ids.iter().copied()))
            .all(self.conn())
            .await
            .map_err(map_db_err)?;

        Ok(found.into_iter().map(Into::into).collect())
    }

    async fn list(&self, query: &UserQuery, page: PageRequest) -> Result<Page<User>, RepoError> {
        let select = UserEntity::find().filter(user_condition(query));

        let total = select.clone().count(self.conn()).await.map_err(map_db_err)?;
        let found = select
            .order_by_desc(user::Column::CreatedAt)
            .order_by_asc(user::Column::Id)
            .offset(page.offset())
            .limit(page.limit)
            .all(self.conn())
            .await
            .map_err(map_db_err)?;

        Ok(Page::new(
            found.into_iter().map(Into::into).collect(),
            total,
            page,
        ))
    }

    async fn count(&self) -> Result<u64, RepoError> {
        UserEntity::find().count(self.conn()).await.map_err(map_db_err)
    }

    async fn created_since(&self, since: DateTime<Utc>) -> Result<Vec<DateTime<Utc>>, RepoError> {
        let stamps: Vec<sea_orm::prelude::DateTimeWithTimeZone> = UserEntity::find()
            .select_only()
            .column(user::Column::CreatedAt)
            .filter(user::Column::CreatedAt.gte(since))
            .into_tuple()
            .all(self.conn())
            .await
            .map_err(map_db_err)?;

        Ok(stamps.into_iter().map(Into::into).collect())
    }

    async fn remove_from_follow_graph(&self, user_id: Uuid) -> Result<u64, RepoError> {
        let result = UserEntity::update_many()
            .col_expr(
                user::Column::Followers,
                Expr::cust_with_values(r#"array_remove("followers", $1)"#, [user_id]),
            )
            .col_expr(
                user::Column::Following,
                Expr::cust_with_values(r#"array_remove("following", $1)"#, [user_id]),
            )
            .filter(
                Condition::any()
                    .add(Expr::cust_with_values(r#"$1 = ANY("followers")"#, [user_id]))
                    .add(Expr::cust_with_values(r#"$1 = ANY("following")"#, [user_id])),
            )
            .exec(self.conn())
            .await
            .map_err(map_db_err)?;

        Ok(result.rows_affected)
    }
}

fn post_condition(query: &PostQuery) -> Condition {
    let mut cond = Condition::all();
    if let Some(status) = query.status {
        cond = cond.add(post::Column::Status.eq(status.as_str()));
    }
    if let Some(category) = query.category {
        cond = cond.add(post::Column::Category.eq(category.as_str()));
    }
    if let Some(author) = query.author {
        cond = cond.add(post::Column::AuthorId.eq(author));
    }
    if let Some(authors) = &query.authors {
        cond = cond.add(post::Column::AuthorId.is_in(authors.iter().copied()));
    }
    if let Some(search) = query.search.as_deref() {
        let pattern = like_pattern(search);
        cond = cond.add(
            Condition::any()
                .add(lower_like(post::Column::Title, &pattern))
                .add(lower_like(post::Column::Content, &pattern))
                .add(Expr::cust_with_values(
                    r#"EXISTS (SELECT 1 FROM unnest("posts"."tags") AS tag WHERE LOWER(tag) LIKE $1)"#,
                    [pattern],
                )),
        );
    }
    cond
}

fn sort_column(sort: PostSort) -> post::Column {
    match sort {
        PostSort::PublishedAt => post::Column::PublishedAt,
        PostSort::CreatedAt => post::Column::CreatedAt,
        PostSort::Title => post::Column::Title,
        PostSort::ViewCount => post::Column::ViewCount,
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let found = PostEntity::find()
            .filter(post::Column::Slug.eq(slug))
            .one(self.conn())
            .await
            .map_err(map_db_err)?;

        Ok(found.map(Into::into))
    }

    async fn slug_taken(&self, slug: &str, except: Option<Uuid>) -> Result<bool, RepoError> {
        let mut select = PostEntity::find().filter(post::Column::Slug.eq(slug));
        if let Some(id) = except {
            select = select.filter(post::Column::Id.ne(id));
        }
        let taken = select.count(self.conn()).await.map_err(map_db_err)?;
        Ok(taken > 0)
    }

    async fn list(&self, query: &PostQuery, page: PageRequest) -> Result<Page<Post>, RepoError> {
        if query.authors.as_ref().is_some_and(Vec::is_empty) {
            return Ok(Page::new(Vec::new(), 0, page));
        }

        let select = PostEntity::find().filter(post_condition(query));
        let total = select.clone().count(self.conn()).await.map_err(map_db_err)?;

        // NULL publish dates sort as the smallest value in both directions.
        let (order, nulls) = match query.order {
            SortOrder::Asc => (Order::Asc, NullOrdering::First),
            SortOrder::Desc => (Order::Desc, NullOrdering::Last),
        };
        let found = select
            .order_by_with_nulls(sort_column(query.sort), order.clone(), nulls)
            .order_by(post::Column::CreatedAt, order)
            .offset(page.offset())
            .limit(page.limit)
            .all(self.conn())
            .await
            .map_err(map_db_err)?;

        Ok(Page::new(
            found.into_iter().map(Into::into).collect(),
            total,
            page,
        ))
    }

    async fn count(&self, query: &PostQuery) -> Result<u64, RepoError> {
        if query.authors.as_ref().is_some_and(Vec::is_empty) {
            return Ok(0);
        }
        PostEntity::find()
            .filter(post_condition(query))
            .count(self.conn())
            .await
            .map_err(map_db_err)
    }

    async fn count_by_category(&self) -> Result<Vec<(Category, u64)>, RepoError> {
        let rows: Vec<(String, i64)> = PostEntity::find()
            .select_only()
            .column(post::Column::Category)
            .column_as(Expr::col(post::Column::Id).count(), "count")
            .group_by(post::Column::Category)
            .into_tuple()
            .all(self.conn())
            .await
            .map_err(map_db_err)?;

        let mut counts: Vec<(Category, u64)> = rows
            .into_iter()
            .map(|(category, count)| (category.parse().unwrap_or_default(), count as u64))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.as_str().cmp(b.0.as_str())));
        Ok(counts)
    }

    async fn find_ids_by_author(&self, author_id: Uuid) -> Result<Vec<Uuid>, RepoError> {
        PostEntity::find()
            .select_only()
            .column(post::Column::Id)
            .filter(post::Column::AuthorId.eq(author_id))
            .into_tuple()
            .all(self.conn())
            .await
            .map_err(map_db_err)
    }

    async fn delete_by_author(&self, author_id: Uuid) -> Result<u64, RepoError> {
        let result = PostEntity::delete_many()
            .filter(post::Column::AuthorId.eq(author_id))
            .exec(self.conn())
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected)
    }

    async fn increment_views(&self, id: Uuid) -> Result<(), RepoError> {
        let result = PostEntity::update_many()
            .col_expr(
                post::Column::ViewCount,
                Expr::col(post::Column::ViewCount).add(1),
            )
            .filter(post::Column::Id.eq(id))
            .exec(self.conn())
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

fn comment_condition(query: &CommentQuery) -> Condition {
    let mut cond = Condition::all();
    if let Some(post_id) = query.post {
        cond = cond.add(comment::Column::PostId.eq(post_id));
    }
    match query.thread {
        ThreadFilter::Any => cond,
        ThreadFilter::TopLevel => cond.add(comment::Column::ParentId.is_null()),
        ThreadFilter::RepliesTo(parent) => cond.add(comment::Column::ParentId.eq(parent)),
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn list(
        &self,
        query: &CommentQuery,
        page: PageRequest,
    ) -> Result<Page<Comment>, RepoError> {
        let select = CommentEntity::find().filter(comment_condition(query));
        let total = select.clone().count(self.conn()).await.map_err(map_db_err)?;

        let order = match query.sort {
            CommentSort::NewestFirst => Order::Desc,
            CommentSort::OldestFirst => Order::Asc,
        };
        let found = select
            .order_by(comment::Column::CreatedAt, order.clone())
            .order_by(comment::Column::Id, order)
            .offset(page.offset())
            .limit(page.limit)
            .all(self.conn())
            .await
            .map_err(map_db_err)?;

        Ok(Page::new(
            found.into_iter().map(Into::into).collect(),
            total,
            page,
        ))
    }

    async fn find_replies(&self, parent_ids: &[Uuid]) -> Result<Vec<Comment>, RepoError> {
        if parent_ids.is_empty() {
            return Ok(Vec::new());
        }
        let found = CommentEntity::find()
            .filter(comment::Column::ParentId.is_in(parent_ids.iter().copied()))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(self.conn())
            .await
            .map_err(map_db_err)?;

        Ok(found.into_iter().map(Into::into).collect())
    }

    async fn count(&self) -> Result<u64, RepoError> {
        CommentEntity::find().count(self.conn()).await.map_err(map_db_err)
    }

    async fn count_by_posts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, u64>, RepoError> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<(Uuid, i64)> = CommentEntity::find()
            .select_only()
            .column(comment::Column::PostId)
            .column_as(Expr::col(comment::Column::Id).count(), "count")
            .filter(comment::Column::PostId.is_in(post_ids.iter().copied()))
            .group_by(comment::Column::PostId)
            .into_tuple()
            .all(self.conn())
            .await
            .map_err(map_db_err)?;

        Ok(rows
            .into_iter()
            .map(|(post_id, count)| (post_id, count as u64))
            .collect())
    }

    async fn delete_thread(&self, id: Uuid) -> Result<u64, RepoError> {
        let result = CommentEntity::delete_many()
            .filter(
                Condition::any()
                    .add(comment::Column::Id.eq(id))
                    .add(comment::Column::ParentId.eq(id)),
            )
            .exec(self.conn())
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected)
    }

    async fn delete_by_posts(&self, post_ids: &[Uuid]) -> Result<u64, RepoError> {
        if post_ids.is_empty() {
            return Ok(0);
        }
        let result = CommentEntity::delete_many()
            .filter(comment::Column::PostId.is_in(post_ids.iter().copied()))
            .exec(self.conn())
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected)
    }

    async fn delete_by_author(&self, author_id: Uuid) -> Result<u64, RepoError> {
        let authored: Vec<Uuid> = CommentEntity::find()
            .select_only()
            .column(comment::Column::Id)
            .filter(comment::Column::AuthorId.eq(author_id))
            .into_tuple()
            .all(self.conn())
            .await
            .map_err(map_db_err)?;
        if authored.is_empty() {
            return Ok(0);
        }

        let result = CommentEntity::delete_many()
            .filter(
                Condition::any()
                    .add(comment::Column::Id.is_in(authored.iter().copied()))
                    .add(comment::Column::ParentId.is_in(authored.iter().copied())),
            )
            .exec(self.conn())
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod helper_tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("Rust"), "%rust%");
        assert_eq!(like_pattern("100%_off"), "%100\\%\\_off%");
    }

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("alice@example.com"), "a***@example.com");
        assert_eq!(mask_email("a@example.com"), "***@example.com");
        assert_eq!(mask_email("nonsense"), "***");
    }
}
