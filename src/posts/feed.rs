//! Read-side composition of post listings: global, by author, replies hidden,
//! following-only, and any combination of those, one page at a time.

use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    error::{db_error, AppError},
    follows::graph,
    posts::{PostFilter, PostResponse, PostRow},
};

/// Deliberately small so clients hit the pagination path early.
pub const DEFAULT_PAGE_SIZE: i64 = 3;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: i64,
    pub limit: i64,
}

impl Page {
    /// Pages are 1-based; out-of-range values are clamped rather than rejected.
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            number: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.number - 1).saturating_mul(self.limit)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone, Default)]
pub struct FeedQuery {
    pub viewer: Option<Uuid>,
    pub author_id: Option<Uuid>,
    pub exclude_replies: bool,
    /// Ignored when there is no viewer.
    pub only_following: bool,
    pub page: Page,
}

impl FeedQuery {
    pub fn new(viewer: Option<Uuid>, filter: &PostFilter) -> Self {
        Self {
            viewer,
            author_id: filter.author_id,
            exclude_replies: filter.exclude_replies.unwrap_or(false),
            only_following: filter.only_following.unwrap_or(false),
            page: Page::new(filter.page, filter.limit),
        }
    }

    fn restricts_to_following(&self) -> bool {
        self.only_following && self.viewer.is_some()
    }

    /// `following` is the viewer's following set; it is only read when the
    /// query restricts to followed authors. The viewer's own posts are not
    /// added to it.
    pub(crate) fn build(&self, following: &[Uuid]) -> QueryBuilder<'static, Postgres> {
        let mut builder = annotated_select(self.viewer);
        builder.push(" WHERE TRUE");

        if let Some(author_id) = self.author_id {
            builder.push(" AND p.author_id = ").push_bind(author_id);
        }

        if self.exclude_replies {
            builder.push(" AND p.parent_id IS NULL");
        }

        if self.restricts_to_following() {
            builder
                .push(" AND p.author_id = ANY(")
                .push_bind(following.to_vec())
                .push(")");
        }

        builder
            .push(" ORDER BY p.created_at DESC, p.id DESC LIMIT ")
            .push_bind(self.page.limit)
            .push(" OFFSET ")
            .push_bind(self.page.offset());

        builder
    }
}

/// `SELECT ... FROM posts p JOIN users u` with author, counters and, for a
/// known viewer, whether they liked the post. Callers append the WHERE clause.
pub(crate) fn annotated_select(viewer: Option<Uuid>) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(
        r#"
        SELECT
            p.id, p.content, p.image, p.parent_id, p.views, p.created_at, p.updated_at,
            u.id AS author_id, u.name AS author_name, u.username AS author_username,
            u.avatar AS author_avatar,
            (SELECT COUNT(*) FROM likes l WHERE l.post_id = p.id) AS like_count,
            (SELECT COUNT(*) FROM posts c WHERE c.parent_id = p.id) AS reply_count,
        "#,
    );

    match viewer {
        Some(viewer) => {
            builder
                .push("EXISTS(SELECT 1 FROM likes l WHERE l.post_id = p.id AND l.user_id = ")
                .push_bind(viewer)
                .push(") AS is_liked");
        }
        None => {
            builder.push("NULL::BOOLEAN AS is_liked");
        }
    }

    builder.push(" FROM posts p JOIN users u ON p.author_id = u.id");
    builder
}

/// Newest first, one page.
pub async fn list(pool: &PgPool, query: &FeedQuery) -> Result<Vec<PostResponse>, AppError> {
    let following: Vec<Uuid> = match query.viewer {
        Some(viewer) if query.restricts_to_following() => {
            graph::following_ids(pool, viewer).await?.into_iter().collect()
        }
        _ => Vec::new(),
    };

    let rows = query
        .build(&following)
        .build_query_as::<PostRow>()
        .fetch_all(pool)
        .await
        .map_err(|e| {
            tracing::error!("Feed error: {:?}", e);
            AppError::InternalServerError
        })?;

    Ok(rows.into_iter().map(PostResponse::from).collect())
}

/// Direct children of `parent_id`, oldest first.
pub(crate) async fn replies(
    pool: &PgPool,
    parent_id: Uuid,
    viewer: Option<Uuid>,
) -> Result<Vec<PostResponse>, AppError> {
    let mut builder = annotated_select(viewer);
    builder
        .push(" WHERE p.parent_id = ")
        .push_bind(parent_id)
        .push(" ORDER BY p.created_at ASC, p.id ASC");

    let rows = builder
        .build_query_as::<PostRow>()
        .fetch_all(pool)
        .await
        .map_err(db_error)?;

    Ok(rows.into_iter().map(PostResponse::from).collect())
}
