use axum::{extract::State, response::IntoResponse};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::jwt,
    error::AppError,
    extract::{AppJson, AppPath, AppQuery},
    posts::{
        feed::{self, FeedQuery},
        store, CreatePost, PostFilter, UpdatePost,
    },
    response::ApiResponse,
};

/// POST /api/posts
pub async fn create_post(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
    AppJson(payload): AppJson<CreatePost>,
) -> Result<impl IntoResponse, AppError> {
    payload.check()?;

    let post = store::create(&pool, claims.sub, &payload).await?;

    Ok(ApiResponse::success(post).created())
}

/// GET /api/posts
///
/// A bad or expired token only downgrades the request to anonymous.
pub async fn list_posts(
    State(pool): State<PgPool>,
    claims: Option<jwt::Claims>,
    AppQuery(filter): AppQuery<PostFilter>,
) -> Result<impl IntoResponse, AppError> {
    let query = FeedQuery::new(claims.map(|c| c.sub), &filter);

    let posts = feed::list(&pool, &query).await?;

    Ok(ApiResponse::success(posts))
}

/// GET /api/posts/:id
pub async fn get_post(
    State(pool): State<PgPool>,
    claims: Option<jwt::Claims>,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let post = store::get_one(&pool, id, claims.map(|c| c.sub))
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    Ok(ApiResponse::success(post))
}

/// PATCH /api/posts/:id
pub async fn update_post(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdatePost>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::UnprocessableEntity(e.to_string()))?;

    let post = store::update(&pool, id, claims.sub, &payload.content).await?;

    Ok(ApiResponse::success(post))
}

/// DELETE /api/posts/:id
pub async fn delete_post(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let post = store::remove(&pool, id, claims.sub).await?;

    Ok(ApiResponse::success(post))
}

/// POST /api/posts/:id/like
pub async fn toggle_like(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let result = store::toggle_like(&pool, id, claims.sub).await?;

    Ok(ApiResponse::success(result))
}
