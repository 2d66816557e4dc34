use axum::{extract::State, response::IntoResponse};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    auth::jwt,
    error::AppError,
    extract::AppPath,
    follows::graph,
    response::{ApiResponse, SuccessMarker},
};

/// Follow a user
/// POST /api/users/:id/follow
pub async fn follow_user(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
    AppPath(user_id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    graph::follow(&pool, claims.sub, user_id).await?;

    Ok(ApiResponse::success(SuccessMarker::ok()))
}

/// Unfollow a user
/// DELETE /api/users/:id/follow
pub async fn unfollow_user(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
    AppPath(user_id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    graph::unfollow(&pool, claims.sub, user_id).await?;

    Ok(ApiResponse::success(SuccessMarker::ok()))
}
