use axum::{extract::State, response::IntoResponse};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    auth::jwt,
    error::AppError,
    extract::AppPath,
    notifications::{service, UnreadCount},
    response::ApiResponse,
};

/// GET /api/notifications
pub async fn list_notifications(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
) -> Result<impl IntoResponse, AppError> {
    let notifications = service::list_for(&pool, claims.sub).await?;

    Ok(ApiResponse::success(notifications))
}

/// GET /api/notifications/unread-count
pub async fn unread_count(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
) -> Result<impl IntoResponse, AppError> {
    let count = service::unread_count(&pool, claims.sub).await?;

    Ok(ApiResponse::success(UnreadCount { count }))
}

/// PATCH /api/notifications/:id/read
///
/// Answers `data: null` for a notification that is not the caller's.
pub async fn mark_read(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let notification = service::mark_read(&pool, id, claims.sub).await?;

    Ok(ApiResponse::success(notification))
}
