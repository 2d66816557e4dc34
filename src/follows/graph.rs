use std::collections::HashSet;

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::{conflict_or_db_error, db_error, AppError},
    follows::Follow,
    notifications::{service as notifications, NotificationEvent},
    users,
};

/// Creates the edge and notifies the target. Following someone twice is a
/// `Conflict`, not a no-op.
pub async fn follow(pool: &PgPool, follower_id: Uuid, target_id: Uuid) -> Result<Follow, AppError> {
    if follower_id == target_id {
        return Err(AppError::BadRequest("You cannot follow yourself".to_string()));
    }

    if !users::service::user_exists(pool, target_id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let edge = sqlx::query_as::<_, Follow>(
        "INSERT INTO follows (follower_id, following_id) VALUES ($1, $2) RETURNING *",
    )
    .bind(follower_id)
    .bind(target_id)
    .fetch_one(pool)
    .await
    .map_err(|e| conflict_or_db_error(e, "Already following this user"))?;

    notifications::emit(pool, NotificationEvent::follow(target_id, follower_id)).await;

    Ok(edge)
}

pub async fn unfollow(pool: &PgPool, follower_id: Uuid, target_id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND following_id = $2")
        .bind(follower_id)
        .bind(target_id)
        .execute(pool)
        .await
        .map_err(db_error)?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Not following this user".to_string()));
    }

    Ok(())
}

pub async fn is_following(pool: &PgPool, viewer_id: Uuid, subject_id: Uuid) -> Result<bool, AppError> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM follows WHERE follower_id = $1 AND following_id = $2)",
    )
    .bind(viewer_id)
    .bind(subject_id)
    .fetch_one(pool)
    .await
    .map_err(db_error)
}

pub async fn following_ids(pool: &PgPool, user_id: Uuid) -> Result<HashSet<Uuid>, AppError> {
    let ids = sqlx::query_scalar::<_, Uuid>("SELECT following_id FROM follows WHERE follower_id = $1")
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(db_error)?;

    Ok(ids.into_iter().collect())
}
