use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    auth::User,
    error::{db_error, AppError},
    follows::graph,
    users::{ProfileResponse, ProfileRow, UpdateProfile},
};

const PROFILE_SELECT: &str = r#"
    SELECT
        u.*,
        (SELECT COUNT(*) FROM follows WHERE following_id = u.id) AS followers_count,
        (SELECT COUNT(*) FROM follows WHERE follower_id = u.id) AS following_count,
        (SELECT COUNT(*) FROM posts WHERE author_id = u.id) AS posts_count
    FROM users u
"#;

pub async fn user_exists(pool: &PgPool, user_id: Uuid) -> Result<bool, AppError> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .map_err(db_error)
}

pub async fn find_profile_by_id(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<ProfileResponse>, AppError> {
    let row = sqlx::query_as::<_, ProfileRow>(&format!("{PROFILE_SELECT} WHERE u.id = $1"))
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map_err(db_error)?;

    Ok(row.map(ProfileResponse::from))
}

/// Case-insensitive lookup. `is_following` is filled in only for a known viewer.
pub async fn find_profile_by_username(
    pool: &PgPool,
    username: &str,
    viewer: Option<Uuid>,
) -> Result<Option<ProfileResponse>, AppError> {
    let row = sqlx::query_as::<_, ProfileRow>(&format!(
        "{PROFILE_SELECT} WHERE LOWER(u.username) = LOWER($1)"
    ))
    .bind(username)
    .fetch_optional(pool)
    .await
    .map_err(db_error)?;

    let Some(row) = row else {
        return Ok(None);
    };

    let mut profile = ProfileResponse::from(row);
    if let Some(viewer) = viewer {
        profile.is_following = Some(graph::is_following(pool, viewer, profile.user.id).await?);
    }

    Ok(Some(profile))
}

pub async fn update_profile(
    pool: &PgPool,
    user_id: Uuid,
    changes: &UpdateProfile,
) -> Result<User, AppError> {
    sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET
            name = COALESCE($2, name),
            bio = COALESCE($3, bio),
            location = COALESCE($4, location),
            website = COALESCE($5, website),
            avatar = COALESCE($6, avatar),
            cover_image = COALESCE($7, cover_image),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(&changes.name)
    .bind(&changes.bio)
    .bind(&changes.location)
    .bind(&changes.website)
    .bind(&changes.avatar)
    .bind(&changes.cover_image)
    .fetch_optional(pool)
    .await
    .map_err(db_error)?
    .ok_or(AppError::NotFound("User not found".to_string()))
}
