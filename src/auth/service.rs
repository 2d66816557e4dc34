use sqlx::PgPool;

use crate::{
    auth::{utils, RegisterUser, User},
    error::{conflict_or_db_error, db_error, AppError},
};

/// Creates the account. Duplicate email or username (case-insensitive) is a `Conflict`.
pub async fn register(pool: &PgPool, payload: &RegisterUser) -> Result<User, AppError> {
    let password_hash = utils::hash_password(&payload.password).map_err(|e| {
        tracing::error!("Password hashing failed: {:?}", e);
        AppError::InternalServerError
    })?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, username, name, password_hash, bio, location, website, avatar, cover_image)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(payload.email.trim())
    .bind(payload.username.trim())
    .bind(&payload.name)
    .bind(&password_hash)
    .bind(&payload.bio)
    .bind(&payload.location)
    .bind(&payload.website)
    .bind(&payload.avatar)
    .bind(&payload.cover_image)
    .fetch_one(pool)
    .await
    .map_err(|e| conflict_or_db_error(e, "Email or username already exists"))?;

    tracing::info!(user_id = %user.id, "user registered");
    Ok(user)
}

/// Returns the user when the credentials match. An unknown email and a wrong
/// password both yield `None`.
pub async fn authenticate(
    pool: &PgPool,
    email: &str,
    password: &str,
) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email.trim())
        .fetch_optional(pool)
        .await
        .map_err(db_error)?;

    Ok(user.filter(|u| utils::verify_password(&u.password_hash, password).is_ok()))
}
