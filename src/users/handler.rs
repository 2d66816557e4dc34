use axum::{extract::State, response::IntoResponse};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    auth::{jwt, UserResponse},
    error::AppError,
    extract::{AppJson, AppPath},
    response::ApiResponse,
    users::{service, UpdateProfile},
};

/// GET /api/users/:username
pub async fn get_profile(
    State(pool): State<PgPool>,
    claims: Option<jwt::Claims>,
    AppPath(username): AppPath<String>,
) -> Result<impl IntoResponse, AppError> {
    let viewer = claims.map(|c| c.sub);

    let profile = service::find_profile_by_username(&pool, &username, viewer)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User @{} not found", username)))?;

    Ok(ApiResponse::success(profile))
}

/// PATCH /api/users/profile
pub async fn update_profile(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
    AppJson(payload): AppJson<UpdateProfile>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::UnprocessableEntity(e.to_string()))?;

    let user = service::update_profile(&pool, claims.sub, &payload).await?;

    Ok(ApiResponse::success(UserResponse::from(user)))
}
