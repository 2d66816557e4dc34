use axum::{extract::State, response::IntoResponse};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    auth::{jwt, service, AuthResponse, LoginUser, RegisterUser, User, UserResponse},
    config::settings::Settings,
    error::AppError,
    extract::AppJson,
    response::ApiResponse,
    users,
};

fn session_for(user: User, settings: &Settings) -> Result<AuthResponse, AppError> {
    let token = jwt::issue_session(user.id, &user.email, settings).map_err(|e| {
        tracing::error!("Token encoding failed: {:?}", e);
        AppError::InternalServerError
    })?;

    Ok(AuthResponse {
        token,
        user: UserResponse::from(user),
    })
}

/// POST /api/auth/signup
pub async fn signup(
    State(pool): State<PgPool>,
    State(settings): State<Settings>,
    AppJson(payload): AppJson<RegisterUser>,
) -> Result<impl IntoResponse, AppError> {
    let payload = payload.normalized();
    payload
        .validate()
        .map_err(|e| AppError::UnprocessableEntity(e.to_string()))?;

    let user = service::register(&pool, &payload).await?;

    Ok(ApiResponse::success(session_for(user, &settings)?).created())
}

/// POST /api/auth/login
pub async fn login(
    State(pool): State<PgPool>,
    State(settings): State<Settings>,
    AppJson(payload): AppJson<LoginUser>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::UnprocessableEntity(e.to_string()))?;

    let user = service::authenticate(&pool, &payload.email, &payload.password)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(ApiResponse::success(session_for(user, &settings)?))
}

/// GET /api/auth/profile
pub async fn get_me(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
) -> Result<impl IntoResponse, AppError> {
    let profile = users::service::find_profile_by_id(&pool, claims.sub)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    Ok(ApiResponse::success(profile))
}
