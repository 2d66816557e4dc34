use axum::{extract::State, response::IntoResponse};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::jwt,
    conversations::{service, CreateConversation, SendMessage},
    error::AppError,
    extract::{AppJson, AppPath},
    response::ApiResponse,
};

/// POST /api/conversations
pub async fn create_or_get(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
    AppJson(payload): AppJson<CreateConversation>,
) -> Result<impl IntoResponse, AppError> {
    let conversation = service::create_or_get(&pool, claims.sub, payload.other_user_id).await?;

    Ok(ApiResponse::success(conversation))
}

/// GET /api/conversations
pub async fn list_conversations(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
) -> Result<impl IntoResponse, AppError> {
    let conversations = service::list_for(&pool, claims.sub).await?;

    Ok(ApiResponse::success(conversations))
}

/// GET /api/conversations/:id/messages
pub async fn list_messages(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let messages = service::list_messages(&pool, id, claims.sub).await?;

    Ok(ApiResponse::success(messages))
}

/// POST /api/conversations/:id/messages
pub async fn send_message(
    State(pool): State<PgPool>,
    claims: jwt::Claims,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<SendMessage>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::UnprocessableEntity(e.to_string()))?;

    let message = service::send_message(&pool, id, claims.sub, &payload.content).await?;

    Ok(ApiResponse::success(message).created())
}
