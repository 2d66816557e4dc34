use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    conversations::{
        ordered_pair, Conversation, ConversationResponse, ConversationRow, Message,
        MessageResponse, MessageRow,
    },
    error::{db_error, AppError},
    users,
};

const CONVERSATION_SELECT: &str = r#"
    SELECT
        c.id, c.created_at, c.updated_at,
        lo.id AS low_id, lo.name AS low_name, lo.username AS low_username, lo.avatar AS low_avatar,
        hi.id AS high_id, hi.name AS high_name, hi.username AS high_username, hi.avatar AS high_avatar,
        m.id AS last_message_id, m.sender_id AS last_message_sender_id,
        m.content AS last_message_content, m.created_at AS last_message_created_at
    FROM conversations c
    JOIN users lo ON lo.id = c.participant_low
    JOIN users hi ON hi.id = c.participant_high
    LEFT JOIN LATERAL (
        SELECT id, sender_id, content, created_at
        FROM messages
        WHERE conversation_id = c.id
        ORDER BY created_at DESC, id DESC
        LIMIT 1
    ) m ON TRUE
"#;

const MESSAGE_SELECT: &str = r#"
    SELECT
        m.id, m.conversation_id, m.content, m.created_at,
        u.id AS sender_id, u.name AS sender_name, u.username AS sender_username,
        u.avatar AS sender_avatar
    FROM messages m
    JOIN users u ON m.sender_id = u.id
"#;

async fn load(pool: &PgPool, conversation_id: Uuid) -> Result<ConversationResponse, AppError> {
    sqlx::query_as::<_, ConversationRow>(&format!("{CONVERSATION_SELECT} WHERE c.id = $1"))
        .bind(conversation_id)
        .fetch_optional(pool)
        .await
        .map_err(db_error)?
        .map(ConversationResponse::from)
        .ok_or(AppError::NotFound("Conversation not found".to_string()))
}

/// Finds the conversation between the two users, creating it on first contact.
pub async fn create_or_get(
    pool: &PgPool,
    user_id: Uuid,
    other_user_id: Uuid,
) -> Result<ConversationResponse, AppError> {
    if user_id == other_user_id {
        return Err(AppError::BadRequest("You cannot message yourself".to_string()));
    }

    if !users::service::user_exists(pool, other_user_id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let (low, high) = ordered_pair(user_id, other_user_id);

    // The no-op update makes RETURNING yield the existing row on conflict.
    let conversation = sqlx::query_as::<_, Conversation>(
        r#"
        INSERT INTO conversations (participant_low, participant_high)
        VALUES ($1, $2)
        ON CONFLICT (participant_low, participant_high)
        DO UPDATE SET participant_low = EXCLUDED.participant_low
        RETURNING *
        "#,
    )
    .bind(low)
    .bind(high)
    .fetch_one(pool)
    .await
    .map_err(db_error)?;

    load(pool, conversation.id).await
}

/// Most recently active first, each with its latest message.
pub async fn list_for(pool: &PgPool, user_id: Uuid) -> Result<Vec<ConversationResponse>, AppError> {
    let rows = sqlx::query_as::<_, ConversationRow>(&format!(
        "{CONVERSATION_SELECT} WHERE $1 IN (c.participant_low, c.participant_high) ORDER BY c.updated_at DESC, c.id DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(db_error)?;

    Ok(rows.into_iter().map(ConversationResponse::from).collect())
}

/// Non-participants get the same `NotFound` as for a missing conversation.
async fn require_participant(
    pool: &PgPool,
    conversation_id: Uuid,
    user_id: Uuid,
) -> Result<Conversation, AppError> {
    sqlx::query_as::<_, Conversation>(
        "SELECT * FROM conversations WHERE id = $1 AND $2 IN (participant_low, participant_high)",
    )
    .bind(conversation_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(db_error)?
    .ok_or(AppError::NotFound("Conversation not found".to_string()))
}

/// Oldest first.
pub async fn list_messages(
    pool: &PgPool,
    conversation_id: Uuid,
    user_id: Uuid,
) -> Result<Vec<MessageResponse>, AppError> {
    require_participant(pool, conversation_id, user_id).await?;

    let rows = sqlx::query_as::<_, MessageRow>(&format!(
        "{MESSAGE_SELECT} WHERE m.conversation_id = $1 ORDER BY m.created_at ASC, m.id ASC"
    ))
    .bind(conversation_id)
    .fetch_all(pool)
    .await
    .map_err(db_error)?;

    Ok(rows.into_iter().map(MessageResponse::from).collect())
}

/// Appends the message, then moves the conversation to the top of the list.
/// A failed bump is logged; the message stays.
pub async fn send_message(
    pool: &PgPool,
    conversation_id: Uuid,
    user_id: Uuid,
    content: &str,
) -> Result<MessageResponse, AppError> {
    require_participant(pool, conversation_id, user_id).await?;

    let message = sqlx::query_as::<_, Message>(
        r#"
        INSERT INTO messages (conversation_id, sender_id, content)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(conversation_id)
    .bind(user_id)
    .bind(content)
    .fetch_one(pool)
    .await
    .map_err(db_error)?;

    if let Err(e) = sqlx::query("UPDATE conversations SET updated_at = NOW() WHERE id = $1")
        .bind(conversation_id)
        .execute(pool)
        .await
    {
        tracing::warn!(%conversation_id, "failed to bump conversation: {:?}", e);
    }

    sqlx::query_as::<_, MessageRow>(&format!("{MESSAGE_SELECT} WHERE m.id = $1"))
        .bind(message.id)
        .fetch_one(pool)
        .await
        .map(MessageResponse::from)
        .map_err(db_error)
}
