use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::{db_error, AppError},
    notifications::{Notification, NotificationEvent, NotificationResponse, NotificationRow},
};

/// Plain insert. Identical events produce identical rows.
pub async fn create(pool: &PgPool, event: &NotificationEvent) -> Result<Notification, AppError> {
    sqlx::query_as::<_, Notification>(
        r#"
        INSERT INTO notifications (user_id, issuer_id, kind, post_id)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(event.recipient_id)
    .bind(event.issuer_id)
    .bind(event.kind)
    .bind(event.post_id)
    .fetch_one(pool)
    .await
    .map_err(db_error)
}

/// Fan-out entry point for writes that already committed. Self-actions are
/// dropped; a failed insert is logged and never reaches the caller.
pub async fn emit(pool: &PgPool, event: NotificationEvent) {
    if event.is_self_action() {
        return;
    }

    match create(pool, &event).await {
        Ok(notification) => tracing::debug!(
            notification_id = %notification.id,
            kind = ?notification.kind,
            "notification emitted"
        ),
        Err(e) => tracing::warn!(
            error = ?e,
            kind = ?event.kind,
            recipient = %event.recipient_id,
            "failed to emit notification, primary write kept"
        ),
    }
}

/// Newest first.
pub async fn list_for(
    pool: &PgPool,
    recipient_id: Uuid,
) -> Result<Vec<NotificationResponse>, AppError> {
    let rows = sqlx::query_as::<_, NotificationRow>(
        r#"
        SELECT
            n.id, n.kind, n.read, n.created_at,
            u.id AS issuer_id, u.name AS issuer_name, u.username AS issuer_username,
            u.avatar AS issuer_avatar,
            p.id AS post_id, p.content AS post_content
        FROM notifications n
        JOIN users u ON n.issuer_id = u.id
        LEFT JOIN posts p ON n.post_id = p.id
        WHERE n.user_id = $1
        ORDER BY n.created_at DESC, n.id DESC
        "#,
    )
    .bind(recipient_id)
    .fetch_all(pool)
    .await
    .map_err(db_error)?;

    Ok(rows.into_iter().map(NotificationResponse::from).collect())
}

/// `None` when the notification does not exist or belongs to someone else;
/// the two cases are deliberately indistinguishable and neither is an error.
pub async fn mark_read(
    pool: &PgPool,
    notification_id: Uuid,
    recipient_id: Uuid,
) -> Result<Option<Notification>, AppError> {
    sqlx::query_as::<_, Notification>(
        "UPDATE notifications SET read = TRUE WHERE id = $1 AND user_id = $2 RETURNING *",
    )
    .bind(notification_id)
    .bind(recipient_id)
    .fetch_optional(pool)
    .await
    .map_err(db_error)
}

pub async fn unread_count(pool: &PgPool, recipient_id: Uuid) -> Result<i64, AppError> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND NOT read",
    )
    .bind(recipient_id)
    .fetch_one(pool)
    .await
    .map_err(db_error)
}
