use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::{conflict_or_db_error, db_error, AppError},
    notifications::{service as notifications, NotificationEvent},
    posts::{
        feed::{self, annotated_select},
        CreatePost, LikeResponse, Post, PostDetailResponse, PostResponse, PostRow,
    },
};

pub async fn find_post(pool: &PgPool, post_id: Uuid) -> Result<Option<Post>, AppError> {
    sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = $1")
        .bind(post_id)
        .fetch_optional(pool)
        .await
        .map_err(db_error)
}

async fn find_owned_post(pool: &PgPool, post_id: Uuid, requester_id: Uuid) -> Result<Post, AppError> {
    let post = find_post(pool, post_id)
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    if post.author_id != requester_id {
        return Err(AppError::Forbidden(
            "You are not the author of this post".to_string(),
        ));
    }

    Ok(post)
}

async fn fetch_annotated(
    pool: &PgPool,
    post_id: Uuid,
    viewer: Option<Uuid>,
) -> Result<Option<PostResponse>, AppError> {
    let mut builder = annotated_select(viewer);
    builder.push(" WHERE p.id = ").push_bind(post_id);

    let row = builder
        .build_query_as::<PostRow>()
        .fetch_optional(pool)
        .await
        .map_err(db_error)?;

    Ok(row.map(PostResponse::from))
}

/// Inserts the post, then notifies the parent's author when this is a reply
/// to someone else.
pub async fn create(
    pool: &PgPool,
    author_id: Uuid,
    payload: &CreatePost,
) -> Result<PostResponse, AppError> {
    let parent = match payload.parent_id {
        Some(parent_id) => Some(
            find_post(pool, parent_id)
                .await?
                .ok_or(AppError::NotFound("Parent post not found".to_string()))?,
        ),
        None => None,
    };

    let image = payload.image.as_deref().filter(|s| !s.trim().is_empty());

    let post = sqlx::query_as::<_, Post>(
        r#"
        INSERT INTO posts (author_id, content, image, parent_id)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(author_id)
    .bind(payload.content.trim())
    .bind(image)
    .bind(payload.parent_id)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create post: {:?}", e);
        AppError::InternalServerError
    })?;

    if let Some(parent) = parent {
        notifications::emit(
            pool,
            NotificationEvent::reply(parent.author_id, author_id, post.id),
        )
        .await;
    }

    fetch_annotated(pool, post.id, Some(author_id))
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))
}

/// Likes the post, or removes the like if there already is one. Only the
/// liking path notifies.
pub async fn toggle_like(pool: &PgPool, post_id: Uuid, user_id: Uuid) -> Result<LikeResponse, AppError> {
    let post = find_post(pool, post_id)
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    let removed = sqlx::query("DELETE FROM likes WHERE user_id = $1 AND post_id = $2")
        .bind(user_id)
        .bind(post_id)
        .execute(pool)
        .await
        .map_err(db_error)?
        .rows_affected();

    if removed > 0 {
        return Ok(LikeResponse { liked: false });
    }

    // A concurrent toggle by the same user can win the race; that surfaces as a conflict.
    sqlx::query("INSERT INTO likes (user_id, post_id) VALUES ($1, $2)")
        .bind(user_id)
        .bind(post_id)
        .execute(pool)
        .await
        .map_err(|e| conflict_or_db_error(e, "Like already recorded"))?;

    notifications::emit(pool, NotificationEvent::like(post.author_id, user_id, post_id)).await;

    Ok(LikeResponse { liked: true })
}

/// `None` when the id does not resolve; anonymous readers get the same answer.
pub async fn get_one(
    pool: &PgPool,
    post_id: Uuid,
    viewer: Option<Uuid>,
) -> Result<Option<PostDetailResponse>, AppError> {
    let Some(post) = fetch_annotated(pool, post_id, viewer).await? else {
        return Ok(None);
    };

    let replies = feed::replies(pool, post_id, viewer).await?;

    Ok(Some(PostDetailResponse { post, replies }))
}

/// Replaces the text. Image and parent never change after creation.
pub async fn update(
    pool: &PgPool,
    post_id: Uuid,
    requester_id: Uuid,
    content: &str,
) -> Result<PostResponse, AppError> {
    let post = find_owned_post(pool, post_id, requester_id).await?;

    let content = content.trim();
    if content.is_empty() && post.image.is_none() {
        return Err(AppError::UnprocessableEntity(
            "Post must have content or an image".to_string(),
        ));
    }

    sqlx::query("UPDATE posts SET content = $1, updated_at = NOW() WHERE id = $2")
        .bind(content)
        .bind(post_id)
        .execute(pool)
        .await
        .map_err(db_error)?;

    fetch_annotated(pool, post_id, Some(requester_id))
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))
}

/// Replies to the removed post keep their `parent_id`.
pub async fn remove(pool: &PgPool, post_id: Uuid, requester_id: Uuid) -> Result<Post, AppError> {
    find_owned_post(pool, post_id, requester_id).await?;

    let deleted = sqlx::query_as::<_, Post>("DELETE FROM posts WHERE id = $1 RETURNING *")
        .bind(post_id)
        .fetch_optional(pool)
        .await
        .map_err(db_error)?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    tracing::info!(post_id = %deleted.id, "post deleted");
    Ok(deleted)
}
