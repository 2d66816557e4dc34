use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{error::AppError, users::UserSummary};

pub mod feed;
pub mod handler;
pub mod store;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub image: Option<String>,
    pub parent_id: Option<Uuid>,
    pub views: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePost {
    #[serde(default)]
    #[validate(length(max = 280, message = "Post must be at most 280 characters"))]
    pub content: String,
    /// Opaque URL handed out by the upload service.
    pub image: Option<String>,
    pub parent_id: Option<Uuid>,
}

impl CreatePost {
    /// A post needs text, an image, or both.
    pub fn check(&self) -> Result<(), AppError> {
        self.validate()
            .map_err(|e| AppError::UnprocessableEntity(e.to_string()))?;

        let has_image = self.image.as_deref().is_some_and(|s| !s.trim().is_empty());
        if self.content.trim().is_empty() && !has_image {
            return Err(AppError::UnprocessableEntity(
                "Post must have content or an image".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePost {
    #[validate(length(max = 280, message = "Post must be at most 280 characters"))]
    pub content: String,
}

/// Query string of `GET /api/posts`. Every filter is independently optional.
#[derive(Debug, Default, Deserialize)]
pub struct PostFilter {
    pub author_id: Option<Uuid>,
    pub exclude_replies: Option<bool>,
    pub only_following: Option<bool>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// A post joined with its author and counters.
#[derive(Debug, sqlx::FromRow)]
pub struct PostRow {
    pub id: Uuid,
    pub content: String,
    pub image: Option<String>,
    pub parent_id: Option<Uuid>,
    pub views: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub author_id: Uuid,
    pub author_name: String,
    pub author_username: String,
    pub author_avatar: Option<String>,
    pub like_count: i64,
    pub reply_count: i64,
    pub is_liked: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub content: String,
    pub image: Option<String>,
    pub parent_id: Option<Uuid>,
    pub author: UserSummary,
    pub like_count: i64,
    pub reply_count: i64,
    pub retweet_count: i64,
    pub quote_count: i64,
    pub views: i32,
    /// Only present when the viewer is known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_liked: Option<bool>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<PostRow> for PostResponse {
    fn from(p: PostRow) -> Self {
        PostResponse {
            id: p.id,
            content: p.content,
            image: p.image,
            parent_id: p.parent_id,
            author: UserSummary {
                id: p.author_id,
                name: p.author_name,
                username: p.author_username,
                avatar: p.author_avatar,
            },
            like_count: p.like_count,
            reply_count: p.reply_count,
            // reposts and quotes have no table yet
            retweet_count: 0,
            quote_count: 0,
            views: p.views,
            is_liked: p.is_liked,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// A post with one level of replies, oldest first.
#[derive(Debug, Serialize)]
pub struct PostDetailResponse {
    #[serde(flatten)]
    pub post: PostResponse,
    pub replies: Vec<PostResponse>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct LikeResponse {
    pub liked: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(content: &str, image: Option<&str>) -> CreatePost {
        CreatePost {
            content: content.to_string(),
            image: image.map(String::from),
            parent_id: None,
        }
    }

    #[test]
    fn post_needs_text_or_image() {
        assert!(draft("hello", None).check().is_ok());
        assert!(draft("", Some("https://cdn.example/a.png")).check().is_ok());
        assert!(matches!(
            draft("   ", None).check(),
            Err(AppError::UnprocessableEntity(_))
        ));
        assert!(draft("", Some("")).check().is_err());
    }

    #[test]
    fn post_length_is_capped() {
        assert!(draft(&"a".repeat(280), None).check().is_ok());
        assert!(draft(&"a".repeat(281), None).check().is_err());
    }

    #[test]
    fn is_liked_is_omitted_for_anonymous_viewers() {
        let row = PostRow {
            id: Uuid::new_v4(),
            content: "hello".into(),
            image: None,
            parent_id: None,
            views: 0,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
            author_id: Uuid::new_v4(),
            author_name: "Alice".into(),
            author_username: "alice".into(),
            author_avatar: None,
            like_count: 2,
            reply_count: 1,
            is_liked: None,
        };

        let json = serde_json::to_value(PostResponse::from(row)).unwrap();
        assert!(json.get("is_liked").is_none());
        assert_eq!(json["like_count"], 2);
        assert_eq!(json["author"]["username"], "alice");
    }
}
