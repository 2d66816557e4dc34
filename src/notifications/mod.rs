use serde::{Deserialize, Serialize};
use sqlx::prelude::Type;
use uuid::Uuid;

use crate::users::UserSummary;

pub mod handler;
pub mod service;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "notification_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    Like,
    Reply,
    Follow,
    Retweet,
    Quote,
}

impl NotificationKind {
    /// The sentence fragment shown after the issuer's name.
    pub fn describe(self) -> &'static str {
        match self {
            NotificationKind::Like => "liked your post",
            NotificationKind::Reply => "replied to your post",
            NotificationKind::Follow => "followed you",
            NotificationKind::Retweet => "retweeted your post",
            NotificationKind::Quote => "quoted your post",
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub issuer_id: Uuid,
    pub kind: NotificationKind,
    pub post_id: Option<Uuid>,
    pub read: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Something that happened which the recipient should hear about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    pub kind: NotificationKind,
    pub recipient_id: Uuid,
    pub issuer_id: Uuid,
    pub post_id: Option<Uuid>,
}

impl NotificationEvent {
    pub fn like(post_author: Uuid, liker: Uuid, post_id: Uuid) -> Self {
        Self {
            kind: NotificationKind::Like,
            recipient_id: post_author,
            issuer_id: liker,
            post_id: Some(post_id),
        }
    }

    /// `post_id` is the new reply, not its parent.
    pub fn reply(parent_author: Uuid, replier: Uuid, post_id: Uuid) -> Self {
        Self {
            kind: NotificationKind::Reply,
            recipient_id: parent_author,
            issuer_id: replier,
            post_id: Some(post_id),
        }
    }

    pub fn follow(target: Uuid, follower: Uuid) -> Self {
        Self {
            kind: NotificationKind::Follow,
            recipient_id: target,
            issuer_id: follower,
            post_id: None,
        }
    }

    pub fn is_self_action(&self) -> bool {
        self.recipient_id == self.issuer_id
    }
}

#[derive(Debug, Serialize)]
pub struct PostPreview {
    pub id: Uuid,
    pub content: String,
}

#[derive(Debug, sqlx::FromRow)]
pub struct NotificationRow {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub read: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub issuer_id: Uuid,
    pub issuer_name: String,
    pub issuer_username: String,
    pub issuer_avatar: Option<String>,
    pub post_id: Option<Uuid>,
    pub post_content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    pub read: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub issuer: UserSummary,
    pub post: Option<PostPreview>,
}

impl From<NotificationRow> for NotificationResponse {
    fn from(n: NotificationRow) -> Self {
        let post = match (n.post_id, n.post_content) {
            (Some(id), Some(content)) => Some(PostPreview { id, content }),
            _ => None,
        };

        NotificationResponse {
            id: n.id,
            kind: n.kind,
            message: format!("{} {}", n.issuer_name, n.kind.describe()),
            read: n.read,
            created_at: n.created_at,
            issuer: UserSummary {
                id: n.issuer_id,
                name: n.issuer_name,
                username: n.issuer_username,
                avatar: n.issuer_avatar,
            },
            post,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub count: i64,
}
