use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::users::UserSummary;

pub mod handler;
pub mod service;

/// A two-party thread. The pair is stored ordered, so `(a, b)` and `(b, a)`
/// resolve to the same row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Conversation {
    pub id: Uuid,
    pub participant_low: Uuid,
    pub participant_high: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Orders two user ids the way the `conversations` table stores them.
pub fn ordered_pair(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateConversation {
    pub other_user_id: Uuid,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SendMessage {
    #[validate(length(min = 1, max = 1000, message = "Message must be between 1 and 1000 characters"))]
    pub content: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, sqlx::FromRow)]
pub struct ConversationRow {
    pub id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub low_id: Uuid,
    pub low_name: String,
    pub low_username: String,
    pub low_avatar: Option<String>,
    pub high_id: Uuid,
    pub high_name: String,
    pub high_username: String,
    pub high_avatar: Option<String>,
    pub last_message_id: Option<Uuid>,
    pub last_message_sender_id: Option<Uuid>,
    pub last_message_content: Option<String>,
    pub last_message_created_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Serialize)]
pub struct MessagePreview {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub id: Uuid,
    pub participants: Vec<UserSummary>,
    pub last_message: Option<MessagePreview>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<ConversationRow> for ConversationResponse {
    fn from(c: ConversationRow) -> Self {
        let last_message = match (
            c.last_message_id,
            c.last_message_sender_id,
            c.last_message_content,
            c.last_message_created_at,
        ) {
            (Some(id), Some(sender_id), Some(content), Some(created_at)) => Some(MessagePreview {
                id,
                sender_id,
                content,
                created_at,
            }),
            _ => None,
        };

        ConversationResponse {
            id: c.id,
            participants: vec![
                UserSummary {
                    id: c.low_id,
                    name: c.low_name,
                    username: c.low_username,
                    avatar: c.low_avatar,
                },
                UserSummary {
                    id: c.high_id,
                    name: c.high_name,
                    username: c.high_username,
                    avatar: c.high_avatar,
                },
            ],
            last_message,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct MessageRow {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub content: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub sender_id: Uuid,
    pub sender_name: String,
    pub sender_username: String,
    pub sender_avatar: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub content: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub sender: UserSummary,
}

impl From<MessageRow> for MessageResponse {
    fn from(m: MessageRow) -> Self {
        MessageResponse {
            id: m.id,
            conversation_id: m.conversation_id,
            content: m.content,
            created_at: m.created_at,
            sender: UserSummary {
                id: m.sender_id,
                name: m.sender_name,
                username: m.sender_username,
                avatar: m.sender_avatar,
            },
        }
    }
}
