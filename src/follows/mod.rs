use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod graph;
pub mod handler;

/// A directed follow edge, unique per (follower, following).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Follow {
    pub follower_id: Uuid,
    pub following_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
