use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::auth::{User, UserResponse};

pub mod handler;
pub mod service;

/// The slice of a user embedded in posts, notifications and messages.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub avatar: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
pub struct ProfileRow {
    #[sqlx(flatten)]
    pub user: User,
    pub followers_count: i64,
    pub following_count: i64,
    pub posts_count: i64,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub followers_count: i64,
    pub following_count: i64,
    pub posts_count: i64,
    /// Only present when the request carried a valid session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_following: Option<bool>,
}

impl From<ProfileRow> for ProfileResponse {
    fn from(row: ProfileRow) -> Self {
        ProfileResponse {
            user: UserResponse::from(row.user),
            followers_count: row.followers_count,
            following_count: row.following_count,
            posts_count: row.posts_count,
            is_following: None,
        }
    }
}

/// Absent fields are left untouched.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProfile {
    #[validate(length(min = 1, max = 50, message = "Name must be between 1 and 50 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 160, message = "Bio must be at most 160 characters"))]
    pub bio: Option<String>,
    #[validate(length(max = 30, message = "Location must be at most 30 characters"))]
    pub location: Option<String>,
    #[validate(length(max = 100, message = "Website must be at most 100 characters"))]
    pub website: Option<String>,
    pub avatar: Option<String>,
    pub cover_image: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_update_validates_only_present_fields() {
        assert!(UpdateProfile::default().validate().is_ok());

        let long_bio = UpdateProfile {
            bio: Some("x".repeat(161)),
            ..Default::default()
        };
        assert!(long_bio.validate().is_err());

        let empty_name = UpdateProfile {
            name: Some(String::new()),
            ..Default::default()
        };
        assert!(empty_name.validate().is_err());
    }
}
