//! Streamer profiles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Public persona of a user who streams. At most one per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StreamerProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub stage_name: String,
    pub bio: Option<String>,
    pub is_verified: bool,
    pub total_followers: i64,
    pub total_views: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateStreamerProfileDto {
    #[validate(length(
        min = 2,
        max = 50,
        message = "Stage name must be between 2 and 50 characters"
    ))]
    pub stage_name: String,
    #[validate(length(max = 500, message = "Bio must not exceed 500 characters"))]
    pub bio: Option<String>,
    /// Owner of the new profile. Only admins may create a profile for someone else.
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateStreamerProfileDto {
    #[validate(length(
        min = 2,
        max = 50,
        message = "Stage name must be between 2 and 50 characters"
    ))]
    pub stage_name: Option<String>,
    #[validate(length(max = 500, message = "Bio must not exceed 500 characters"))]
    pub bio: Option<String>,
    /// Admin only
    pub is_verified: Option<bool>,
}
