//! Follow relationships between users and streamer profiles.

use chrono::{DateTime, Utc};
use luv_core::PaginationMeta;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// One follower of a streamer, joined with the follower's public identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct FollowerEntry {
    pub follower_id: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub followed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaginatedFollowersResponse {
    pub data: Vec<FollowerEntry>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FollowResponse {
    pub streamer_id: Uuid,
    pub following: bool,
    pub total_followers: i64,
}
