//! Rows generated by the seeder and the knobs that size them.

use chrono::{DateTime, Utc};
use luv_models::streams::{StreamPrivacy, StreamStatus};
use luv_models::users::UserRole;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct UserSeed {
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: UserRole,
}

#[derive(Debug, Clone)]
pub struct StreamerSeed {
    pub user_id: Uuid,
    pub stage_name: String,
    pub bio: String,
}

#[derive(Debug, Clone)]
pub struct StreamSeed {
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub status: StreamStatus,
    pub privacy: StreamPrivacy,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

/// How much data `seed_all` creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedConfig {
    pub viewers: usize,
    pub streamers: usize,
    pub streams_per_streamer: usize,
    /// Each viewer follows up to this many streamers.
    pub follows_per_viewer: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            viewers: 50,
            streamers: 10,
            streams_per_streamer: 3,
            follows_per_viewer: 5,
        }
    }
}

impl SeedConfig {
    pub fn total_users(&self) -> usize {
        self.viewers + self.streamers
    }

    pub fn total_streams(&self) -> usize {
        self.streamers * self.streams_per_streamer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals() {
        let config = SeedConfig {
            viewers: 20,
            streamers: 4,
            streams_per_streamer: 2,
            follows_per_viewer: 3,
        };
        assert_eq!(config.total_users(), 24);
        assert_eq!(config.total_streams(), 8);
    }
}
