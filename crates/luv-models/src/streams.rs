//! Streams and their lifecycle.
//!
//! A stream moves `scheduled → live → ended`, or is created directly as
//! `live`. Only the start/end operations change the status of an existing
//! stream; updates cannot.

use std::fmt;

use chrono::{DateTime, Utc};
use luv_core::serde::deserialize_optional_uuid;
use luv_core::{PaginationMeta, PaginationParams, SortOrder};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "stream_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StreamStatus {
    Scheduled,
    #[default]
    Live,
    Ended,
}

impl StreamStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamStatus::Scheduled => "scheduled",
            StreamStatus::Live => "live",
            StreamStatus::Ended => "ended",
        }
    }
}

impl fmt::Display for StreamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "stream_privacy", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StreamPrivacy {
    #[default]
    Public,
    Private,
}

impl StreamPrivacy {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamPrivacy::Public => "public",
            StreamPrivacy::Private => "private",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Stream {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub status: StreamStatus,
    pub privacy: StreamPrivacy,
    pub thumbnail_url: Option<String>,
    pub media_url: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Stream {
    pub fn is_public(&self) -> bool {
        self.privacy == StreamPrivacy::Public
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateStreamDto {
    #[validate(length(
        min = 3,
        max = 200,
        message = "Stream title must be between 3 and 200 characters"
    ))]
    pub title: String,
    #[validate(length(max = 1000, message = "Description must not exceed 1000 characters"))]
    pub description: Option<String>,
    #[validate(length(max = 50, message = "Category must not exceed 50 characters"))]
    pub category: Option<String>,
    /// `live` (default) or `scheduled`. Streams cannot be created as `ended`.
    pub status: Option<StreamStatus>,
    pub privacy: Option<StreamPrivacy>,
    #[validate(url(message = "Please provide a valid thumbnail URL"))]
    pub thumbnail_url: Option<String>,
    #[validate(url(message = "Please provide a valid media URL"))]
    pub media_url: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateStreamDto {
    #[validate(length(
        min = 3,
        max = 200,
        message = "Stream title must be between 3 and 200 characters"
    ))]
    pub title: Option<String>,
    #[validate(length(max = 1000, message = "Description must not exceed 1000 characters"))]
    pub description: Option<String>,
    #[validate(length(max = 50, message = "Category must not exceed 50 characters"))]
    pub category: Option<String>,
    pub privacy: Option<StreamPrivacy>,
    #[validate(url(message = "Please provide a valid thumbnail URL"))]
    pub thumbnail_url: Option<String>,
    #[validate(url(message = "Please provide a valid media URL"))]
    pub media_url: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StreamSortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Title,
}

impl StreamSortField {
    pub fn as_column(&self) -> &'static str {
        match self {
            StreamSortField::CreatedAt => "created_at",
            StreamSortField::UpdatedAt => "updated_at",
            StreamSortField::Title => "title",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct StreamFilterParams {
    /// Case-insensitive match on title, description or category
    pub search: Option<String>,
    pub status: Option<StreamStatus>,
    pub privacy: Option<StreamPrivacy>,
    /// Case-insensitive substring match
    pub category: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub user_id: Option<Uuid>,
    pub sort_by: Option<StreamSortField>,
    pub sort_order: Option<SortOrder>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaginatedStreamsResponse {
    pub data: Vec<Stream>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StreamStats {
    pub total: i64,
    pub scheduled: i64,
    pub live: i64,
    pub ended: i64,
    pub public: i64,
    pub private: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(StreamStatus::default(), StreamStatus::Live);
        assert_eq!(StreamPrivacy::default(), StreamPrivacy::Public);
    }

    #[test]
    fn test_create_dto_validation() {
        let dto = CreateStreamDto {
            title: "Hi".into(),
            description: None,
            category: None,
            status: None,
            privacy: None,
            thumbnail_url: Some("not a url".into()),
            media_url: None,
            scheduled_at: None,
        };
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("title"));
        assert!(errors.field_errors().contains_key("thumbnail_url"));
    }

    #[test]
    fn test_filter_params_parse() {
        let id = Uuid::new_v4();
        let json = format!(
            r#"{{"status":"scheduled","privacy":"private","user_id":"{}","sort_by":"title"}}"#,
            id
        );
        let params: StreamFilterParams = serde_json::from_str(&json).unwrap();
        assert_eq!(params.status, Some(StreamStatus::Scheduled));
        assert_eq!(params.privacy, Some(StreamPrivacy::Private));
        assert_eq!(params.user_id, Some(id));
        assert_eq!(params.sort_by, Some(StreamSortField::Title));
    }
}
