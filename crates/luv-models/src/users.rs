//! User entity, roles and user management DTOs.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use luv_core::serde::deserialize_optional_bool;
use luv_core::{PaginationMeta, PaginationParams, SortOrder};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::validation::{validate_strong_password, validate_username};

/// Columns selected whenever a [`User`] is loaded. Excludes the password hash.
pub const USER_COLUMNS: &str = "id, username, email, google_id, avatar_url, display_name, role, is_active, last_login_at, created_at, updated_at";

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Streamer,
    #[default]
    Viewer,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Streamer => "streamer",
            UserRole::Viewer => "viewer",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "streamer" => Ok(UserRole::Streamer),
            "viewer" => Ok(UserRole::Viewer),
            other => Err(format!("Invalid role: {}", other)),
        }
    }
}

/// A user account.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// Google subject id once the account is linked to Google
    pub google_id: Option<String>,
    pub avatar_url: Option<String>,
    pub display_name: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Admins may act on any user, everyone else only on themselves.
    pub fn can_manage(&self, user_id: Uuid) -> bool {
        self.is_admin() || self.id == user_id
    }
}

/// A user row together with its password hash, for credential checks only.
#[derive(FromRow, Debug, Clone)]
pub struct UserWithPassword {
    #[sqlx(flatten)]
    pub user: User,
    pub password_hash: Option<String>,
}

/// Admin-side user creation.
///
/// Either a password or a Google id must be supplied so the account can sign
/// in somehow.
#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateUserDto {
    #[validate(custom(function = "validate_username"))]
    pub username: String,
    #[validate(
        email(message = "Please provide a valid email address"),
        length(max = 255, message = "Email must not exceed 255 characters")
    )]
    pub email: String,
    #[validate(custom(function = "validate_strong_password"))]
    pub password: Option<String>,
    #[validate(length(max = 255, message = "Google ID must not exceed 255 characters"))]
    pub google_id: Option<String>,
    #[validate(url(message = "Please provide a valid avatar URL"))]
    pub avatar_url: Option<String>,
    #[validate(length(
        min = 2,
        max = 100,
        message = "Display name must be between 2 and 100 characters"
    ))]
    pub display_name: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

/// Partial user update. `role`, `is_active` and `google_id` are honoured for
/// admins only.
#[derive(Deserialize, Debug, Clone, Default, Validate, ToSchema)]
pub struct UpdateUserDto {
    #[validate(custom(function = "validate_username"))]
    pub username: Option<String>,
    #[validate(
        email(message = "Please provide a valid email address"),
        length(max = 255, message = "Email must not exceed 255 characters")
    )]
    pub email: Option<String>,
    #[validate(url(message = "Please provide a valid avatar URL"))]
    pub avatar_url: Option<String>,
    #[validate(length(
        min = 2,
        max = 100,
        message = "Display name must be between 2 and 100 characters"
    ))]
    pub display_name: Option<String>,
    pub is_active: Option<bool>,
    pub role: Option<UserRole>,
    #[validate(length(max = 255, message = "Google ID must not exceed 255 characters"))]
    pub google_id: Option<String>,
}

impl UpdateUserDto {
    /// True when the update touches fields reserved for admins.
    pub fn touches_privileged_fields(&self) -> bool {
        self.role.is_some() || self.is_active.is_some() || self.google_id.is_some()
    }
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct ChangePasswordDto {
    #[serde(alias = "old_password")]
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(custom(function = "validate_strong_password"))]
    pub new_password: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserSortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Username,
    Email,
}

impl UserSortField {
    pub fn as_column(&self) -> &'static str {
        match self {
            UserSortField::CreatedAt => "created_at",
            UserSortField::UpdatedAt => "updated_at",
            UserSortField::Username => "username",
            UserSortField::Email => "email",
        }
    }
}

/// Query parameters for listing users. All filters combine with AND.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UserFilterParams {
    /// Case-insensitive match on username, email or display name
    pub search: Option<String>,
    pub role: Option<UserRole>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_active: Option<bool>,
    pub sort_by: Option<UserSortField>,
    pub sort_order: Option<SortOrder>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaginatedUsersResponse {
    pub data: Vec<User>,
    pub meta: PaginationMeta,
}

/// Account counters. Role counts cover active users only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserStats {
    pub total_users: i64,
    pub active_users: i64,
    pub streamers: i64,
    pub viewers: i64,
    pub admins: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeactivateUserResponse {
    /// False when the user was already inactive.
    pub deactivated: bool,
    pub user: User,
}
