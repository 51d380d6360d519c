//! Authentication payloads.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::users::User;
use crate::validation::{DISPLAY_NAME_MAX_LENGTH, validate_strong_password, validate_username};

pub use luv_auth::{Claims, RefreshTokenClaims, TokenPair};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(custom(function = "validate_username"))]
    #[schema(example = "night_owl")]
    pub username: String,
    #[validate(
        email(message = "Please provide a valid email address"),
        length(max = 255, message = "Email must not exceed 255 characters")
    )]
    pub email: String,
    #[validate(custom(function = "validate_strong_password"))]
    #[schema(example = "Sup3r$ecret")]
    pub password: String,
    #[validate(length(
        min = 2,
        max = 100,
        message = "Display name must be between 2 and 100 characters"
    ))]
    pub display_name: Option<String>,
    #[validate(url(message = "Please provide a valid avatar URL"))]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(
        email(message = "Please provide a valid email address"),
        length(max = 255, message = "Email must not exceed 255 characters")
    )]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Body of `POST /api/auth/refresh`. The token may instead come from the
/// `refreshToken` cookie.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RefreshTokenRequest {
    #[serde(alias = "refreshToken")]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}

impl AuthResponse {
    pub fn new(tokens: TokenPair, user: User) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            user,
        }
    }

    pub fn tokens(&self) -> TokenPair {
        TokenPair {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Identity returned by Google's userinfo endpoint.
///
/// Field names follow the OpenID Connect standard claims, with `sub` exposed
/// as `google_id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct GoogleProfile {
    #[serde(rename = "sub")]
    pub google_id: String,
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    pub name: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub picture: Option<String>,
    pub locale: Option<String>,
    /// Hosted domain for Google Workspace accounts
    pub hd: Option<String>,
}

impl GoogleProfile {
    /// The email, provided Google vouches for it.
    pub fn verified_email(&self) -> Option<&str> {
        self.email
            .as_deref()
            .filter(|email| self.email_verified && !email.trim().is_empty())
    }

    pub fn display_name(&self) -> Option<String> {
        self.name
            .clone()
            .or_else(|| {
                match (self.given_name.as_deref(), self.family_name.as_deref()) {
                    (Some(given), Some(family)) => Some(format!("{} {}", given, family)),
                    (Some(given), None) => Some(given.to_string()),
                    _ => None,
                }
            })
            .map(|name| name.chars().take(DISPLAY_NAME_MAX_LENGTH).collect())
    }
}

/// Query string Google appends to the callback URL.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct GoogleCallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}
