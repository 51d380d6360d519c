//! Request authentication extractors.
//!
//! The access token is read from `Authorization: Bearer <token>` or, when the
//! header is absent, from the `accessToken` cookie.
//!
//! | Extractor | Yields | Rejects |
//! |---|---|---|
//! | [`AuthUser`] | verified claims | 401 on missing/invalid token |
//! | [`CurrentUser`] | claims + fresh user row | 401 when the user is gone or inactive |
//! | [`MaybeCurrentUser`] | `Option<User>` | 401 only for a present but invalid token |

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use axum_extra::extract::CookieJar;
use luv_auth::{Claims, verify_access_token};
use luv_core::AppError;
use luv_models::users::{USER_COLUMNS, User};
use sqlx::PgPool;
use uuid::Uuid;

use crate::modules::auth::cookies::ACCESS_TOKEN_COOKIE;
use crate::state::AppState;

pub const INACTIVE_ACCOUNT: &str = "This account is inactive";

/// Pulls the raw access token out of the request, if any.
///
/// A malformed `Authorization` header is an error rather than "no token".
pub fn extract_token(headers: &HeaderMap) -> Result<Option<String>, AppError> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        let value = value
            .to_str()
            .map_err(|_| AppError::unauthorized("Invalid authorization header format"))?;
        let token = value
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("Invalid authorization header format"))?;
        return Ok(Some(token.trim().to_string()));
    }

    let jar = CookieJar::from_headers(headers);
    Ok(jar
        .get(ACCESS_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty()))
}

/// Verified access-token claims. No database access.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.0.sub)
            .map_err(|_| AppError::unauthorized("Invalid user ID in token"))
    }

    pub fn email(&self) -> &str {
        &self.0.email
    }

    pub fn role(&self) -> &str {
        &self.0.role
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(&parts.headers)?
            .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;

        let claims = verify_access_token(&token, &state.jwt_config)?;

        Ok(AuthUser(claims))
    }
}

/// Loads the user behind a token and checks it may still act.
pub async fn load_active_user(db: &PgPool, user_id: Uuid) -> Result<User, AppError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE id = $1",
        USER_COLUMNS
    ))
    .bind(user_id)
    .fetch_optional(db)
    .await?;

    match user {
        Some(user) if user.is_active => Ok(user),
        _ => Err(AppError::unauthorized(INACTIVE_ACCOUNT)),
    }
}

/// The authenticated user, re-read from the database on every request so
/// deactivation and role changes take effect before the token expires.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let auth_user = AuthUser::from_request_parts(parts, state).await?;
        let user = load_active_user(&state.db, auth_user.user_id()?).await?;

        parts.extensions.insert(CurrentUser(user.clone()));
        Ok(CurrentUser(user))
    }
}

/// Optional authentication for public endpoints whose answer depends on who
/// is asking.
#[derive(Debug, Clone)]
pub struct MaybeCurrentUser(pub Option<User>);

impl MaybeCurrentUser {
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }
}

impl FromRequestParts<AppState> for MaybeCurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if extract_token(&parts.headers)?.is_none() {
            return Ok(MaybeCurrentUser(None));
        }

        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        Ok(MaybeCurrentUser(Some(user)))
    }
}
