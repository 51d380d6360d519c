//! JWT creation and verification.
//!
//! Access tokens are signed with [`JwtConfig::secret`] and refresh tokens with
//! [`JwtConfig::refresh_secret`]. Each token also carries a `typ` claim that
//! verification checks, so a refresh token presented where an access token is
//! expected is rejected even if both secrets were configured identically.
//!
//! All tokens use HS256. Verification checks the signature and `exp`;
//! every failure maps to `401 Unauthorized`.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use luv_config::JwtConfig;
use luv_core::AppError;

use crate::claims::{Claims, OAuthStateClaims, RefreshTokenClaims, TokenPair, TokenType};

/// Lifetime of the OAuth `state` token.
pub const OAUTH_STATE_TTL_SECONDS: i64 = 600;

fn timestamps(ttl_seconds: i64) -> (usize, usize) {
    let now = Utc::now().timestamp();
    let exp = (now + ttl_seconds).max(0);
    (now as usize, exp as usize)
}

/// Creates a short-lived access token.
///
/// # Errors
///
/// Returns an internal error if encoding fails.
///
/// # Example
///
/// ```ignore
/// let token = create_access_token(user.id, &user.email, user.role.as_str(), &jwt_config)?;
/// ```
pub fn create_access_token(
    user_id: Uuid,
    email: &str,
    role: &str,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let (iat, exp) = timestamps(jwt_config.access_token_expiry);

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        role: role.to_string(),
        exp,
        iat,
        typ: TokenType::Access,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal_error(format!("Failed to create token: {}", e)))
}

/// Verifies an access token and returns its claims.
///
/// # Errors
///
/// Returns `401 "Invalid or expired token"` when the signature does not match
/// the access secret, the token is malformed or expired, or it is not an
/// access token.
pub fn verify_access_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .ok()
    .map(|data| data.claims)
    .filter(|claims| claims.typ == TokenType::Access)
    .ok_or_else(|| AppError::unauthorized("Invalid or expired token"))
}

/// Creates a long-lived refresh token signed with the refresh secret.
///
/// Each token carries a random `jti`, so rotating on every refresh always
/// yields a different token.
///
/// # Errors
///
/// Returns an internal error if encoding fails.
pub fn create_refresh_token(
    user_id: Uuid,
    email: &str,
    role: &str,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let (iat, exp) = timestamps(jwt_config.refresh_token_expiry);

    let claims = RefreshTokenClaims {
        sub: user_id.to_string(),
        email: email.to_string(),
        role: role.to_string(),
        exp,
        iat,
        jti: Uuid::new_v4().to_string(),
        typ: TokenType::Refresh,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.refresh_secret.as_bytes()),
    )
    .map_err(|e| AppError::internal_error(format!("Failed to create refresh token: {}", e)))
}

/// Verifies a refresh token against the refresh secret.
///
/// # Errors
///
/// Returns `401 "Invalid refresh token"` on any failure.
pub fn verify_refresh_token(
    token: &str,
    jwt_config: &JwtConfig,
) -> Result<RefreshTokenClaims, AppError> {
    decode::<RefreshTokenClaims>(
        token,
        &DecodingKey::from_secret(jwt_config.refresh_secret.as_bytes()),
        &Validation::default(),
    )
    .ok()
    .map(|data| data.claims)
    .filter(|claims| claims.typ == TokenType::Refresh)
    .ok_or_else(|| AppError::unauthorized("Invalid refresh token"))
}

/// Issues an access token and a refresh token for the same identity.
pub fn create_token_pair(
    user_id: Uuid,
    email: &str,
    role: &str,
    jwt_config: &JwtConfig,
) -> Result<TokenPair, AppError> {
    Ok(TokenPair {
        access_token: create_access_token(user_id, email, role, jwt_config)?,
        refresh_token: create_refresh_token(user_id, email, role, jwt_config)?,
    })
}

/// Signs the `state` parameter for a Google authorization request.
pub fn create_oauth_state_token(nonce: &str, jwt_config: &JwtConfig) -> Result<String, AppError> {
    let (iat, exp) = timestamps(OAUTH_STATE_TTL_SECONDS);

    let claims = OAuthStateClaims {
        nonce: nonce.to_string(),
        exp,
        iat,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal_error(format!("Failed to create state token: {}", e)))
}

/// Verifies a `state` value returned by Google and yields its nonce.
///
/// # Errors
///
/// Returns `401 "Invalid OAuth state"` when the state was not issued by this
/// server or is older than [`OAUTH_STATE_TTL_SECONDS`].
pub fn verify_oauth_state_token(
    token: &str,
    jwt_config: &JwtConfig,
) -> Result<OAuthStateClaims, AppError> {
    decode::<OAuthStateClaims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized("Invalid OAuth state"))
}
