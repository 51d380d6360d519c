//! # Luv Auth
//!
//! JWT claims and token utilities for the Luv API.
//!
//! - [`claims`]: claim structures for access, refresh and OAuth state tokens
//! - [`jwt`]: token creation and verification
//!
//! # Token Types
//!
//! - **Access Token** ([`Claims`]): short-lived, signed with `JWT_SECRET`
//! - **Refresh Token** ([`RefreshTokenClaims`]): long-lived, signed with `JWT_REFRESH_SECRET`
//! - **OAuth State** ([`OAuthStateClaims`]): ten-minute token binding a Google
//!   authorization round-trip to the browser that started it
//!
//! # Example
//!
//! ```ignore
//! use luv_auth::{create_token_pair, verify_access_token};
//! use luv_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let pair = create_token_pair(user_id, "alice@example.com", "viewer", &config)?;
//! let claims = verify_access_token(&pair.access_token, &config)?;
//! assert_eq!(claims.role, "viewer");
//! ```

pub mod claims;
pub mod jwt;

// Re-export commonly used types at crate root
pub use claims::{Claims, OAuthStateClaims, RefreshTokenClaims, TokenPair, TokenType};
pub use jwt::{
    OAUTH_STATE_TTL_SECONDS, create_access_token, create_oauth_state_token,
    create_refresh_token, create_token_pair, verify_access_token, verify_oauth_state_token,
    verify_refresh_token,
};
