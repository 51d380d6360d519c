//! JWT claim structures.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Discriminates access tokens from refresh tokens independently of the key
/// that signed them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Claims carried by access tokens.
///
/// The role is embedded so coarse authorization can happen without a
/// database lookup; handlers that need the live row use `CurrentUser`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// User ID (subject claim)
    pub sub: String,
    pub email: String,
    /// `admin`, `streamer` or `viewer`
    pub role: String,
    /// Expiration (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
    /// Always [`TokenType::Access`]
    pub typ: TokenType,
}

/// Claims carried by refresh tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenClaims {
    pub sub: String,
    pub email: String,
    pub role: String,
    pub exp: usize,
    pub iat: usize,
    /// Random token id, so two refresh tokens minted in the same second differ.
    pub jti: String,
    /// Always [`TokenType::Refresh`]
    pub typ: TokenType,
}

/// Claims of the signed `state` parameter sent to Google.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthStateClaims {
    /// Random value mirrored in the `oauthState` cookie.
    pub nonce: String,
    pub exp: usize,
    pub iat: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_serialize() {
        let claims = Claims {
            sub: "user-id-123".to_string(),
            email: "test@example.com".to_string(),
            role: "streamer".to_string(),
            exp: 1234567890,
            iat: 1234567800,
            typ: TokenType::Access,
        };
        let serialized = serde_json::to_string(&claims).unwrap();
        assert!(serialized.contains(r#""sub":"user-id-123""#));
        assert!(serialized.contains(r#""role":"streamer""#));
        assert!(serialized.contains(r#""typ":"access""#));
    }

    #[test]
    fn test_claims_deserialize() {
        let json = r#"{"sub":"user-id-456","email":"user@test.com","role":"viewer","exp":9999999999,"iat":9999999900,"typ":"access"}"#;
        let claims: Claims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.sub, "user-id-456");
        assert_eq!(claims.role, "viewer");
        assert_eq!(claims.exp, 9999999999);
    }

    #[test]
    fn test_refresh_claims_require_jti() {
        let json = r#"{"sub":"u","email":"e@x.com","role":"viewer","exp":2,"iat":1,"typ":"refresh"}"#;
        assert!(serde_json::from_str::<RefreshTokenClaims>(json).is_err());
    }

    #[test]
    fn test_claims_require_token_type() {
        let json = r#"{"sub":"u","email":"e@x.com","role":"viewer","exp":2,"iat":1}"#;
        assert!(serde_json::from_str::<Claims>(json).is_err());
    }

    #[test]
    fn test_state_claims_roundtrip_nonce() {
        let claims = OAuthStateClaims {
            nonce: "abc".to_string(),
            exp: 2,
            iat: 1,
        };
        let json = serde_json::to_string(&claims).unwrap();
        let back: OAuthStateClaims = serde_json::from_str(&json).unwrap();
        assert_eq!(back.nonce, "abc");
    }
}
