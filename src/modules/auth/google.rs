//! Google OAuth 2.0 authorization-code flow.
//!
//! [`GoogleOAuthClient`] is the seam between the auth service and Google:
//! production uses [`HttpGoogleOAuthClient`], tests plug in a fake through
//! `AppState::google_client`.

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use luv_config::GoogleOAuthConfig;
use luv_core::AppError;
use luv_models::auth::GoogleProfile;
use serde::Deserialize;
use tracing::{debug, error, instrument};

const SCOPES: &str = "openid email profile";
const MAX_USERNAME_LENGTH: usize = 30;

#[async_trait]
pub trait GoogleOAuthClient: Send + Sync + Debug {
    /// URL of Google's consent screen carrying `state`.
    fn authorization_url(&self, state: &str) -> Result<String, AppError>;

    /// Exchanges an authorization code for the user's Google profile.
    async fn fetch_profile(&self, code: &str) -> Result<GoogleProfile, AppError>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Clone)]
pub struct HttpGoogleOAuthClient {
    config: GoogleOAuthConfig,
    client: reqwest::Client,
}

impl HttpGoogleOAuthClient {
    pub fn new(config: GoogleOAuthConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self { config, client })
    }

    fn ensure_configured(&self) -> Result<(), AppError> {
        if self.config.is_configured() {
            Ok(())
        } else {
            Err(AppError::service_unavailable(
                "Google sign-in is not configured",
            ))
        }
    }

    async fn exchange_code(&self, code: &str) -> Result<String, AppError> {
        let response = self
            .client
            .post(&self.config.token_url)
            .form(&[
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", self.config.callback_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(AppError::internal)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(%status, body = %body, "Google token exchange failed");
            return Err(AppError::unauthorized(
                "Failed to exchange authorization code",
            ));
        }

        let token = response
            .json::<TokenResponse>()
            .await
            .map_err(AppError::internal)?;

        Ok(token.access_token)
    }
}

#[async_trait]
impl GoogleOAuthClient for HttpGoogleOAuthClient {
    fn authorization_url(&self, state: &str) -> Result<String, AppError> {
        self.ensure_configured()?;

        let url = reqwest::Url::parse_with_params(
            &self.config.auth_url,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.callback_url.as_str()),
                ("response_type", "code"),
                ("scope", SCOPES),
                ("state", state),
            ],
        )
        .map_err(AppError::internal)?;

        Ok(url.into())
    }

    #[instrument(skip(self, code))]
    async fn fetch_profile(&self, code: &str) -> Result<GoogleProfile, AppError> {
        self.ensure_configured()?;

        let access_token = self.exchange_code(code).await?;

        let response = self
            .client
            .get(&self.config.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(AppError::internal)?;

        if !response.status().is_success() {
            let status = response.status();
            error!(%status, "Google userinfo request failed");
            return Err(AppError::unauthorized("Failed to fetch Google profile"));
        }

        let profile = response
            .json::<GoogleProfile>()
            .await
            .map_err(AppError::internal)?;

        debug!(google.id = %profile.google_id, "Fetched Google profile");
        Ok(profile)
    }
}

/// Base username for a new Google account: the email local part reduced to
/// `[a-z0-9_]`, at most 30 characters, padded with `_user` when shorter than 3.
pub fn username_base_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();

    let mut base: String = local
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .map(|c| c.to_ascii_lowercase())
        .take(MAX_USERNAME_LENGTH)
        .collect();

    if base.len() < 3 {
        base.push_str("_user");
    }

    base
}

/// `base`, then `base1`, `base2`, ...
pub fn username_candidate(base: &str, attempt: u32) -> String {
    if attempt == 0 {
        base.to_string()
    } else {
        format!("{}{}", base, attempt)
    }
}
