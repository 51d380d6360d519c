use std::sync::Arc;

use luv_config::{AppConfig, CorsConfig, GoogleOAuthConfig, JwtConfig, RateLimitConfig};
use luv_db::{PgPool, init_db_pool};

use crate::modules::auth::google::{GoogleOAuthClient, HttpGoogleOAuthClient};

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub rate_limit_config: RateLimitConfig,
    pub app_config: AppConfig,
    pub google_client: Arc<dyn GoogleOAuthClient>,
}

/// Builds the state from environment variables and connects to the database.
pub async fn init_app_state() -> anyhow::Result<AppState> {
    let jwt_config = JwtConfig::from_env();
    if !jwt_config.uses_distinct_secrets() {
        anyhow::bail!("JWT_SECRET and JWT_REFRESH_SECRET must differ");
    }

    let google_config = GoogleOAuthConfig::from_env();
    if !google_config.is_configured() {
        tracing::warn!("GOOGLE_CLIENT_ID/GOOGLE_CLIENT_SECRET not set, Google sign-in disabled");
    }
    let google_client = Arc::new(HttpGoogleOAuthClient::new(google_config)?);

    Ok(AppState {
        db: init_db_pool().await?,
        jwt_config,
        cors_config: CorsConfig::from_env(),
        rate_limit_config: RateLimitConfig::from_env(),
        app_config: AppConfig::from_env(),
        google_client,
    })
}
