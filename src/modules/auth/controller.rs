use axum::Json;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use chrono::Utc;
use luv_auth::{create_oauth_state_token, verify_oauth_state_token};
use luv_core::AppError;
use luv_models::auth::{
    AuthResponse, GoogleCallbackParams, LoginRequest, MessageResponse, RefreshTokenRequest,
    RegisterRequest,
};
use luv_models::users::User;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::middleware::auth::{AuthUser, CurrentUser};
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::cookies::{
    OAUTH_STATE_COOKIE, REFRESH_TOKEN_COOKIE, clear_auth_cookies, clear_oauth_state_cookie,
    set_auth_cookies, set_oauth_state_cookie,
};
use super::service::AuthService;

#[derive(ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created and signed in", body = AuthResponse),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 409, description = "Username or email already exists", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, jar, dto))]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(dto): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>), AppError> {
    let response = AuthService::register(&state.db, dto, &state.jwt_config).await?;
    let jar = set_auth_cookies(
        jar,
        &response.tokens(),
        &state.jwt_config,
        &state.app_config,
    );

    Ok((StatusCode::CREATED, jar, Json(response)))
}

/// Sign in with email and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 401, description = "Invalid credentials or inactive account", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, jar, dto))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    let response = AuthService::login(&state.db, dto, &state.jwt_config).await?;
    let jar = set_auth_cookies(
        jar,
        &response.tokens(),
        &state.jwt_config,
        &state.app_config,
    );

    Ok((jar, Json(response)))
}

/// Rotate the token pair
///
/// The refresh token is read from the JSON body or, when absent, from the
/// `refreshToken` cookie.
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    request_body(content = RefreshTokenRequest, description = "Optional when the refreshToken cookie is sent"),
    responses(
        (status = 200, description = "New access and refresh tokens", body = AuthResponse),
        (status = 400, description = "Refresh token is required", body = ErrorResponse),
        (status = 401, description = "Invalid refresh token or inactive account", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, jar, body))]
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Bytes,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        RefreshTokenRequest::default()
    } else {
        serde_json::from_slice::<RefreshTokenRequest>(&body)
            .map_err(|_| AppError::bad_request(anyhow::anyhow!("Invalid request body")))?
    };

    let token = request
        .refresh_token
        .filter(|token| !token.trim().is_empty())
        .or_else(|| {
            jar.get(REFRESH_TOKEN_COOKIE)
                .map(|cookie| cookie.value().to_string())
                .filter(|token| !token.is_empty())
        })
        .ok_or_else(|| AppError::bad_request(anyhow::anyhow!("Refresh token is required")))?;

    let response = AuthService::refresh(&state.db, &token, &state.jwt_config).await?;
    let jar = set_auth_cookies(
        jar,
        &response.tokens(),
        &state.jwt_config,
        &state.app_config,
    );

    Ok((jar, Json(response)))
}

/// Sign out
///
/// Tokens are stateless; this clears the auth cookies.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Signed out", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Authentication",
    security(("bearer_auth" = []))
)]
#[instrument(skip(jar))]
pub async fn logout(
    auth_user: AuthUser,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageResponse>), AppError> {
    info!(user.id = %auth_user.0.sub, "User logged out");
    Ok((
        clear_auth_cookies(jar),
        Json(MessageResponse::ok("Logged out successfully")),
    ))
}

/// Current user profile
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Authenticated user", body = User),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Authentication",
    security(("bearer_auth" = []))
)]
pub async fn me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

fn frontend_callback_url(frontend_url: &str, params: &[(&str, &str)]) -> Result<String, AppError> {
    let url = reqwest::Url::parse_with_params(&format!("{}/auth/callback", frontend_url), params)
        .map_err(AppError::internal)?;
    Ok(url.into())
}

/// Start Google sign-in
#[utoipa::path(
    get,
    path = "/api/auth/google",
    responses(
        (status = 302, description = "Redirect to Google's consent screen"),
        (status = 503, description = "Google sign-in is not configured", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, jar))]
pub async fn google_auth(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Response), AppError> {
    let nonce = Uuid::new_v4().to_string();
    let oauth_state = create_oauth_state_token(&nonce, &state.jwt_config)?;
    let url = state.google_client.authorization_url(&oauth_state)?;

    let jar = set_oauth_state_cookie(jar, nonce, &state.app_config);
    Ok((jar, found(&url)))
}

/// Google OAuth callback
///
/// Always redirects to `{FRONTEND_URL}/auth/callback`; the outcome travels in
/// the query string.
#[utoipa::path(
    get,
    path = "/api/auth/google/callback",
    params(
        ("code" = Option<String>, Query, description = "Authorization code"),
        ("state" = Option<String>, Query, description = "State issued by /api/auth/google"),
        ("error" = Option<String>, Query, description = "Error reported by Google")
    ),
    responses(
        (status = 302, description = "Redirect to the web client with tokens or an error")
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, jar, params))]
pub async fn google_callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<GoogleCallbackParams>,
) -> Response {
    let timestamp = Utc::now().timestamp_millis().to_string();
    let frontend_url = state.app_config.frontend_url.clone();

    let outcome = complete_google_callback(&state, &jar, params).await;
    let jar = clear_oauth_state_cookie(jar);

    let redirect = match outcome {
        Ok(response) => {
            let tokens = response.tokens();
            let jar = set_auth_cookies(jar, &tokens, &state.jwt_config, &state.app_config);
            frontend_callback_url(
                &frontend_url,
                &[
                    ("accessToken", tokens.access_token.as_str()),
                    ("refreshToken", tokens.refresh_token.as_str()),
                    ("success", "true"),
                    ("timestamp", timestamp.as_str()),
                ],
            )
            .map(|url| (jar, found(&url)).into_response())
        }
        Err(err) => {
            error!(error = %err, "Google sign-in failed");
            let message = err.public_message();
            frontend_callback_url(
                &frontend_url,
                &[
                    ("error", message.as_str()),
                    ("success", "false"),
                    ("timestamp", timestamp.as_str()),
                ],
            )
            .map(|url| (jar, found(&url)).into_response())
        }
    };

    redirect.unwrap_or_else(IntoResponse::into_response)
}

async fn complete_google_callback(
    state: &AppState,
    jar: &CookieJar,
    params: GoogleCallbackParams,
) -> Result<AuthResponse, AppError> {
    if let Some(error) = params.error {
        return Err(AppError::unauthorized(format!(
            "Google sign-in was cancelled: {}",
            error
        )));
    }

    let code = params
        .code
        .filter(|code| !code.is_empty())
        .ok_or_else(|| AppError::bad_request(anyhow::anyhow!("Missing authorization code")))?;
    let oauth_state = params
        .state
        .ok_or_else(|| AppError::unauthorized("Invalid OAuth state"))?;

    let claims = verify_oauth_state_token(&oauth_state, &state.jwt_config)?;
    let cookie_nonce = jar.get(OAUTH_STATE_COOKIE).map(|cookie| cookie.value());
    if cookie_nonce != Some(claims.nonce.as_str()) {
        return Err(AppError::unauthorized("Invalid OAuth state"));
    }

    let profile = state.google_client.fetch_profile(&code).await?;
    AuthService::google_login(&state.db, profile, &state.jwt_config).await
}
