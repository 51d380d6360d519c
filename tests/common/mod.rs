#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use luv::modules::auth::google::GoogleOAuthClient;
use luv::router::init_router;
use luv::state::AppState;
use luv_auth::create_access_token;
use luv_config::{AppConfig, CorsConfig, JwtConfig, RateLimitConfig};
use luv_core::{AppError, hash_password};
use luv_models::auth::GoogleProfile;
use luv_models::streams::{StreamPrivacy, StreamStatus};
use luv_models::users::UserRole;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "Password123!";

/// Google stand-in: authorization codes map to canned profiles.
#[derive(Debug, Default, Clone)]
pub struct MockGoogleClient {
    profiles: HashMap<String, GoogleProfile>,
}

impl MockGoogleClient {
    pub fn with_profile(mut self, code: &str, profile: GoogleProfile) -> Self {
        self.profiles.insert(code.to_string(), profile);
        self
    }
}

#[async_trait]
impl GoogleOAuthClient for MockGoogleClient {
    fn authorization_url(&self, state: &str) -> Result<String, AppError> {
        Ok(format!("https://accounts.google.test/o/oauth2/auth?state={}", state))
    }

    async fn fetch_profile(&self, code: &str) -> Result<GoogleProfile, AppError> {
        self.profiles
            .get(code)
            .cloned()
            .ok_or_else(|| AppError::unauthorized("Failed to exchange authorization code"))
    }
}

pub fn google_profile(google_id: &str, email: &str) -> GoogleProfile {
    GoogleProfile {
        google_id: google_id.to_string(),
        email: Some(email.to_string()),
        email_verified: true,
        name: Some("Test Person".to_string()),
        picture: Some("https://lh3.googleusercontent.com/a/test".to_string()),
        ..Default::default()
    }
}

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig::default()
}

pub fn test_state(
    pool: PgPool,
    google_client: MockGoogleClient,
    rate_limit_config: RateLimitConfig,
) -> AppState {
    AppState {
        db: pool,
        jwt_config: test_jwt_config(),
        cors_config: CorsConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
        rate_limit_config,
        app_config: AppConfig::default(),
        google_client: Arc::new(google_client),
    }
}

pub fn setup_test_app(pool: PgPool) -> Router {
    init_router(test_state(
        pool,
        MockGoogleClient::default(),
        RateLimitConfig::disabled(),
    ))
}

pub fn setup_test_app_with_google(pool: PgPool, google_client: MockGoogleClient) -> Router {
    init_router(test_state(pool, google_client, RateLimitConfig::disabled()))
}

pub fn setup_test_app_with_rate_limit(pool: PgPool, rate_limit: RateLimitConfig) -> Router {
    init_router(test_state(pool, MockGoogleClient::default(), rate_limit))
}

#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

impl TestUser {
    pub fn token(&self) -> String {
        create_access_token(self.id, &self.email, self.role.as_str(), &test_jwt_config()).unwrap()
    }
}

pub async fn create_test_user(pool: &PgPool, username: &str, role: UserRole) -> TestUser {
    let email = format!("{}@test.local", username);
    let hashed = hash_password(TEST_PASSWORD).unwrap();

    let id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO users (username, email, password_hash, display_name, role)
         VALUES ($1, $2, $3, $1, $4)
         RETURNING id",
    )
    .bind(username)
    .bind(&email)
    .bind(&hashed)
    .bind(role)
    .fetch_one(pool)
    .await
    .unwrap();

    TestUser {
        id,
        username: username.to_string(),
        email,
        password: TEST_PASSWORD.to_string(),
        role,
    }
}

pub async fn deactivate(pool: &PgPool, user_id: Uuid) {
    sqlx::query("UPDATE users SET is_active = FALSE WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn create_streamer_profile(pool: &PgPool, user_id: Uuid, stage_name: &str) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO streamer_profiles (user_id, stage_name) VALUES ($1, $2) RETURNING id",
    )
    .bind(user_id)
    .bind(stage_name)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_test_stream(
    pool: &PgPool,
    owner_id: Uuid,
    title: &str,
    status: StreamStatus,
    privacy: StreamPrivacy,
) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO streams (user_id, title, status, privacy, started_at)
         VALUES ($1, $2, $3, $4, CASE WHEN $3 = 'live'::stream_status THEN NOW() END)
         RETURNING id",
    )
    .bind(owner_id)
    .bind(title)
    .bind(status)
    .bind(privacy)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// `Set-Cookie` headers as `name=value` pairs.
    pub fn cookies(&self) -> Vec<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(|v| v.to_string())
            .collect()
    }

    pub fn cookie(&self, name: &str) -> Option<String> {
        let prefix = format!("{}=", name);
        self.cookies()
            .into_iter()
            .find(|c| c.starts_with(&prefix))
    }

    pub fn location(&self) -> Option<String> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string())
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    TestResponse {
        status,
        headers,
        body,
    }
}

pub async fn get(app: &Router, uri: &str, token: Option<&str>) -> TestResponse {
    send(app, json_request(Method::GET, uri, token, None)).await
}

pub async fn post(app: &Router, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
    send(app, json_request(Method::POST, uri, token, Some(body))).await
}
