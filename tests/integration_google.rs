mod common;

use std::collections::HashMap;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use common::{
    MockGoogleClient, TestResponse, create_test_user, deactivate, get, google_profile, send,
    setup_test_app_with_google,
};
use luv_models::auth::GoogleProfile;
use luv_models::users::UserRole;
use sqlx::PgPool;

/// Starts the flow and returns the `state` Google would echo back plus the
/// nonce stored in the browser cookie.
async fn begin_google_flow(app: &Router) -> (String, String) {
    let response = get(app, "/api/auth/google", None).await;
    assert_eq!(response.status, StatusCode::FOUND);

    let location = response.location().expect("redirect location");
    let state = query_params(&location)
        .remove("state")
        .expect("state parameter");

    let cookie = response.cookie("oauthState").expect("state cookie");
    let nonce = cookie
        .trim_start_matches("oauthState=")
        .split(';')
        .next()
        .unwrap()
        .to_string();

    (state, nonce)
}

async fn callback(app: &Router, code: &str, state: &str, nonce: Option<&str>) -> TestResponse {
    let mut builder = Request::builder().uri(format!(
        "/api/auth/google/callback?code={}&state={}",
        code, state
    ));
    if let Some(nonce) = nonce {
        builder = builder.header(header::COOKIE, format!("oauthState={}", nonce));
    }
    send(app, builder.body(Body::empty()).unwrap()).await
}

fn query_params(url: &str) -> HashMap<String, String> {
    reqwest::Url::parse(url)
        .unwrap()
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

async fn sign_in(app: &Router, code: &str) -> (TestResponse, HashMap<String, String>) {
    let (state, nonce) = begin_google_flow(app).await;
    let response = callback(app, code, &state, Some(&nonce)).await;
    assert_eq!(response.status, StatusCode::FOUND);

    let location = response.location().expect("callback redirect");
    assert!(location.starts_with("http://localhost:3000/auth/callback?"));
    let params = query_params(&location);
    (response, params)
}

#[sqlx::test(migrations = "./migrations")]
async fn test_google_redirect_sets_state_cookie(pool: PgPool) {
    let app = setup_test_app_with_google(pool, MockGoogleClient::default());

    let response = get(&app, "/api/auth/google", None).await;

    assert_eq!(response.status, StatusCode::FOUND);
    let location = response.location().unwrap();
    assert!(location.starts_with("https://accounts.google.test/"));
    assert!(location.contains("state="));

    let cookie = response.cookie("oauthState").unwrap();
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Path=/api/auth/google"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_google_callback_creates_viewer(pool: PgPool) {
    let client =
        MockGoogleClient::default().with_profile("good-code", google_profile("g-100", "Jane.Doe@gmail.com"));
    let app = setup_test_app_with_google(pool.clone(), client);

    let (response, params) = sign_in(&app, "good-code").await;

    assert_eq!(params.get("success").map(String::as_str), Some("true"));
    assert!(params.contains_key("accessToken"));
    assert!(params.contains_key("refreshToken"));
    assert!(params.contains_key("timestamp"));
    assert!(response.cookie("accessToken").is_some());
    assert!(response.cookie("oauthState").unwrap().contains("Max-Age=0"));

    let (username, role, has_password, display_name) =
        sqlx::query_as::<_, (String, UserRole, bool, Option<String>)>(
            "SELECT username, role, password_hash IS NOT NULL, display_name
             FROM users WHERE google_id = 'g-100'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(username, "janedoe");
    assert_eq!(role, UserRole::Viewer);
    assert!(!has_password);
    assert_eq!(display_name.as_deref(), Some("Test Person"));

    let me = get(&app, "/api/auth/me", params.get("accessToken").map(String::as_str)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["email"], "jane.doe@gmail.com");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_google_callback_links_existing_email(pool: PgPool) {
    let existing = create_test_user(&pool, "local_fan", UserRole::Viewer).await;
    let client = MockGoogleClient::default()
        .with_profile("link-code", google_profile("g-200", &existing.email));
    let app = setup_test_app_with_google(pool.clone(), client);

    let (_, params) = sign_in(&app, "link-code").await;
    assert_eq!(params.get("success").map(String::as_str), Some("true"));

    let google_id =
        sqlx::query_scalar::<_, Option<String>>("SELECT google_id FROM users WHERE id = $1")
            .bind(existing.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(google_id.as_deref(), Some("g-200"));

    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_google_callback_returning_user_is_not_duplicated(pool: PgPool) {
    let client = MockGoogleClient::default()
        .with_profile("first", google_profile("g-300", "repeat@gmail.com"))
        .with_profile("second", google_profile("g-300", "repeat@gmail.com"));
    let app = setup_test_app_with_google(pool.clone(), client);

    sign_in(&app, "first").await;
    let (_, params) = sign_in(&app, "second").await;
    assert_eq!(params.get("success").map(String::as_str), Some("true"));

    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_google_callback_picks_free_username(pool: PgPool) {
    create_test_user(&pool, "streamfan", UserRole::Viewer).await;
    let client = MockGoogleClient::default()
        .with_profile("code", google_profile("g-400", "streamfan@gmail.com"));
    let app = setup_test_app_with_google(pool.clone(), client);

    sign_in(&app, "code").await;

    let username =
        sqlx::query_scalar::<_, String>("SELECT username FROM users WHERE google_id = 'g-400'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(username, "streamfan1");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_google_callback_rejects_unverified_email(pool: PgPool) {
    let profile = GoogleProfile {
        email_verified: false,
        ..google_profile("g-500", "unverified@gmail.com")
    };
    let client = MockGoogleClient::default().with_profile("code", profile);
    let app = setup_test_app_with_google(pool.clone(), client);

    let (response, params) = sign_in(&app, "code").await;

    assert_eq!(params.get("success").map(String::as_str), Some("false"));
    assert_eq!(
        params.get("error").map(String::as_str),
        Some("Email not verified by Google")
    );
    assert!(response.cookie("accessToken").is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_google_callback_inactive_linked_user_is_refused(pool: PgPool) {
    let existing = create_test_user(&pool, "benched", UserRole::Viewer).await;
    sqlx::query("UPDATE users SET google_id = 'g-benched' WHERE id = $1")
        .bind(existing.id)
        .execute(&pool)
        .await
        .unwrap();
    deactivate(&pool, existing.id).await;
    let client = MockGoogleClient::default()
        .with_profile("code", google_profile("g-benched", &existing.email));
    let app = setup_test_app_with_google(pool.clone(), client);

    let (response, params) = sign_in(&app, "code").await;

    assert_eq!(params.get("success").map(String::as_str), Some("false"));
    assert_eq!(
        params.get("error").map(String::as_str),
        Some("This account is inactive")
    );
    assert!(response.cookie("accessToken").is_none());

    let last_login_at = sqlx::query_scalar::<_, Option<chrono::DateTime<chrono::Utc>>>(
        "SELECT last_login_at FROM users WHERE id = $1",
    )
    .bind(existing.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert!(last_login_at.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_google_callback_email_linked_elsewhere_conflicts(pool: PgPool) {
    let existing = create_test_user(&pool, "linked_once", UserRole::Viewer).await;
    sqlx::query("UPDATE users SET google_id = 'g-original' WHERE id = $1")
        .bind(existing.id)
        .execute(&pool)
        .await
        .unwrap();
    let client = MockGoogleClient::default()
        .with_profile("code", google_profile("g-other", &existing.email));
    let app = setup_test_app_with_google(pool, client);

    let (_, params) = sign_in(&app, "code").await;

    assert_eq!(params.get("success").map(String::as_str), Some("false"));
    assert_eq!(
        params.get("error").map(String::as_str),
        Some("This email is already linked to a different Google account")
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_google_callback_rejects_state_mismatch(pool: PgPool) {
    let client = MockGoogleClient::default()
        .with_profile("code", google_profile("g-600", "mismatch@gmail.com"));
    let app = setup_test_app_with_google(pool.clone(), client);

    let (state, _) = begin_google_flow(&app).await;

    for nonce in [Some("someone-elses-nonce"), None] {
        let response = callback(&app, "code", &state, nonce).await;
        assert_eq!(response.status, StatusCode::FOUND);
        let params = query_params(&response.location().unwrap());
        assert_eq!(params.get("success").map(String::as_str), Some("false"));
        assert_eq!(
            params.get("error").map(String::as_str),
            Some("Invalid OAuth state")
        );
    }

    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_google_callback_reports_provider_error(pool: PgPool) {
    let app = setup_test_app_with_google(pool, MockGoogleClient::default());

    let response = get(&app, "/api/auth/google/callback?error=access_denied", None).await;

    assert_eq!(response.status, StatusCode::FOUND);
    let params = query_params(&response.location().unwrap());
    assert_eq!(params.get("success").map(String::as_str), Some("false"));
    assert_eq!(
        params.get("error").map(String::as_str),
        Some("Google sign-in was cancelled: access_denied")
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_google_callback_unknown_code(pool: PgPool) {
    let app = setup_test_app_with_google(pool, MockGoogleClient::default());

    let (state, nonce) = begin_google_flow(&app).await;
    let response = callback(&app, "bogus", &state, Some(&nonce)).await;

    let params = query_params(&response.location().unwrap());
    assert_eq!(params.get("success").map(String::as_str), Some("false"));
    assert_eq!(
        params.get("error").map(String::as_str),
        Some("Failed to exchange authorization code")
    );
}
