use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use luv_auth::TokenPair;
use luv_config::{AppConfig, JwtConfig};

use luv_auth::OAUTH_STATE_TTL_SECONDS;

pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";
pub const OAUTH_STATE_COOKIE: &str = "oauthState";

const ACCESS_TOKEN_PATH: &str = "/";
const REFRESH_TOKEN_PATH: &str = "/api/auth/refresh";
const OAUTH_STATE_PATH: &str = "/api/auth/google";

fn secure_cookie(
    name: &'static str,
    value: String,
    path: &'static str,
    max_age_seconds: i64,
    app_config: &AppConfig,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .path(path)
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(app_config.is_production())
        .max_age(time::Duration::seconds(max_age_seconds))
        .build()
}

pub fn set_auth_cookies(
    jar: CookieJar,
    tokens: &TokenPair,
    jwt_config: &JwtConfig,
    app_config: &AppConfig,
) -> CookieJar {
    jar.add(secure_cookie(
        ACCESS_TOKEN_COOKIE,
        tokens.access_token.clone(),
        ACCESS_TOKEN_PATH,
        jwt_config.access_token_expiry,
        app_config,
    ))
    .add(secure_cookie(
        REFRESH_TOKEN_COOKIE,
        tokens.refresh_token.clone(),
        REFRESH_TOKEN_PATH,
        jwt_config.refresh_token_expiry,
        app_config,
    ))
}

/// Expired cookie that overwrites `name` at `path`.
///
/// Added rather than removed from the jar: the refresh cookie is scoped to
/// its own path and never reaches the logout route.
fn removal_cookie(name: &'static str, path: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::build((name, "")).path(path).http_only(true).build();
    cookie.make_removal();
    cookie
}

pub fn clear_auth_cookies(jar: CookieJar) -> CookieJar {
    jar.add(removal_cookie(ACCESS_TOKEN_COOKIE, ACCESS_TOKEN_PATH))
        .add(removal_cookie(REFRESH_TOKEN_COOKIE, REFRESH_TOKEN_PATH))
}

/// Binds an OAuth `state` to this browser for the duration of the redirect.
pub fn set_oauth_state_cookie(jar: CookieJar, nonce: String, app_config: &AppConfig) -> CookieJar {
    // Google redirects back cross-site, so Strict would drop the cookie.
    let cookie = Cookie::build((OAUTH_STATE_COOKIE, nonce))
        .path(OAUTH_STATE_PATH)
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(app_config.is_production())
        .max_age(time::Duration::seconds(OAUTH_STATE_TTL_SECONDS))
        .build();

    jar.add(cookie)
}

pub fn clear_oauth_state_cookie(jar: CookieJar) -> CookieJar {
    jar.add(removal_cookie(OAUTH_STATE_COOKIE, OAUTH_STATE_PATH))
}
