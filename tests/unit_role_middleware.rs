mod common;

use axum::http::StatusCode;
use axum::routing::get;
use axum::{Router, middleware};
use common::{create_test_user, deactivate, get as get_request, test_state, MockGoogleClient};
use luv::middleware::role::{require_admin, require_streamer};
use luv_config::RateLimitConfig;
use luv_models::users::UserRole;
use sqlx::PgPool;

async fn ok() -> &'static str {
    "ok"
}

fn guarded_app(pool: PgPool) -> Router {
    let state = test_state(pool, MockGoogleClient::default(), RateLimitConfig::disabled());

    let admin_only = Router::new()
        .route("/admin", get(ok))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));
    let streamer_only = Router::new()
        .route("/studio", get(ok))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_streamer));

    admin_only.merge(streamer_only).with_state(state)
}

#[sqlx::test(migrations = "./migrations")]
async fn test_require_admin_layer(pool: PgPool) {
    let app = guarded_app(pool.clone());
    let admin = create_test_user(&pool, "root_admin", UserRole::Admin).await;
    let streamer = create_test_user(&pool, "caster", UserRole::Streamer).await;

    assert_eq!(
        get_request(&app, "/admin", Some(&admin.token())).await.status,
        StatusCode::OK
    );

    let denied = get_request(&app, "/admin", Some(&streamer.token())).await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
    assert_eq!(
        denied.body["error"],
        "Access denied. Required roles: admin, but user has role: streamer"
    );

    assert_eq!(
        get_request(&app, "/admin", None).await.status,
        StatusCode::UNAUTHORIZED
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_require_streamer_layer_admits_admins(pool: PgPool) {
    let app = guarded_app(pool.clone());
    let admin = create_test_user(&pool, "root_admin", UserRole::Admin).await;
    let streamer = create_test_user(&pool, "caster", UserRole::Streamer).await;
    let viewer = create_test_user(&pool, "watcher", UserRole::Viewer).await;

    for user in [&admin, &streamer] {
        assert_eq!(
            get_request(&app, "/studio", Some(&user.token())).await.status,
            StatusCode::OK
        );
    }
    assert_eq!(
        get_request(&app, "/studio", Some(&viewer.token())).await.status,
        StatusCode::FORBIDDEN
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_role_comes_from_database_not_token(pool: PgPool) {
    let app = guarded_app(pool.clone());
    let user = create_test_user(&pool, "demoted", UserRole::Admin).await;
    let token = user.token();

    sqlx::query("UPDATE users SET role = 'viewer' WHERE id = $1")
        .bind(user.id)
        .execute(&pool)
        .await
        .unwrap();

    let response = get_request(&app, "/admin", Some(&token)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_inactive_admin_is_rejected(pool: PgPool) {
    let app = guarded_app(pool.clone());
    let admin = create_test_user(&pool, "sleeping_admin", UserRole::Admin).await;
    let token = admin.token();
    deactivate(&pool, admin.id).await;

    let response = get_request(&app, "/admin", Some(&token)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "This account is inactive");
}
