mod common;

use axum::http::{Method, StatusCode};
use common::{
    TEST_PASSWORD, create_test_user, deactivate, get, json_request, post, send, setup_test_app,
};
use luv_models::users::UserRole;
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
async fn test_admin_creates_user(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let admin = create_test_user(&pool, "root_admin", UserRole::Admin).await;

    let response = post(
        &app,
        "/api/users",
        Some(&admin.token()),
        json!({
            "username": "new_streamer",
            "email": "New.Streamer@Example.com",
            "password": "Sup3r$ecret",
            "role": "streamer"
        }),
    )
    .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["email"], "new.streamer@example.com");
    assert_eq!(response.body["role"], "streamer");
    assert_eq!(response.body["is_active"], true);
    assert_eq!(response.body["display_name"], "new_streamer");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_user_requires_admin(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let viewer = create_test_user(&pool, "plain_viewer", UserRole::Viewer).await;

    let response = post(
        &app,
        "/api/users",
        Some(&viewer.token()),
        json!({ "username": "sneaky", "email": "sneaky@example.com" }),
    )
    .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(
        response.body["error"],
        "Access denied. Administrator privileges required."
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_user_rejects_invalid_username(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let admin = create_test_user(&pool, "root_admin", UserRole::Admin).await;

    let response = post(
        &app,
        "/api/users",
        Some(&admin.token()),
        json!({ "username": "no spaces!", "email": "spaces@example.com" }),
    )
    .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_users_filters_and_paginates(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let admin = create_test_user(&pool, "root_admin", UserRole::Admin).await;
    for name in ["alpha_viewer", "bravo_viewer", "charlie_viewer"] {
        create_test_user(&pool, name, UserRole::Viewer).await;
    }
    create_test_user(&pool, "delta_streamer", UserRole::Streamer).await;

    let token = admin.token();
    let viewers = get(
        &app,
        "/api/users?role=viewer&sort_by=username&sort_order=asc&limit=2",
        Some(&token),
    )
    .await;

    assert_eq!(viewers.status, StatusCode::OK);
    let data = viewers.body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["username"], "alpha_viewer");
    assert_eq!(data[1]["username"], "bravo_viewer");
    assert_eq!(viewers.body["meta"]["total_count"], 3);
    assert_eq!(viewers.body["meta"]["total_pages"], 2);
    assert_eq!(viewers.body["meta"]["has_next"], true);

    let search = get(&app, "/api/users?search=DELTA", Some(&token)).await;
    assert_eq!(search.body["meta"]["total_count"], 1);
    assert_eq!(search.body["data"][0]["username"], "delta_streamer");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_users_bad_query_is_bad_request(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let admin = create_test_user(&pool, "root_admin", UserRole::Admin).await;

    let response = get(&app, "/api/users?page=abc", Some(&admin.token())).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_active_users_is_public(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    create_test_user(&pool, "awake", UserRole::Viewer).await;
    let asleep = create_test_user(&pool, "asleep", UserRole::Viewer).await;
    deactivate(&pool, asleep.id).await;

    let response = get(&app, "/api/users/active", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["meta"]["total_count"], 1);
    assert_eq!(response.body["data"][0]["username"], "awake");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_stats_count_active_roles(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let admin = create_test_user(&pool, "root_admin", UserRole::Admin).await;
    create_test_user(&pool, "streamer_a", UserRole::Streamer).await;
    create_test_user(&pool, "viewer_a", UserRole::Viewer).await;
    let gone = create_test_user(&pool, "viewer_b", UserRole::Viewer).await;
    deactivate(&pool, gone.id).await;

    let response = get(&app, "/api/users/stats", Some(&admin.token())).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["total_users"], 4);
    assert_eq!(response.body["active_users"], 3);
    assert_eq!(response.body["streamers"], 1);
    assert_eq!(response.body["viewers"], 1);
    assert_eq!(response.body["admins"], 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_me_changes_profile(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let user = create_test_user(&pool, "renamer", UserRole::Viewer).await;

    let response = send(
        &app,
        json_request(
            Method::PUT,
            "/api/users/me",
            Some(&user.token()),
            Some(json!({ "display_name": "The Renamer" })),
        ),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["display_name"], "The Renamer");
    assert_eq!(response.body["username"], "renamer");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_me_rejects_over_length_fields(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let user = create_test_user(&pool, "verbose", UserRole::Viewer).await;

    for body in [
        json!({ "display_name": "d".repeat(101) }),
        json!({ "username": "u".repeat(51) }),
    ] {
        let response = send(
            &app,
            json_request(Method::PUT, "/api/users/me", Some(&user.token()), Some(body)),
        )
        .await;
        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_me_cannot_change_role(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let user = create_test_user(&pool, "climber", UserRole::Viewer).await;

    let response = send(
        &app,
        json_request(
            Method::PUT,
            "/api/users/me",
            Some(&user.token()),
            Some(json!({ "role": "admin" })),
        ),
    )
    .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    let role = sqlx::query_scalar::<_, UserRole>("SELECT role FROM users WHERE id = $1")
        .bind(user.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(role, UserRole::Viewer);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_me_username_conflict(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    create_test_user(&pool, "first_come", UserRole::Viewer).await;
    let user = create_test_user(&pool, "second_come", UserRole::Viewer).await;

    let response = send(
        &app,
        json_request(
            Method::PUT,
            "/api/users/me",
            Some(&user.token()),
            Some(json!({ "username": "first_come" })),
        ),
    )
    .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_change_password(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let user = create_test_user(&pool, "rotator", UserRole::Viewer).await;
    let token = user.token();

    let wrong = post(
        &app,
        "/api/users/me/change-password",
        Some(&token),
        json!({ "current_password": "Wr0ng$pass", "new_password": "N3w$ecret!" }),
    )
    .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);

    let weak = post(
        &app,
        "/api/users/me/change-password",
        Some(&token),
        json!({ "current_password": TEST_PASSWORD, "new_password": "short" }),
    )
    .await;
    assert_eq!(weak.status, StatusCode::UNPROCESSABLE_ENTITY);

    let ok = post(
        &app,
        "/api/users/me/change-password",
        Some(&token),
        json!({ "old_password": TEST_PASSWORD, "new_password": "N3w$ecret!" }),
    )
    .await;
    assert_eq!(ok.status, StatusCode::OK);
    assert_eq!(ok.body["message"], "Password changed successfully");

    let login = post(
        &app,
        "/api/auth/login",
        None,
        json!({ "email": user.email, "password": "N3w$ecret!" }),
    )
    .await;
    assert_eq!(login.status, StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_get_by_username_hides_inactive(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    create_test_user(&pool, "visible", UserRole::Streamer).await;
    let hidden = create_test_user(&pool, "hidden", UserRole::Streamer).await;
    deactivate(&pool, hidden.id).await;

    let found = get(&app, "/api/users/by-username/visible", None).await;
    assert_eq!(found.status, StatusCode::OK);
    assert_eq!(found.body["role"], "streamer");

    let missing = get(&app, "/api/users/by-username/hidden", None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["error"], "User not found");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_get_user_self_or_admin(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let admin = create_test_user(&pool, "root_admin", UserRole::Admin).await;
    let alice = create_test_user(&pool, "alice", UserRole::Viewer).await;
    let bob = create_test_user(&pool, "bob", UserRole::Viewer).await;
    let uri = format!("/api/users/{}", alice.id);

    assert_eq!(get(&app, &uri, Some(&alice.token())).await.status, StatusCode::OK);
    assert_eq!(get(&app, &uri, Some(&admin.token())).await.status, StatusCode::OK);

    let denied = get(&app, &uri, Some(&bob.token())).await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
    assert_eq!(denied.body["error"], "You can only view your own profile");

    let unknown = get(
        &app,
        &format!("/api/users/{}", uuid::Uuid::new_v4()),
        Some(&admin.token()),
    )
    .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_admin_updates_other_user(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let admin = create_test_user(&pool, "root_admin", UserRole::Admin).await;
    let target = create_test_user(&pool, "target", UserRole::Viewer).await;

    let response = send(
        &app,
        json_request(
            Method::PUT,
            &format!("/api/users/{}", target.id),
            Some(&admin.token()),
            Some(json!({ "is_active": false, "role": "streamer" })),
        ),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["is_active"], false);
    assert_eq!(response.body["role"], "streamer");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_deactivate_is_idempotent(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let admin = create_test_user(&pool, "root_admin", UserRole::Admin).await;
    let target = create_test_user(&pool, "fading", UserRole::Viewer).await;
    let uri = format!("/api/users/{}", target.id);

    let first = send(
        &app,
        json_request(Method::DELETE, &uri, Some(&admin.token()), None),
    )
    .await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["deactivated"], true);
    assert_eq!(first.body["user"]["is_active"], false);

    let second = send(
        &app,
        json_request(Method::DELETE, &uri, Some(&admin.token()), None),
    )
    .await;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.body["deactivated"], false);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_permanent_delete(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let admin = create_test_user(&pool, "root_admin", UserRole::Admin).await;
    let other_admin = create_test_user(&pool, "other_admin", UserRole::Admin).await;
    let target = create_test_user(&pool, "doomed", UserRole::Viewer).await;

    let deleted = send(
        &app,
        json_request(
            Method::DELETE,
            &format!("/api/users/{}/permanent", target.id),
            Some(&admin.token()),
            None,
        ),
    )
    .await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body["message"], "User deleted successfully");

    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
        .bind(target.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(!exists);

    let refused = send(
        &app,
        json_request(
            Method::DELETE,
            &format!("/api/users/{}/permanent", other_admin.id),
            Some(&admin.token()),
            None,
        ),
    )
    .await;
    assert_eq!(refused.status, StatusCode::BAD_REQUEST);
    assert_eq!(refused.body["error"], "Cannot delete admin users");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_role_transitions(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let admin = create_test_user(&pool, "root_admin", UserRole::Admin).await;
    let target = create_test_user(&pool, "rising", UserRole::Viewer).await;
    let token = admin.token();

    let streamer = post(
        &app,
        &format!("/api/users/{}/promote-streamer", target.id),
        Some(&token),
        json!({}),
    )
    .await;
    assert_eq!(streamer.status, StatusCode::OK);
    assert_eq!(streamer.body["role"], "streamer");

    let promoted = post(
        &app,
        &format!("/api/users/{}/promote-admin", target.id),
        Some(&token),
        json!({}),
    )
    .await;
    assert_eq!(promoted.body["role"], "admin");

    let demoted = post(
        &app,
        &format!("/api/users/{}/demote-viewer", target.id),
        Some(&token),
        json!({}),
    )
    .await;
    assert_eq!(demoted.body["role"], "viewer");

    let by_viewer = post(
        &app,
        &format!("/api/users/{}/promote-admin", target.id),
        Some(&target.token()),
        json!({}),
    )
    .await;
    assert_eq!(by_viewer.status, StatusCode::FORBIDDEN);
}
