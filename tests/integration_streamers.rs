mod common;

use axum::http::{Method, StatusCode};
use common::{
    create_streamer_profile, create_test_user, get, json_request, post, send, setup_test_app,
};
use luv_models::users::UserRole;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

async fn total_followers(pool: &PgPool, streamer_id: Uuid) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT total_followers FROM streamer_profiles WHERE id = $1")
        .bind(streamer_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_profile_for_self(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let user = create_test_user(&pool, "gamer", UserRole::Viewer).await;

    let response = post(
        &app,
        "/api/streamers",
        Some(&user.token()),
        json!({ "stage_name": "GamerGirl", "bio": "Speedruns" }),
    )
    .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["user_id"], user.id.to_string());
    assert_eq!(response.body["stage_name"], "GamerGirl");
    assert_eq!(response.body["is_verified"], false);
    assert_eq!(response.body["total_followers"], 0);

    let role = sqlx::query_scalar::<_, UserRole>("SELECT role FROM users WHERE id = $1")
        .bind(user.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(role, UserRole::Viewer);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_profile_conflicts(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let first = create_test_user(&pool, "first", UserRole::Streamer).await;
    let second = create_test_user(&pool, "second", UserRole::Streamer).await;
    create_streamer_profile(&pool, first.id, "TakenName").await;

    let duplicate_profile = post(
        &app,
        "/api/streamers",
        Some(&first.token()),
        json!({ "stage_name": "AnotherName" }),
    )
    .await;
    assert_eq!(duplicate_profile.status, StatusCode::CONFLICT);
    assert_eq!(
        duplicate_profile.body["error"],
        "User already has a streamer profile"
    );

    let duplicate_name = post(
        &app,
        "/api/streamers",
        Some(&second.token()),
        json!({ "stage_name": "TakenName" }),
    )
    .await;
    assert_eq!(duplicate_name.status, StatusCode::CONFLICT);
    assert_eq!(duplicate_name.body["error"], "Stage name already taken");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_profile_for_other_user_needs_admin(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let admin = create_test_user(&pool, "root_admin", UserRole::Admin).await;
    let viewer = create_test_user(&pool, "meddler", UserRole::Viewer).await;
    let target = create_test_user(&pool, "target", UserRole::Streamer).await;
    let body = json!({ "stage_name": "TargetTV", "user_id": target.id });

    let denied = post(&app, "/api/streamers", Some(&viewer.token()), body.clone()).await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let created = post(&app, "/api/streamers", Some(&admin.token()), body).await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["user_id"], target.id.to_string());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_profile_validates_stage_name(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let user = create_test_user(&pool, "tiny", UserRole::Streamer).await;

    let response = post(
        &app,
        "/api/streamers",
        Some(&user.token()),
        json!({ "stage_name": "x" }),
    )
    .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_lookups(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let owner = create_test_user(&pool, "owner", UserRole::Streamer).await;
    let profile_id = create_streamer_profile(&pool, owner.id, "OwnerLive").await;

    let by_id = get(&app, &format!("/api/streamers/{}", profile_id), None).await;
    assert_eq!(by_id.status, StatusCode::OK);
    assert_eq!(by_id.body["stage_name"], "OwnerLive");

    let by_user = get(&app, &format!("/api/streamers/by-user/{}", owner.id), None).await;
    assert_eq!(by_user.body["id"], profile_id.to_string());

    let by_name = get(&app, "/api/streamers/by-stage-name/OwnerLive", None).await;
    assert_eq!(by_name.body["id"], profile_id.to_string());

    let missing = get(&app, &format!("/api/streamers/{}", Uuid::new_v4()), None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["error"], "Streamer not found");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_orders_by_followers_and_filters_verified(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let quiet = create_test_user(&pool, "quiet", UserRole::Streamer).await;
    let popular = create_test_user(&pool, "popular", UserRole::Streamer).await;
    let fan = create_test_user(&pool, "fan", UserRole::Viewer).await;
    create_streamer_profile(&pool, quiet.id, "QuietOne").await;
    let popular_id = create_streamer_profile(&pool, popular.id, "PopularOne").await;

    post(
        &app,
        &format!("/api/streamers/{}/follow", popular_id),
        Some(&fan.token()),
        json!({}),
    )
    .await;
    sqlx::query("UPDATE streamer_profiles SET is_verified = TRUE WHERE id = $1")
        .bind(popular_id)
        .execute(&pool)
        .await
        .unwrap();

    let all = get(&app, "/api/streamers", None).await;
    assert_eq!(all.status, StatusCode::OK);
    let all = all.body.as_array().unwrap().clone();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0]["stage_name"], "PopularOne");

    let verified = get(&app, "/api/streamers/verified", None).await;
    let verified = verified.body.as_array().unwrap();
    assert_eq!(verified.len(), 1);
    assert_eq!(verified[0]["id"], popular_id.to_string());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_profile_permissions(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let owner = create_test_user(&pool, "owner", UserRole::Streamer).await;
    let stranger = create_test_user(&pool, "stranger", UserRole::Streamer).await;
    let profile_id = create_streamer_profile(&pool, owner.id, "OwnerLive").await;
    let uri = format!("/api/streamers/{}", profile_id);

    let updated = send(
        &app,
        json_request(
            Method::PUT,
            &uri,
            Some(&owner.token()),
            Some(json!({ "bio": "New bio" })),
        ),
    )
    .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["bio"], "New bio");
    assert_eq!(updated.body["stage_name"], "OwnerLive");

    let by_stranger = send(
        &app,
        json_request(
            Method::PUT,
            &uri,
            Some(&stranger.token()),
            Some(json!({ "bio": "Hijacked" })),
        ),
    )
    .await;
    assert_eq!(by_stranger.status, StatusCode::FORBIDDEN);

    let self_verify = send(
        &app,
        json_request(
            Method::PUT,
            &uri,
            Some(&owner.token()),
            Some(json!({ "is_verified": true })),
        ),
    )
    .await;
    assert_eq!(self_verify.status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_verify_is_admin_only(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let admin = create_test_user(&pool, "root_admin", UserRole::Admin).await;
    let owner = create_test_user(&pool, "owner", UserRole::Streamer).await;
    let profile_id = create_streamer_profile(&pool, owner.id, "OwnerLive").await;
    let uri = format!("/api/streamers/{}/verify", profile_id);

    let denied = post(&app, &uri, Some(&owner.token()), json!({})).await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let verified = post(&app, &uri, Some(&admin.token()), json!({})).await;
    assert_eq!(verified.status, StatusCode::OK);
    assert_eq!(verified.body["is_verified"], true);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_profile(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let owner = create_test_user(&pool, "owner", UserRole::Streamer).await;
    let stranger = create_test_user(&pool, "stranger", UserRole::Viewer).await;
    let profile_id = create_streamer_profile(&pool, owner.id, "OwnerLive").await;
    let uri = format!("/api/streamers/{}", profile_id);

    let denied = send(
        &app,
        json_request(Method::DELETE, &uri, Some(&stranger.token()), None),
    )
    .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let deleted = send(
        &app,
        json_request(Method::DELETE, &uri, Some(&owner.token()), None),
    )
    .await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body["message"], "Streamer profile deleted successfully");

    assert_eq!(get(&app, &uri, None).await.status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_follow_and_unfollow_track_counter(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let owner = create_test_user(&pool, "owner", UserRole::Streamer).await;
    let fan = create_test_user(&pool, "fan", UserRole::Viewer).await;
    let profile_id = create_streamer_profile(&pool, owner.id, "OwnerLive").await;
    let uri = format!("/api/streamers/{}/follow", profile_id);

    let followed = post(&app, &uri, Some(&fan.token()), json!({})).await;
    assert_eq!(followed.status, StatusCode::OK);
    assert_eq!(followed.body["following"], true);
    assert_eq!(followed.body["total_followers"], 1);

    let again = post(&app, &uri, Some(&fan.token()), json!({})).await;
    assert_eq!(again.status, StatusCode::CONFLICT);
    assert_eq!(total_followers(&pool, profile_id).await, 1);

    let unfollowed = send(
        &app,
        json_request(Method::DELETE, &uri, Some(&fan.token()), None),
    )
    .await;
    assert_eq!(unfollowed.status, StatusCode::OK);
    assert_eq!(unfollowed.body["following"], false);
    assert_eq!(unfollowed.body["total_followers"], 0);

    let not_following = send(
        &app,
        json_request(Method::DELETE, &uri, Some(&fan.token()), None),
    )
    .await;
    assert_eq!(not_following.status, StatusCode::NOT_FOUND);
    assert_eq!(not_following.body["error"], "You are not following this streamer");
    assert_eq!(total_followers(&pool, profile_id).await, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_cannot_follow_self_or_missing_streamer(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let owner = create_test_user(&pool, "owner", UserRole::Streamer).await;
    let profile_id = create_streamer_profile(&pool, owner.id, "OwnerLive").await;

    let own = post(
        &app,
        &format!("/api/streamers/{}/follow", profile_id),
        Some(&owner.token()),
        json!({}),
    )
    .await;
    assert_eq!(own.status, StatusCode::BAD_REQUEST);
    assert_eq!(own.body["error"], "You cannot follow yourself");

    let missing = post(
        &app,
        &format!("/api/streamers/{}/follow", Uuid::new_v4()),
        Some(&owner.token()),
        json!({}),
    )
    .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_followers_newest_first(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let owner = create_test_user(&pool, "owner", UserRole::Streamer).await;
    let profile_id = create_streamer_profile(&pool, owner.id, "OwnerLive").await;
    let uri = format!("/api/streamers/{}/follow", profile_id);

    for name in ["early_fan", "late_fan"] {
        let fan = create_test_user(&pool, name, UserRole::Viewer).await;
        post(&app, &uri, Some(&fan.token()), json!({})).await;
    }
    sqlx::query(
        "UPDATE followers SET followed_at = NOW() - INTERVAL '1 hour'
         WHERE follower_id = (SELECT id FROM users WHERE username = 'early_fan')",
    )
    .execute(&pool)
    .await
    .unwrap();

    let response = get(
        &app,
        &format!("/api/streamers/{}/followers?limit=1", profile_id),
        None,
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["meta"]["total_count"], 2);
    assert_eq!(response.body["data"][0]["username"], "late_fan");
    assert_eq!(response.body["meta"]["has_next"], true);
}
