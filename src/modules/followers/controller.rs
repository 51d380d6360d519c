use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use luv_core::{AppError, PaginationParams};
use luv_models::followers::{FollowResponse, PaginatedFollowersResponse};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::CurrentUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::parse_query;

use super::service::FollowerService;

#[utoipa::path(
    post,
    path = "/api/streamers/{id}/follow",
    params(("id" = Uuid, Path, description = "Streamer profile ID")),
    responses(
        (status = 200, description = "Now following", body = FollowResponse),
        (status = 400, description = "Cannot follow yourself", body = ErrorResponse),
        (status = 404, description = "Streamer not found", body = ErrorResponse),
        (status = 409, description = "Already following", body = ErrorResponse)
    ),
    tag = "Followers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user), fields(user.id = %user.id))]
pub async fn follow(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<FollowResponse>, AppError> {
    Ok(Json(FollowerService::follow(&state.db, &user, id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/streamers/{id}/follow",
    params(("id" = Uuid, Path, description = "Streamer profile ID")),
    responses(
        (status = 200, description = "No longer following", body = FollowResponse),
        (status = 404, description = "Streamer not found or not following", body = ErrorResponse)
    ),
    tag = "Followers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user), fields(user.id = %user.id))]
pub async fn unfollow(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<FollowResponse>, AppError> {
    Ok(Json(FollowerService::unfollow(&state.db, &user, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/streamers/{id}/followers",
    params(
        ("id" = Uuid, Path, description = "Streamer profile ID"),
        ("page" = Option<i64>, Query, description = "Page number (default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (1-100, default 10)")
    ),
    responses(
        (status = 200, description = "Followers, newest first", body = PaginatedFollowersResponse),
        (status = 404, description = "Streamer not found", body = ErrorResponse)
    ),
    tag = "Followers"
)]
pub async fn list_followers(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    pagination: Result<Query<PaginationParams>, QueryRejection>,
) -> Result<Json<PaginatedFollowersResponse>, AppError> {
    let pagination = parse_query(pagination)?;
    Ok(Json(
        FollowerService::list_followers(&state.db, id, pagination).await?,
    ))
}
