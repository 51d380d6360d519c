use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use luv_core::AppError;
use luv_models::auth::MessageResponse;
use luv_models::streamers::{CreateStreamerProfileDto, StreamerProfile, UpdateStreamerProfileDto};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::CurrentUser;
use crate::middleware::role::RequireAdmin;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service::StreamerService;

/// Create a streamer profile
///
/// Admins may pass `user_id` to create a profile for someone else.
#[utoipa::path(
    post,
    path = "/api/streamers",
    request_body = CreateStreamerProfileDto,
    responses(
        (status = 201, description = "Profile created", body = StreamerProfile),
        (status = 403, description = "user_id set by a non-admin", body = ErrorResponse),
        (status = 409, description = "Profile exists or stage name taken", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Streamers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto), fields(user.id = %user.id))]
pub async fn create_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(dto): ValidatedJson<CreateStreamerProfileDto>,
) -> Result<(StatusCode, Json<StreamerProfile>), AppError> {
    let profile = StreamerService::create_profile(&state.db, &user, dto).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

#[utoipa::path(
    get,
    path = "/api/streamers",
    responses((status = 200, description = "All streamer profiles", body = Vec<StreamerProfile>)),
    tag = "Streamers"
)]
pub async fn list_profiles(
    State(state): State<AppState>,
) -> Result<Json<Vec<StreamerProfile>>, AppError> {
    Ok(Json(StreamerService::list_profiles(&state.db, false).await?))
}

#[utoipa::path(
    get,
    path = "/api/streamers/verified",
    responses((status = 200, description = "Verified streamer profiles", body = Vec<StreamerProfile>)),
    tag = "Streamers"
)]
pub async fn list_verified_profiles(
    State(state): State<AppState>,
) -> Result<Json<Vec<StreamerProfile>>, AppError> {
    Ok(Json(StreamerService::list_profiles(&state.db, true).await?))
}

#[utoipa::path(
    get,
    path = "/api/streamers/{id}",
    params(("id" = Uuid, Path, description = "Streamer profile ID")),
    responses(
        (status = 200, description = "Streamer profile", body = StreamerProfile),
        (status = 404, description = "Streamer not found", body = ErrorResponse)
    ),
    tag = "Streamers"
)]
pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StreamerProfile>, AppError> {
    Ok(Json(StreamerService::get_profile(&state.db, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/streamers/by-user/{user_id}",
    params(("user_id" = Uuid, Path, description = "Owner user ID")),
    responses(
        (status = 200, description = "Streamer profile", body = StreamerProfile),
        (status = 404, description = "Streamer profile not found", body = ErrorResponse)
    ),
    tag = "Streamers"
)]
pub async fn get_profile_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<StreamerProfile>, AppError> {
    Ok(Json(
        StreamerService::get_profile_by_user(&state.db, user_id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/streamers/by-stage-name/{stage_name}",
    params(("stage_name" = String, Path, description = "Stage name")),
    responses(
        (status = 200, description = "Streamer profile", body = StreamerProfile),
        (status = 404, description = "Streamer not found", body = ErrorResponse)
    ),
    tag = "Streamers"
)]
pub async fn get_profile_by_stage_name(
    State(state): State<AppState>,
    Path(stage_name): Path<String>,
) -> Result<Json<StreamerProfile>, AppError> {
    Ok(Json(
        StreamerService::get_profile_by_stage_name(&state.db, &stage_name).await?,
    ))
}

#[utoipa::path(
    put,
    path = "/api/streamers/{id}",
    params(("id" = Uuid, Path, description = "Streamer profile ID")),
    request_body = UpdateStreamerProfileDto,
    responses(
        (status = 200, description = "Profile updated", body = StreamerProfile),
        (status = 403, description = "Not the owner, or is_verified set by a non-admin", body = ErrorResponse),
        (status = 404, description = "Streamer not found", body = ErrorResponse),
        (status = 409, description = "Stage name already taken", body = ErrorResponse)
    ),
    tag = "Streamers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto), fields(user.id = %user.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateStreamerProfileDto>,
) -> Result<Json<StreamerProfile>, AppError> {
    Ok(Json(
        StreamerService::update_profile(&state.db, &user, id, dto).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/streamers/{id}",
    params(("id" = Uuid, Path, description = "Streamer profile ID")),
    responses(
        (status = 200, description = "Profile deleted", body = MessageResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Streamer not found", body = ErrorResponse)
    ),
    tag = "Streamers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user), fields(user.id = %user.id))]
pub async fn delete_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    StreamerService::delete_profile(&state.db, &user, id).await?;
    Ok(Json(MessageResponse::ok("Streamer profile deleted successfully")))
}

#[utoipa::path(
    post,
    path = "/api/streamers/{id}/verify",
    params(("id" = Uuid, Path, description = "Streamer profile ID")),
    responses(
        (status = 200, description = "Profile verified", body = StreamerProfile),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "Streamer not found", body = ErrorResponse)
    ),
    tag = "Streamers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn verify_profile(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<StreamerProfile>, AppError> {
    Ok(Json(StreamerService::verify_profile(&state.db, id).await?))
}
