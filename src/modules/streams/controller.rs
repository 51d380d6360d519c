use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
};
use luv_core::AppError;
use luv_models::auth::MessageResponse;
use luv_models::streams::{
    CreateStreamDto, PaginatedStreamsResponse, Stream, StreamFilterParams, StreamStats,
    UpdateStreamDto,
};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::{CurrentUser, MaybeCurrentUser};
use crate::middleware::role::{RequireAdmin, RequireStreamer};
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::{ValidatedJson, parse_query};

use super::service::{StreamService, Visibility};

/// Create a stream
///
/// Status defaults to `live` (which stamps `started_at`), privacy to `public`.
#[utoipa::path(
    post,
    path = "/api/streams",
    request_body = CreateStreamDto,
    responses(
        (status = 201, description = "Stream created", body = Stream),
        (status = 400, description = "Stream cannot start as ended", body = ErrorResponse),
        (status = 403, description = "Streamers and admins only", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Streams",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto), fields(user.id = %user.id))]
pub async fn create_stream(
    State(state): State<AppState>,
    RequireStreamer(user): RequireStreamer,
    ValidatedJson(dto): ValidatedJson<CreateStreamDto>,
) -> Result<(StatusCode, Json<Stream>), AppError> {
    let stream = StreamService::create_stream(&state.db, &user, dto).await?;
    Ok((StatusCode::CREATED, Json(stream)))
}

/// List streams
///
/// Anonymous callers and other users see public streams. Admins see every
/// stream; a user filtering on their own `user_id` sees all of theirs.
#[utoipa::path(
    get,
    path = "/api/streams",
    params(
        ("page" = Option<i64>, Query, description = "Page number (default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (1-100, default 10)"),
        ("search" = Option<String>, Query, description = "Matches title, description or category"),
        ("status" = Option<String>, Query, description = "scheduled, live or ended"),
        ("privacy" = Option<String>, Query, description = "public or private"),
        ("category" = Option<String>, Query, description = "Case-insensitive substring"),
        ("user_id" = Option<Uuid>, Query, description = "Owner"),
        ("sort_by" = Option<String>, Query, description = "created_at, updated_at or title"),
        ("sort_order" = Option<String>, Query, description = "ASC or DESC (default DESC)")
    ),
    responses(
        (status = 200, description = "Paginated streams", body = PaginatedStreamsResponse),
        (status = 400, description = "Invalid query parameters", body = ErrorResponse)
    ),
    tag = "Streams"
)]
#[instrument(skip(state, viewer, filters))]
pub async fn list_streams(
    State(state): State<AppState>,
    viewer: MaybeCurrentUser,
    filters: Result<Query<StreamFilterParams>, QueryRejection>,
) -> Result<Json<PaginatedStreamsResponse>, AppError> {
    let filters = parse_query(filters)?;
    let visibility = Visibility::for_listing(viewer.user(), &filters);
    Ok(Json(
        StreamService::list_streams(&state.db, filters, visibility).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/streams/mine",
    params(
        ("page" = Option<i64>, Query, description = "Page number (default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (1-100, default 10)"),
        ("search" = Option<String>, Query, description = "Matches title, description or category"),
        ("status" = Option<String>, Query, description = "scheduled, live or ended")
    ),
    responses(
        (status = 200, description = "The caller's streams of any privacy", body = PaginatedStreamsResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Streams",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, filters), fields(user.id = %user.id))]
pub async fn list_my_streams(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    filters: Result<Query<StreamFilterParams>, QueryRejection>,
) -> Result<Json<PaginatedStreamsResponse>, AppError> {
    let mut filters = parse_query(filters)?;
    filters.user_id = Some(user.id);
    filters.privacy = None;
    Ok(Json(
        StreamService::list_streams(&state.db, filters, Visibility::All).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/streams/mine/stats",
    responses(
        (status = 200, description = "Counts over the caller's streams", body = StreamStats),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Streams",
    security(("bearer_auth" = []))
)]
pub async fn my_stats(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<StreamStats>, AppError> {
    Ok(Json(StreamService::get_stats(&state.db, Some(user.id)).await?))
}

#[utoipa::path(
    get,
    path = "/api/streams/stats",
    responses(
        (status = 200, description = "Counts over all streams", body = StreamStats),
        (status = 403, description = "Admin only", body = ErrorResponse)
    ),
    tag = "Streams",
    security(("bearer_auth" = []))
)]
pub async fn global_stats(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<StreamStats>, AppError> {
    Ok(Json(StreamService::get_stats(&state.db, None).await?))
}

#[utoipa::path(
    get,
    path = "/api/streams/by-user/{user_id}",
    params(("user_id" = Uuid, Path, description = "Owner user ID")),
    responses((status = 200, description = "Public streams of the user", body = Vec<Stream>)),
    tag = "Streams"
)]
pub async fn list_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<Stream>>, AppError> {
    Ok(Json(
        StreamService::list_public_by_user(&state.db, user_id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/streams/{id}",
    params(("id" = Uuid, Path, description = "Stream ID")),
    responses(
        (status = 200, description = "Stream", body = Stream),
        (status = 403, description = "Private stream", body = ErrorResponse),
        (status = 404, description = "Stream not found", body = ErrorResponse)
    ),
    tag = "Streams"
)]
pub async fn get_stream(
    State(state): State<AppState>,
    viewer: MaybeCurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Stream>, AppError> {
    Ok(Json(
        StreamService::get_stream(&state.db, id, viewer.user()).await?,
    ))
}

#[utoipa::path(
    put,
    path = "/api/streams/{id}",
    params(("id" = Uuid, Path, description = "Stream ID")),
    request_body = UpdateStreamDto,
    responses(
        (status = 200, description = "Stream updated", body = Stream),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Stream not found", body = ErrorResponse)
    ),
    tag = "Streams",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto), fields(user.id = %user.id))]
pub async fn update_stream(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateStreamDto>,
) -> Result<Json<Stream>, AppError> {
    Ok(Json(
        StreamService::update_stream(&state.db, &user, id, dto).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/streams/{id}",
    params(("id" = Uuid, Path, description = "Stream ID")),
    responses(
        (status = 200, description = "Stream deleted", body = MessageResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Stream not found", body = ErrorResponse)
    ),
    tag = "Streams",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user), fields(user.id = %user.id))]
pub async fn delete_stream(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    StreamService::delete_stream(&state.db, &user, id).await?;
    Ok(Json(MessageResponse::ok("Stream deleted successfully")))
}

#[utoipa::path(
    post,
    path = "/api/streams/{id}/start",
    params(("id" = Uuid, Path, description = "Stream ID")),
    responses(
        (status = 200, description = "Stream is live", body = Stream),
        (status = 400, description = "Stream is not scheduled", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse)
    ),
    tag = "Streams",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user), fields(user.id = %user.id))]
pub async fn start_stream(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Stream>, AppError> {
    Ok(Json(StreamService::start_stream(&state.db, &user, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/streams/{id}/end",
    params(("id" = Uuid, Path, description = "Stream ID")),
    responses(
        (status = 200, description = "Stream ended", body = Stream),
        (status = 400, description = "Stream has already ended", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse)
    ),
    tag = "Streams",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user), fields(user.id = %user.id))]
pub async fn end_stream(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Stream>, AppError> {
    Ok(Json(StreamService::end_stream(&state.db, &user, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/streams/{id}/views",
    params(("id" = Uuid, Path, description = "Stream ID")),
    responses(
        (status = 204, description = "View recorded"),
        (status = 403, description = "Private stream", body = ErrorResponse),
        (status = 404, description = "Stream not found", body = ErrorResponse)
    ),
    tag = "Streams"
)]
pub async fn record_view(
    State(state): State<AppState>,
    viewer: MaybeCurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    StreamService::record_view(&state.db, id, viewer.user()).await?;
    Ok(StatusCode::NO_CONTENT)
}
