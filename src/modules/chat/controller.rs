use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
};
use luv_core::{AppError, PaginationParams};
use luv_models::chat::{ChatMessage, CreateChatMessageDto, PaginatedChatMessagesResponse};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::{CurrentUser, MaybeCurrentUser};
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::{ValidatedJson, parse_query};

use super::service::ChatService;

/// Post a chat message
#[utoipa::path(
    post,
    path = "/api/streams/{id}/chat",
    params(("id" = Uuid, Path, description = "Stream ID")),
    request_body = CreateChatMessageDto,
    responses(
        (status = 201, description = "Message posted", body = ChatMessage),
        (status = 400, description = "Stream has ended", body = ErrorResponse),
        (status = 403, description = "Private stream", body = ErrorResponse),
        (status = 404, description = "Stream not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Chat",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto), fields(user.id = %user.id))]
pub async fn post_message(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<CreateChatMessageDto>,
) -> Result<(StatusCode, Json<ChatMessage>), AppError> {
    let message = ChatService::post_message(&state.db, &user, id, dto).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

#[utoipa::path(
    get,
    path = "/api/streams/{id}/chat",
    params(
        ("id" = Uuid, Path, description = "Stream ID"),
        ("page" = Option<i64>, Query, description = "Page number (default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (1-100, default 10)")
    ),
    responses(
        (status = 200, description = "Messages, oldest first", body = PaginatedChatMessagesResponse),
        (status = 403, description = "Private stream", body = ErrorResponse),
        (status = 404, description = "Stream not found", body = ErrorResponse)
    ),
    tag = "Chat"
)]
pub async fn list_messages(
    State(state): State<AppState>,
    viewer: MaybeCurrentUser,
    Path(id): Path<Uuid>,
    pagination: Result<Query<PaginationParams>, QueryRejection>,
) -> Result<Json<PaginatedChatMessagesResponse>, AppError> {
    let pagination = parse_query(pagination)?;
    Ok(Json(
        ChatService::list_messages(&state.db, id, viewer.user(), pagination).await?,
    ))
}
