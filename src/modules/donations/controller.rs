use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
};
use luv_core::{AppError, PaginationParams};
use luv_models::donations::{
    CreateDonationDto, Donation, PaginatedDonationsResponse, UpdateDonationStatusDto,
};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::CurrentUser;
use crate::middleware::role::RequireAdmin;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::{ValidatedJson, parse_query};

use super::service::DonationService;

/// Donate to a stream
///
/// Amounts are integer cents. The donation starts out `pending`.
#[utoipa::path(
    post,
    path = "/api/streams/{id}/donations",
    params(("id" = Uuid, Path, description = "Stream ID")),
    request_body = CreateDonationDto,
    responses(
        (status = 201, description = "Donation recorded", body = Donation),
        (status = 400, description = "Own stream or owner has no streamer profile", body = ErrorResponse),
        (status = 403, description = "Private stream", body = ErrorResponse),
        (status = 404, description = "Stream not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Donations",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto), fields(user.id = %user.id))]
pub async fn create_donation(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<CreateDonationDto>,
) -> Result<(StatusCode, Json<Donation>), AppError> {
    let donation = DonationService::create_donation(&state.db, &user, id, dto).await?;
    Ok((StatusCode::CREATED, Json(donation)))
}

#[utoipa::path(
    get,
    path = "/api/streams/{id}/donations",
    params(
        ("id" = Uuid, Path, description = "Stream ID"),
        ("page" = Option<i64>, Query, description = "Page number (default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (1-100, default 10)")
    ),
    responses(
        (status = 200, description = "Donations, newest first", body = PaginatedDonationsResponse),
        (status = 403, description = "Not the stream owner", body = ErrorResponse),
        (status = 404, description = "Stream not found", body = ErrorResponse)
    ),
    tag = "Donations",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, pagination), fields(user.id = %user.id))]
pub async fn list_stream_donations(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    pagination: Result<Query<PaginationParams>, QueryRejection>,
) -> Result<Json<PaginatedDonationsResponse>, AppError> {
    let pagination = parse_query(pagination)?;
    Ok(Json(
        DonationService::list_for_stream(&state.db, &user, id, pagination).await?,
    ))
}

#[utoipa::path(
    patch,
    path = "/api/donations/{id}/status",
    params(("id" = Uuid, Path, description = "Donation ID")),
    request_body = UpdateDonationStatusDto,
    responses(
        (status = 200, description = "Status updated", body = Donation),
        (status = 400, description = "Donation is no longer pending", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "Donation not found", body = ErrorResponse)
    ),
    tag = "Donations",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, admin, dto), fields(admin.id = %admin.id))]
pub async fn update_donation_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateDonationStatusDto>,
) -> Result<Json<Donation>, AppError> {
    Ok(Json(
        DonationService::update_status(&state.db, id, dto.status).await?,
    ))
}
