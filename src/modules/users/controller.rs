use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
};
use luv_core::{AppError, PaginationParams};
use luv_models::auth::MessageResponse;
use luv_models::users::{
    ChangePasswordDto, CreateUserDto, DeactivateUserResponse, PaginatedUsersResponse,
    UpdateUserDto, User, UserFilterParams, UserRole, UserStats,
};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::CurrentUser;
use crate::middleware::role::RequireAdmin;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::{ValidatedJson, parse_query};

use super::service::UserService;

fn ensure_may_update(actor: &User, dto: &UpdateUserDto) -> Result<(), AppError> {
    if !actor.is_admin() && dto.touches_privileged_fields() {
        return Err(AppError::forbidden(
            "Only administrators can change role, active status or Google link",
        ));
    }
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 409, description = "Username or email already exists", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ValidatedJson(dto): ValidatedJson<CreateUserDto>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = UserService::create_user(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    get,
    path = "/api/users",
    params(
        ("page" = Option<i64>, Query, description = "Page number (default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (1-100, default 10)"),
        ("search" = Option<String>, Query, description = "Matches username, email or display name"),
        ("role" = Option<UserRole>, Query, description = "Filter by role"),
        ("is_active" = Option<bool>, Query, description = "Filter by active flag"),
        ("sort_by" = Option<String>, Query, description = "created_at, updated_at, username or email"),
        ("sort_order" = Option<String>, Query, description = "ASC or DESC (default DESC)")
    ),
    responses(
        (status = 200, description = "Paginated users", body = PaginatedUsersResponse),
        (status = 403, description = "Admin only", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, filters))]
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    filters: Result<Query<UserFilterParams>, QueryRejection>,
) -> Result<Json<PaginatedUsersResponse>, AppError> {
    let filters = parse_query(filters)?;
    Ok(Json(UserService::list_users(&state.db, filters).await?))
}

#[utoipa::path(
    get,
    path = "/api/users/active",
    params(
        ("page" = Option<i64>, Query, description = "Page number (default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (1-100, default 10)")
    ),
    responses(
        (status = 200, description = "Active users", body = PaginatedUsersResponse)
    ),
    tag = "Users"
)]
pub async fn list_active_users(
    State(state): State<AppState>,
    pagination: Result<Query<PaginationParams>, QueryRejection>,
) -> Result<Json<PaginatedUsersResponse>, AppError> {
    let pagination = parse_query(pagination)?;
    Ok(Json(
        UserService::list_active_users(&state.db, pagination).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/users/stats",
    responses(
        (status = 200, description = "User counts", body = UserStats),
        (status = 403, description = "Admin only", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn get_stats(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<UserStats>, AppError> {
    Ok(Json(UserService::get_stats(&state.db).await?))
}

#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn get_me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

#[utoipa::path(
    put,
    path = "/api/users/me",
    request_body = UpdateUserDto,
    responses(
        (status = 200, description = "Profile updated", body = User),
        (status = 403, description = "Privileged field changed by a non-admin", body = ErrorResponse),
        (status = 409, description = "Username or email already exists", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto), fields(user.id = %user.id))]
pub async fn update_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(dto): ValidatedJson<UpdateUserDto>,
) -> Result<Json<User>, AppError> {
    ensure_may_update(&user, &dto)?;
    Ok(Json(UserService::update_user(&state.db, user.id, dto).await?))
}

#[utoipa::path(
    post,
    path = "/api/users/me/change-password",
    request_body = ChangePasswordDto,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 401, description = "Current password is wrong", body = ErrorResponse),
        (status = 422, description = "New password too weak", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto), fields(user.id = %user.id))]
pub async fn change_password(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(dto): ValidatedJson<ChangePasswordDto>,
) -> Result<Json<MessageResponse>, AppError> {
    UserService::change_password(&state.db, user.id, dto).await?;
    Ok(Json(MessageResponse::ok("Password changed successfully")))
}

#[utoipa::path(
    get,
    path = "/api/users/by-username/{username}",
    params(("username" = String, Path, description = "Username")),
    responses(
        (status = 200, description = "Active user", body = User),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Users"
)]
pub async fn get_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<User>, AppError> {
    Ok(Json(
        UserService::get_active_by_username(&state.db, &username).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = User),
        (status = 403, description = "Not yourself and not an admin", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, AppError> {
    if !user.can_manage(id) {
        return Err(AppError::forbidden("You can only view your own profile"));
    }
    Ok(Json(UserService::get_user(&state.db, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserDto,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 403, description = "Not yourself and not an admin", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Username or email already exists", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, user, dto), fields(actor.id = %user.id))]
pub async fn update_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateUserDto>,
) -> Result<Json<User>, AppError> {
    if !user.can_manage(id) {
        return Err(AppError::forbidden("You can only update your own profile"));
    }
    ensure_may_update(&user, &dto)?;
    Ok(Json(UserService::update_user(&state.db, id, dto).await?))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Deactivation result", body = DeactivateUserResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn deactivate_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<DeactivateUserResponse>, AppError> {
    Ok(Json(UserService::deactivate_user(&state.db, id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}/permanent",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 400, description = "Admins cannot be deleted", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    UserService::delete_user(&state.db, id).await?;
    Ok(Json(MessageResponse::ok("User deleted successfully")))
}

async fn change_role(state: &AppState, id: Uuid, role: UserRole) -> Result<Json<User>, AppError> {
    Ok(Json(UserService::set_role(&state.db, id, role).await?))
}

#[utoipa::path(
    post,
    path = "/api/users/{id}/promote-streamer",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User is now a streamer", body = User),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn promote_to_streamer(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, AppError> {
    change_role(&state, id, UserRole::Streamer).await
}

#[utoipa::path(
    post,
    path = "/api/users/{id}/promote-admin",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User is now an admin", body = User),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn promote_to_admin(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, AppError> {
    change_role(&state, id, UserRole::Admin).await
}

#[utoipa::path(
    post,
    path = "/api/users/{id}/demote-viewer",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User is now a viewer", body = User),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn demote_to_viewer(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, AppError> {
    change_role(&state, id, UserRole::Viewer).await
}
