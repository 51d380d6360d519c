//! Role-based authorization.
//!
//! Two styles are available:
//!
//! 1. Layer middleware ([`require_admin`], [`require_streamer`]) for whole routers
//! 2. Extractors ([`RequireAdmin`], [`RequireStreamer`]) for single handlers
//!
//! Both resolve the caller through [`CurrentUser`], so the role is checked
//! against the database row rather than the token claim.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use luv_core::AppError;
use luv_models::users::{User, UserRole};

use crate::middleware::auth::CurrentUser;
use crate::state::AppState;

/// Middleware that lets the request through only for the given roles.
///
/// ```rust,ignore
/// let routes = Router::new()
///     .route("/stats", get(stats))
///     .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));
/// ```
pub async fn require_roles(
    State(state): State<AppState>,
    req: Request,
    next: Next,
    allowed_roles: &[UserRole],
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let CurrentUser(user) = CurrentUser::from_request_parts(&mut parts, &state).await?;
    check_any_role(&user, allowed_roles)?;

    Ok(next.run(Request::from_parts(parts, body)).await)
}

pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match require_roles(State(state), req, next, &[UserRole::Admin]).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

pub async fn require_streamer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    match require_roles(
        State(state),
        req,
        next,
        &[UserRole::Streamer, UserRole::Admin],
    )
    .await
    {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// Extractor for admin-only handlers.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub User);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        if user.role != UserRole::Admin {
            return Err(AppError::forbidden(
                "Access denied. Administrator privileges required.",
            ));
        }

        Ok(RequireAdmin(user))
    }
}

/// Extractor for streamers; admins pass too.
#[derive(Debug, Clone)]
pub struct RequireStreamer(pub User);

impl FromRequestParts<AppState> for RequireStreamer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        if !matches!(user.role, UserRole::Streamer | UserRole::Admin) {
            return Err(AppError::forbidden(
                "Access denied. Streamer privileges required.",
            ));
        }

        Ok(RequireStreamer(user))
    }
}

pub fn check_any_role(user: &User, allowed_roles: &[UserRole]) -> Result<(), AppError> {
    if !allowed_roles.contains(&user.role) {
        let allowed: Vec<&str> = allowed_roles.iter().map(UserRole::as_str).collect();
        return Err(AppError::forbidden(format!(
            "Access denied. Required roles: {}, but user has role: {}",
            allowed.join(", "),
            user.role
        )));
    }

    Ok(())
}

/// Owner-or-admin guard used by streams, streamer profiles and users.
pub fn ensure_owner_or_admin(user: &User, owner_id: uuid::Uuid) -> Result<(), AppError> {
    if user.can_manage(owner_id) {
        Ok(())
    } else {
        Err(AppError::forbidden(
            "You do not have permission to modify this resource",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn user_with_role(role: UserRole) -> User {
        User {
            id: Uuid::new_v4(),
            username: "tester".into(),
            email: "tester@example.com".into(),
            google_id: None,
            avatar_url: None,
            display_name: None,
            role,
            is_active: true,
            last_login_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_check_any_role() {
        let allowed = [UserRole::Streamer, UserRole::Admin];
        assert!(check_any_role(&user_with_role(UserRole::Streamer), &allowed).is_ok());
        assert!(check_any_role(&user_with_role(UserRole::Admin), &allowed).is_ok());
        assert!(check_any_role(&user_with_role(UserRole::Viewer), &allowed).is_err());
    }

    #[test]
    fn test_owner_or_admin() {
        let viewer = user_with_role(UserRole::Viewer);
        assert!(ensure_owner_or_admin(&viewer, viewer.id).is_ok());
        assert!(ensure_owner_or_admin(&viewer, Uuid::new_v4()).is_err());
        assert!(ensure_owner_or_admin(&user_with_role(UserRole::Admin), Uuid::new_v4()).is_ok());
    }
}
