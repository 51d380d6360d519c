use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{google_auth, google_callback, login, logout, me, refresh, register};

pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route("/google", get(google_auth))
        .route("/google/callback", get(google_callback))
}
