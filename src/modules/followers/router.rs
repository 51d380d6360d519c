use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{follow, list_followers, unfollow};

/// Mounted under `/api/streamers` next to the profile routes.
pub fn init_followers_router() -> Router<AppState> {
    Router::new()
        .route("/{id}/follow", post(follow).delete(unfollow))
        .route("/{id}/followers", get(list_followers))
}
