use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::state::AppState;

use super::controller::{
    change_password, create_user, deactivate_user, delete_user, demote_to_viewer, get_by_username,
    get_me, get_stats, get_user, list_active_users, list_users, promote_to_admin,
    promote_to_streamer, update_me, update_user,
};

pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_user).get(list_users))
        .route("/active", get(list_active_users))
        .route("/stats", get(get_stats))
        .route("/me", get(get_me).put(update_me))
        .route("/me/change-password", post(change_password))
        .route("/by-username/{username}", get(get_by_username))
        .route(
            "/{id}",
            get(get_user).put(update_user).delete(deactivate_user),
        )
        .route("/{id}/permanent", delete(delete_user))
        .route("/{id}/promote-streamer", post(promote_to_streamer))
        .route("/{id}/promote-admin", post(promote_to_admin))
        .route("/{id}/demote-viewer", post(demote_to_viewer))
}
