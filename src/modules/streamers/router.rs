use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_profile, delete_profile, get_profile, get_profile_by_stage_name, get_profile_by_user,
    list_profiles, list_verified_profiles, update_profile, verify_profile,
};

pub fn init_streamers_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_profile).get(list_profiles))
        .route("/verified", get(list_verified_profiles))
        .route("/by-user/{user_id}", get(get_profile_by_user))
        .route("/by-stage-name/{stage_name}", get(get_profile_by_stage_name))
        .route(
            "/{id}",
            get(get_profile).put(update_profile).delete(delete_profile),
        )
        .route("/{id}/verify", post(verify_profile))
}
