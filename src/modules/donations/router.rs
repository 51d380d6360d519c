use axum::{
    Router,
    routing::{patch, post},
};

use crate::state::AppState;

use super::controller::{create_donation, list_stream_donations, update_donation_status};

/// Mounted under `/api/streams`.
pub fn init_stream_donations_router() -> Router<AppState> {
    Router::new().route(
        "/{id}/donations",
        post(create_donation).get(list_stream_donations),
    )
}

pub fn init_donations_router() -> Router<AppState> {
    Router::new().route("/{id}/status", patch(update_donation_status))
}
