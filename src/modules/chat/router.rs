use axum::{Router, routing::post};

use crate::state::AppState;

use super::controller::{list_messages, post_message};

/// Mounted under `/api/streams`.
pub fn init_chat_router() -> Router<AppState> {
    Router::new().route("/{id}/chat", post(post_message).get(list_messages))
}
