use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_stream, delete_stream, end_stream, get_stream, global_stats, list_by_user,
    list_my_streams, list_streams, my_stats, record_view, start_stream, update_stream,
};

pub fn init_streams_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_stream).get(list_streams))
        .route("/mine", get(list_my_streams))
        .route("/mine/stats", get(my_stats))
        .route("/stats", get(global_stats))
        .route("/by-user/{user_id}", get(list_by_user))
        .route(
            "/{id}",
            get(get_stream).put(update_stream).delete(delete_stream),
        )
        .route("/{id}/start", post(start_stream))
        .route("/{id}/end", post(end_stream))
        .route("/{id}/views", post(record_view))
}
