use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use axum::{Json, Router, middleware, routing::get};
use luv_observability::{logging_middleware, metrics_middleware};
use serde_json::{Value, json};
use tower_governor::GovernorLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

use crate::docs::ApiDoc;
use crate::modules::auth::router::init_auth_router;
use crate::modules::chat::router::init_chat_router;
use crate::modules::donations::router::{init_donations_router, init_stream_donations_router};
use crate::modules::followers::router::init_followers_router;
use crate::modules::streamers::router::init_streamers_router;
use crate::modules::streams::router::init_streams_router;
use crate::modules::users::router::init_users_router;
use crate::state::AppState;

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn api_router(state: &AppState) -> Router<AppState> {
    let rate_limit = &state.rate_limit_config;

    let mut auth = init_auth_router();
    if rate_limit.enabled {
        auth = auth.layer(GovernorLayer::new(Arc::new(
            rate_limit.auth_governor_config(),
        )));
    }

    let api = Router::new()
        .nest("/auth", auth)
        .nest("/users", init_users_router())
        .nest(
            "/streamers",
            init_streamers_router().merge(init_followers_router()),
        )
        .nest(
            "/streams",
            init_streams_router()
                .merge(init_chat_router())
                .merge(init_stream_donations_router()),
        )
        .nest("/donations", init_donations_router());

    if rate_limit.enabled {
        api.layer(GovernorLayer::new(Arc::new(
            rate_limit.general_governor_config(),
        )))
    } else {
        api
    }
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = state
        .cors_config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        .allow_credentials(true)
}

pub fn init_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .nest("/api", api_router(&state))
        .with_state(state.clone())
        .layer(cors_layer(&state))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}
